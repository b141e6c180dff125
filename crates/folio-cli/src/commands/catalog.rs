use crate::app::{confirm_action, AppContext};
use crate::cli::{CategoryAddArgs, CategoryDeleteArgs, CategoryListArgs, CategoryRenameArgs};
use crate::ui::{badge, blank_line, header, hint, print, receipt, simple_table, Badge, Column, OutputMode};

pub fn handle_category_list(ctx: &AppContext, args: &CategoryListArgs) -> anyhow::Result<()> {
    let workspace = ctx.open_workspace()?;
    let ui_ctx = ctx.ui_context(args.output.json, args.output.format.as_deref());
    let categories = workspace.catalog().categories();

    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(categories)?);
        return Ok(());
    }

    if categories.is_empty() {
        match ui_ctx.mode {
            OutputMode::Pretty => {
                print(&ui_ctx, &badge(&ui_ctx, Badge::Info, "No categories yet"));
                print(&ui_ctx, &hint(&ui_ctx, "folio category add <name>"));
            }
            OutputMode::Plain | OutputMode::Json => {}
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = categories
        .iter()
        .map(|c| vec![c.id.clone(), c.name.clone(), c.projects.len().to_string()])
        .collect();

    if ui_ctx.mode.is_pretty() && !ctx.quiet() {
        print(&ui_ctx, &header(&ui_ctx, "category list", None));
        blank_line(&ui_ctx);
    }
    print(
        &ui_ctx,
        &simple_table(
            &ui_ctx,
            &[Column::new("Id"), Column::new("Name"), Column::new("Projects").numeric()],
            &rows,
        ),
    );
    Ok(())
}

pub fn handle_category_add(ctx: &AppContext, args: &CategoryAddArgs) -> anyhow::Result<()> {
    let mut workspace = ctx.open_workspace()?;
    let category = workspace.add_category(&args.name)?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        print(
            &ui_ctx,
            &receipt(
                &ui_ctx,
                "Category added",
                &[("Id", &category.id), ("Name", &category.name)],
            ),
        );
    }
    Ok(())
}

pub fn handle_category_rename(ctx: &AppContext, args: &CategoryRenameArgs) -> anyhow::Result<()> {
    let mut workspace = ctx.open_workspace()?;
    let changed = workspace.rename_category(&args.category, &args.name)?;

    if ctx.quiet() {
        return Ok(());
    }
    let ui_ctx = ctx.ui_context(false, None);
    if changed {
        let name = &workspace.catalog().require(&args.category)?.name;
        print(
            &ui_ctx,
            &receipt(
                &ui_ctx,
                "Category renamed",
                &[("Id", &args.category), ("Name", name)],
            ),
        );
    } else {
        match ui_ctx.mode {
            OutputMode::Pretty => print(&ui_ctx, &badge(&ui_ctx, Badge::Info, "Name unchanged")),
            OutputMode::Plain | OutputMode::Json => println!("status=unchanged"),
        }
    }
    Ok(())
}

pub fn handle_category_delete(ctx: &AppContext, args: &CategoryDeleteArgs) -> anyhow::Result<()> {
    let mut workspace = ctx.open_workspace()?;
    let ui_ctx = ctx.ui_context(false, None);
    let projects = workspace.catalog().require(&args.category)?.projects.len();

    let question = format!(
        "Delete category {} and its {} project page(s)?",
        args.category, projects
    );
    if !confirm_action(args.yes, ctx.quiet(), &question)? {
        match ui_ctx.mode {
            OutputMode::Pretty => {
                print(&ui_ctx, &badge(&ui_ctx, Badge::Warn, "Delete cancelled"));
            }
            OutputMode::Plain | OutputMode::Json => println!("status=cancelled"),
        }
        return Ok(());
    }

    let removed = workspace.delete_category(&args.category)?;
    if !ctx.quiet() {
        print(
            &ui_ctx,
            &receipt(
                &ui_ctx,
                "Category deleted",
                &[("Id", &args.category), ("Pages removed", &removed.to_string())],
            ),
        );
    }
    Ok(())
}
