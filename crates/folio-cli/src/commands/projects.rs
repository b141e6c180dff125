use folio_core::{Block, Document};

use crate::app::{confirm_action, AppContext};
use crate::cli::{ProjectListArgs, ProjectNameArgs, ProjectRemoveArgs, ProjectRenameArgs, ProjectShowArgs};
use crate::errors::CliError;
use crate::ui::theme::{styled, styles, symbols};
use crate::ui::{
    badge, blank_line, divider, format_datetime, header, hint, kv, print, receipt, single_line,
    table, truncate, wrap, Badge, Column, OutputMode, UiContext,
};

pub fn handle_project_list(ctx: &AppContext, args: &ProjectListArgs) -> anyhow::Result<()> {
    let workspace = ctx.open_workspace()?;
    let ui_ctx = ctx.ui_context(args.output.json, args.output.format.as_deref());
    let summaries = workspace.list_projects(&args.category)?;

    if ui_ctx.mode.is_json() {
        let output: Vec<_> = summaries
            .iter()
            .map(|s| {
                serde_json::json!({
                    "name": s.name,
                    "slug": s.slug,
                    "stored": s.stored,
                    "blocks": s.blocks,
                    "preview": s.preview,
                    "lastModified": s.last_modified.map(|at| at.to_rfc3339()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if summaries.is_empty() {
        if ui_ctx.mode.is_pretty() {
            print(&ui_ctx, &badge(&ui_ctx, Badge::Info, "No projects in this category"));
            print(
                &ui_ctx,
                &hint(&ui_ctx, &format!("folio project add {} <name>", args.category)),
            );
        }
        return Ok(());
    }

    let pretty = ui_ctx.mode.is_pretty();
    let rows: Vec<Vec<String>> = summaries
        .iter()
        .map(|s| {
            let modified = s
                .last_modified
                .map(|at| format_datetime(&at, pretty))
                .unwrap_or_else(|| "-".to_string());
            let preview = if pretty {
                truncate(&single_line(&s.preview), 40)
            } else {
                single_line(&s.preview)
            };
            vec![
                s.slug.clone(),
                s.name.clone(),
                s.blocks.to_string(),
                modified,
                preview,
            ]
        })
        .collect();

    if pretty && !ctx.quiet() {
        print(&ui_ctx, &header(&ui_ctx, "project list", Some(&args.category)));
        blank_line(&ui_ctx);
    }
    print(
        &ui_ctx,
        &table(
            &ui_ctx,
            &[
                Column::new("Slug"),
                Column::new("Name"),
                Column::new("Blocks").numeric(),
                Column::new("Modified"),
                Column::new("Preview"),
            ],
            &rows,
        ),
    );
    Ok(())
}

pub fn handle_project_add(ctx: &AppContext, args: &ProjectNameArgs) -> anyhow::Result<()> {
    let mut workspace = ctx.open_workspace()?;
    let added = workspace.add_project(&args.category, &args.name)?;
    let slug = folio_core::slugify(args.name.trim());

    if ctx.quiet() {
        return Ok(());
    }
    let ui_ctx = ctx.ui_context(false, None);
    if added {
        print(
            &ui_ctx,
            &receipt(
                &ui_ctx,
                "Project added",
                &[("Category", &args.category), ("Slug", &slug)],
            ),
        );
    } else {
        match ui_ctx.mode {
            OutputMode::Pretty => print(
                &ui_ctx,
                &badge(&ui_ctx, Badge::Info, &format!("\"{}\" is already listed", args.name.trim())),
            ),
            OutputMode::Plain | OutputMode::Json => {
                println!("status=unchanged");
                println!("slug={}", slug);
            }
        }
    }
    Ok(())
}

pub fn handle_project_remove(ctx: &AppContext, args: &ProjectRemoveArgs) -> anyhow::Result<()> {
    let mut workspace = ctx.open_workspace()?;
    let ui_ctx = ctx.ui_context(false, None);
    let target = &args.target;

    let listed = workspace
        .catalog()
        .require(&target.category)?
        .projects
        .iter()
        .any(|p| p == &target.name);
    if !listed {
        return Err(CliError::not_found(
            format!("Project \"{}\" is not listed in {}", target.name, target.category),
            format!(
                "Hint: Run `folio project list {}` to see exact names.",
                target.category
            ),
        )
        .into());
    }

    let question = format!("Remove {} and delete its page?", target.name);
    if !confirm_action(args.yes, ctx.quiet(), &question)? {
        match ui_ctx.mode {
            OutputMode::Pretty => {
                print(&ui_ctx, &badge(&ui_ctx, Badge::Warn, "Remove cancelled"));
            }
            OutputMode::Plain | OutputMode::Json => println!("status=cancelled"),
        }
        return Ok(());
    }

    workspace.remove_project(&target.category, &target.name)?;
    if !ctx.quiet() {
        print(
            &ui_ctx,
            &receipt(
                &ui_ctx,
                "Project removed",
                &[("Category", &target.category), ("Name", &target.name)],
            ),
        );
    }
    Ok(())
}

pub fn handle_project_show(ctx: &AppContext, args: &ProjectShowArgs) -> anyhow::Result<()> {
    let workspace = ctx.open_workspace()?;
    let ui_ctx = ctx.ui_context(args.output.json, args.output.format.as_deref());
    let document = workspace.view_project(&args.target.category, &args.target.project)?;

    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    if ui_ctx.mode.is_pretty() && !ctx.quiet() {
        print(
            &ui_ctx,
            &header(&ui_ctx, "project show", Some(&args.target.category)),
        );
        blank_line(&ui_ctx);
    }
    render_page(&ui_ctx, &document);
    Ok(())
}

pub fn handle_project_rename(ctx: &AppContext, args: &ProjectRenameArgs) -> anyhow::Result<()> {
    let mut workspace = ctx.open_workspace()?;
    workspace.open(&args.target.category, &args.target.project)?;
    let changed = workspace.rename(&args.title)?;
    workspace.close()?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        if changed {
            print(
                &ui_ctx,
                &receipt(&ui_ctx, "Title updated", &[("Title", args.title.trim())]),
            );
        } else {
            match ui_ctx.mode {
                OutputMode::Pretty => {
                    print(&ui_ctx, &badge(&ui_ctx, Badge::Info, "Title unchanged"))
                }
                OutputMode::Plain | OutputMode::Json => println!("status=unchanged"),
            }
        }
    }
    Ok(())
}

/// Print a document: metadata, then one entry per block with its index.
pub(crate) fn render_page(ui_ctx: &UiContext, document: &Document) {
    let pretty = ui_ctx.mode.is_pretty();
    match ui_ctx.mode {
        OutputMode::Pretty => {
            print(ui_ctx, &styled(&document.title, styles::bold(), ui_ctx.color));
            print(
                ui_ctx,
                &kv(
                    ui_ctx,
                    "Modified",
                    &format_datetime(&document.last_modified, pretty),
                ),
            );
            print(ui_ctx, &divider(ui_ctx));
        }
        OutputMode::Plain | OutputMode::Json => {
            println!("title={}", document.title);
            println!("created={}", format_datetime(&document.created, false));
            println!("last_modified={}", format_datetime(&document.last_modified, false));
        }
    }

    for (index, block) in document.content.iter().enumerate() {
        print(ui_ctx, &render_block(ui_ctx, index, block));
    }
}

fn render_block(ui_ctx: &UiContext, index: usize, block: &Block) -> String {
    if !ui_ctx.mode.is_pretty() {
        return format!("{}\t{}\t{}", index, block.kind(), single_line(block.payload()));
    }

    let label = styled(&format!("{:>3}", index), styles::dim(), ui_ctx.color);
    match block {
        Block::Title(text) => format!(
            "{}  {} {}",
            label,
            symbols::SECTION.get(ui_ctx.unicode),
            styled(text, styles::bold(), ui_ctx.color)
        ),
        Block::Image(url) => format!(
            "{}  {} {}",
            label,
            symbols::IMAGE.get(ui_ctx.unicode),
            styled(url, styles::cyan(), ui_ctx.color)
        ),
        Block::Text(text) => {
            let width = ui_ctx.width.saturating_sub(6).max(20);
            wrap(text, width)
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    if i == 0 {
                        format!("{}  {}", label, line)
                    } else {
                        format!("     {}", line)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}
