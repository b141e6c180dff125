use std::path::Path;

use folio_core::codec::{self, Envelope, EnvelopeKind, Imported, RestoreMode};
use folio_core::workspace::{ImportOutcome, RestoreSummary};

use crate::app::{confirm_action, AppContext};
use crate::cli::{ExportAllArgs, ExportDestArgs, ExportProjectArgs, ImportArgs};
use crate::errors::CliError;
use crate::ui::{badge, hint, print, receipt, Badge, OutputMode};

fn emit_envelope(ctx: &AppContext, envelope: &Envelope, dest: &ExportDestArgs) -> anyhow::Result<()> {
    if dest.stdout {
        println!("{}", envelope.to_json_pretty()?);
        return Ok(());
    }

    let path = envelope.write_to(Path::new(&dest.dir))?;
    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        let mut items = vec![
            ("Kind", envelope.kind().as_str().to_string()),
            ("File", path.display().to_string()),
        ];
        if let Some(count) = envelope.metadata.project_count {
            items.push(("Projects", count.to_string()));
        }
        if let Some(count) = envelope.metadata.category_count {
            items.push(("Categories", count.to_string()));
        }
        let items: Vec<(&str, &str)> = items.iter().map(|(k, v)| (*k, v.as_str())).collect();
        print(&ui_ctx, &receipt(&ui_ctx, "Export written", &items));
    }
    Ok(())
}

pub fn handle_export_project(ctx: &AppContext, args: &ExportProjectArgs) -> anyhow::Result<()> {
    let workspace = ctx.open_workspace()?;
    let envelope = workspace.export_project(&args.target.category, &args.target.project)?;
    emit_envelope(ctx, &envelope, &args.dest)
}

pub fn handle_export_catalog(ctx: &AppContext, args: &ExportDestArgs) -> anyhow::Result<()> {
    let workspace = ctx.open_workspace()?;
    let envelope = workspace.export_catalog();
    emit_envelope(ctx, &envelope, args)
}

pub fn handle_export_all(ctx: &AppContext, args: &ExportAllArgs) -> anyhow::Result<()> {
    let workspace = ctx.open_workspace()?;
    let envelope = workspace.export_all(args.include_categories)?;
    emit_envelope(ctx, &envelope, &args.dest)
}

fn read_import_file(path: &str) -> anyhow::Result<String> {
    let file = Path::new(path);
    if !file.exists() {
        return Err(CliError::not_found(
            format!("Import file not found: {}", path),
            "Hint: Pass a file written by `folio export`.",
        )
        .into());
    }
    std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))
}

fn import_dir(ctx: &AppContext, dir: &str) -> anyhow::Result<()> {
    let path = Path::new(dir);
    if !path.is_dir() {
        return Err(CliError::not_found(
            format!("Import folder not found: {}", dir),
            "Hint: Pass the folder `folio export project` wrote into.",
        )
        .into());
    }
    let mut workspace = ctx.open_workspace()?;
    let report = workspace.import_dir(path)?;
    if ctx.quiet() {
        return Ok(());
    }

    let ui_ctx = ctx.ui_context(false, None);
    if report.loaded.is_empty() && report.failed.is_empty() {
        match ui_ctx.mode {
            OutputMode::Pretty => print(
                &ui_ctx,
                &badge(&ui_ctx, Badge::Info, "No project files found in the folder"),
            ),
            OutputMode::Plain | OutputMode::Json => println!("status=empty"),
        }
        return Ok(());
    }

    let loaded = report.loaded.len().to_string();
    let failed = report.failed.len().to_string();
    print(
        &ui_ctx,
        &receipt(
            &ui_ctx,
            "Folder imported",
            &[("Folder", dir), ("Loaded", &loaded), ("Failed", &failed)],
        ),
    );
    for (file, reason) in &report.failed {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        match ui_ctx.mode {
            OutputMode::Pretty => print(
                &ui_ctx,
                &badge(&ui_ctx, Badge::Warn, &format!("{}: {}", name, reason)),
            ),
            OutputMode::Plain | OutputMode::Json => println!("failed={}\t{}", name, reason),
        }
    }
    Ok(())
}

pub fn handle_import(ctx: &AppContext, args: &ImportArgs) -> anyhow::Result<()> {
    if let Some(dir) = args.dir.as_deref() {
        return import_dir(ctx, dir);
    }
    let Some(file) = args.file.as_deref() else {
        return Err(CliError::invalid_input("import takes a FILE or --dir").into());
    };
    let raw = read_import_file(file)?;
    let mut workspace = ctx.open_workspace()?;
    let ui_ctx = ctx.ui_context(false, None);

    if let Some(target) = args.into.as_deref() {
        let [category, project] = target else {
            return Err(CliError::invalid_input("--into takes CATEGORY and PROJECT").into());
        };
        workspace.open(category, project)?;
        workspace.import_into_open(&raw)?;
        workspace.close()?;
        if !ctx.quiet() {
            print(
                &ui_ctx,
                &receipt(
                    &ui_ctx,
                    "Page replaced",
                    &[("Category", category.as_str()), ("Project", project.as_str())],
                ),
            );
        }
        return Ok(());
    }

    let mode = RestoreMode::from(args.mode);
    let outcome = match codec::import_envelope(&raw)? {
        Imported::Catalog(bundle) => {
            let destructive = mode == RestoreMode::Replace && bundle.kind != EnvelopeKind::Categories;
            let question = format!(
                "Replace all stored pages with the {} page(s) in {}?",
                bundle.projects.len(),
                file
            );
            if destructive && !confirm_action(args.yes, ctx.quiet(), &question)? {
                match ui_ctx.mode {
                    OutputMode::Pretty => {
                        print(&ui_ctx, &badge(&ui_ctx, Badge::Warn, "Import cancelled"));
                    }
                    OutputMode::Plain | OutputMode::Json => println!("status=cancelled"),
                }
                return Ok(());
            }
            ImportOutcome::Catalog(workspace.restore(bundle, mode)?)
        }
        Imported::Document(_) => workspace.import(&raw, mode)?,
    };

    if !ctx.quiet() {
        print_outcome(ctx, &outcome);
    }
    Ok(())
}

fn print_outcome(ctx: &AppContext, outcome: &ImportOutcome) {
    let ui_ctx = ctx.ui_context(false, None);
    match outcome {
        ImportOutcome::Project {
            category_id,
            project_id,
            listed,
        } => {
            print(
                &ui_ctx,
                &receipt(
                    &ui_ctx,
                    "Project imported",
                    &[
                        ("Category", category_id.as_str()),
                        ("Slug", project_id.as_str()),
                        ("Listed", if *listed { "yes" } else { "no" }),
                    ],
                ),
            );
            if !*listed && ui_ctx.mode.is_pretty() {
                print(
                    &ui_ctx,
                    &hint(
                        &ui_ctx,
                        &format!("folio project add {} <name> to list it", category_id),
                    ),
                );
            }
        }
        ImportOutcome::Catalog(summary) => {
            let RestoreSummary {
                kind,
                mode,
                written,
                removed,
                categories,
            } = summary;
            let written = written.to_string();
            let removed = removed.to_string();
            let mode = mode.to_string();
            let categories = categories
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unchanged".to_string());
            print(
                &ui_ctx,
                &receipt(
                    &ui_ctx,
                    "Import complete",
                    &[
                        ("Kind", kind.as_str()),
                        ("Mode", &mode),
                        ("Written", &written),
                        ("Removed", &removed),
                        ("Categories", &categories),
                    ],
                ),
            );
        }
    }
}
