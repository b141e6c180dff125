//! Folio CLI - a local catalog of project pages
//!
//! This is the command-line interface for Folio. It provides a user-friendly
//! interface to the core library functionality.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod ui;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::app::AppContext;
use crate::cli::{
    BlockSubcommand, CategorySubcommand, Cli, Commands, ExportSubcommand, ProjectSubcommand,
    SecretSubcommand,
};
use crate::commands::{blocks, catalog, edit, misc, projects, session, transfer};
use crate::ui::print_error;

/// Initialize the tracing subscriber for diagnostics on stderr.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("folio=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        let ui_ctx = ctx.ui_context(false, None);

        let error_msg = format!("{}", e);
        let (message, hint) = split_error_hint(&error_msg);

        print_error(&ui_ctx, message, hint.as_deref());
        std::process::exit(errors::exit_code(&e));
    }
}

/// Separate an embedded "Hint:" line from the message, or provide a
/// contextual hint for common errors.
fn split_error_hint(error: &str) -> (&str, Option<String>) {
    for marker in ["\nHint:", "\nhint:"] {
        if let Some(idx) = error.find(marker) {
            return (&error[..idx], Some(error[idx + 1..].to_string()));
        }
    }
    (error, extract_error_hint(error))
}

fn extract_error_hint(error: &str) -> Option<String> {
    let error_lower = error.to_lowercase();

    if error_lower.starts_with("not found: category") {
        return Some("Hint: Run `folio category list` to see category ids.".to_string());
    }

    if error_lower.starts_with("not found: project") {
        return Some(
            "Hint: Run `folio project list <category>` to see listed projects.".to_string(),
        );
    }

    if error_lower.contains("last content block") {
        return Some("Hint: A page keeps at least one block; edit it instead.".to_string());
    }

    if error_lower.starts_with("parse error") {
        return Some("Hint: The file is not valid JSON.".to_string());
    }

    if error_lower.starts_with("schema error") {
        return Some(
            "Hint: Import expects a file written by `folio export` (with a metadata section)."
                .to_string(),
        );
    }

    if error_lower.contains("no secret provided") {
        return Some("Hint: Set FOLIO_SECRET or run in a terminal.".to_string());
    }

    None
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Login(args)) => session::handle_login(ctx, args)?,
        Some(Commands::Logout) => session::handle_logout(ctx)?,
        Some(Commands::Status(args)) => session::handle_status(ctx, args)?,
        Some(Commands::Category(sub)) => match sub {
            CategorySubcommand::List(args) => catalog::handle_category_list(ctx, args)?,
            CategorySubcommand::Add(args) => catalog::handle_category_add(ctx, args)?,
            CategorySubcommand::Rename(args) => catalog::handle_category_rename(ctx, args)?,
            CategorySubcommand::Delete(args) => catalog::handle_category_delete(ctx, args)?,
        },
        Some(Commands::Project(sub)) => match sub {
            ProjectSubcommand::List(args) => projects::handle_project_list(ctx, args)?,
            ProjectSubcommand::Add(args) => projects::handle_project_add(ctx, args)?,
            ProjectSubcommand::Remove(args) => projects::handle_project_remove(ctx, args)?,
            ProjectSubcommand::Show(args) => projects::handle_project_show(ctx, args)?,
            ProjectSubcommand::Rename(args) => projects::handle_project_rename(ctx, args)?,
        },
        Some(Commands::Block(sub)) => match sub {
            BlockSubcommand::Add(args) => blocks::handle_block_add(ctx, args)?,
            BlockSubcommand::Edit(args) => blocks::handle_block_edit(ctx, args)?,
            BlockSubcommand::Delete(args) => blocks::handle_block_delete(ctx, args)?,
            BlockSubcommand::Move(args) => blocks::handle_block_move(ctx, args)?,
        },
        Some(Commands::Edit(args)) => edit::handle_edit(ctx, args)?,
        Some(Commands::Export(sub)) => match sub {
            ExportSubcommand::Project(args) => transfer::handle_export_project(ctx, args)?,
            ExportSubcommand::Catalog(args) => transfer::handle_export_catalog(ctx, args)?,
            ExportSubcommand::All(args) => transfer::handle_export_all(ctx, args)?,
        },
        Some(Commands::Import(args)) => transfer::handle_import(ctx, args)?,
        Some(Commands::Secret(SecretSubcommand::Set(args))) => {
            session::handle_secret_set(ctx, args)?
        }
        Some(Commands::Completions(args)) => misc::handle_completions(args)?,
        None => {
            Cli::command().print_help()?;
            println!();
        }
    }
    Ok(())
}
