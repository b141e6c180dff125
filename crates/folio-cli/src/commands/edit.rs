//! Interactive page editing with autosave.
//!
//! Stdin is read on a helper thread so the loop can wake up for autosave
//! deadlines while the user is idle.

use std::io::BufRead;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;

use chrono::Utc;
use folio_core::editor::Direction;
use folio_core::workspace::FlushOutcome;
use folio_core::{BlockKind, FolioError};
use tracing::debug;

use crate::app::{AppContext, FolioWorkspace};
use crate::cli::EditArgs;
use crate::ui::theme::{styled, styles};
use crate::ui::{badge, blank_line, header, hint, print, Badge, OutputMode, UiContext};

use super::projects::render_page;

const HELP: &str = "\
Commands:
  show                  print the page
  add <kind> [index]    insert a text, title or image block
  set <index> <text>    replace a block's text or image URL
  del <index>           delete a block
  up <index>            move a block up
  down <index>          move a block down
  title <text>          change the page title
  load <file>           replace the page with an exported file
  save                  write now
  quit                  save and leave";

/// One line of input in the edit loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EditCommand {
    Show,
    Add(BlockKind, Option<usize>),
    Set(usize, String),
    Delete(usize),
    Move(usize, Direction),
    Title(String),
    Load(String),
    Save,
    Help,
    Quit,
}

fn parse_index(raw: Option<&str>) -> Result<usize, String> {
    let raw = raw.ok_or_else(|| "missing block index".to_string())?;
    raw.parse::<usize>()
        .map_err(|_| format!("not a block index: {}", raw))
}

fn required_text(rest: &str, what: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("missing {}", what))
    } else {
        Ok(rest.to_string())
    }
}

impl FromStr for EditCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();
        match word.to_ascii_lowercase().as_str() {
            "show" | "ls" => Ok(EditCommand::Show),
            "add" => {
                let kind = args
                    .next()
                    .ok_or_else(|| "missing block kind".to_string())?
                    .parse::<BlockKind>()
                    .map_err(|e| e.to_string())?;
                let at = match args.next() {
                    Some(raw) => Some(parse_index(Some(raw))?),
                    None => None,
                };
                Ok(EditCommand::Add(kind, at))
            }
            "set" => {
                let (index, text) = match rest.split_once(char::is_whitespace) {
                    Some((index, text)) => (index, text.trim()),
                    None => (rest, ""),
                };
                let index = parse_index(Some(index).filter(|s| !s.is_empty()))?;
                Ok(EditCommand::Set(index, text.to_string()))
            }
            "del" | "delete" => Ok(EditCommand::Delete(parse_index(args.next())?)),
            "up" => Ok(EditCommand::Move(parse_index(args.next())?, Direction::Up)),
            "down" => Ok(EditCommand::Move(parse_index(args.next())?, Direction::Down)),
            "title" => Ok(EditCommand::Title(required_text(rest, "title")?)),
            "load" => Ok(EditCommand::Load(required_text(rest, "file path")?)),
            "save" | "w" => Ok(EditCommand::Save),
            "help" | "?" => Ok(EditCommand::Help),
            "quit" | "exit" | "q" => Ok(EditCommand::Quit),
            other => Err(format!("unknown command: {} (try `help`)", other)),
        }
    }
}

fn spawn_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn report_flush(ui_ctx: &UiContext, outcome: FlushOutcome) {
    match outcome {
        FlushOutcome::Saved(reason) => {
            debug!(?reason, "autosaved");
            if ui_ctx.mode.is_pretty() {
                print(ui_ctx, &styled("autosaved", styles::dim(), ui_ctx.color));
            }
        }
        FlushOutcome::Failed(_) => {
            print(
                ui_ctx,
                &badge(ui_ctx, Badge::Warn, "Autosave failed; will retry"),
            );
        }
    }
}

/// Run one command. Returns `false` when the loop should end.
fn apply(
    ui_ctx: &UiContext,
    workspace: &mut FolioWorkspace,
    command: EditCommand,
) -> Result<bool, FolioError> {
    let len = workspace.current().map(|o| o.document().len()).unwrap_or(0);
    let out_of_range = |index: usize| {
        FolioError::InvalidInput(format!("block {} does not exist ({} blocks)", index, len))
    };
    match command {
        EditCommand::Show => {
            if let Some(open) = workspace.current() {
                render_page(ui_ctx, open.document());
            }
        }
        EditCommand::Add(kind, at) => {
            let index = workspace.insert_block(kind, at)?;
            print(ui_ctx, &format!("added {} block at {}", kind, index));
        }
        EditCommand::Set(index, text) => {
            if index >= len {
                return Err(out_of_range(index));
            }
            workspace.update_block(index, &text)?;
        }
        EditCommand::Delete(index) => {
            if index >= len {
                return Err(out_of_range(index));
            }
            workspace.delete_block(index)?;
        }
        EditCommand::Move(index, direction) => {
            if index >= len {
                return Err(out_of_range(index));
            }
            if !workspace.move_block(index, direction)? {
                print(ui_ctx, "already at the edge");
            }
        }
        EditCommand::Title(title) => {
            workspace.rename(&title)?;
        }
        EditCommand::Load(path) => {
            let raw = std::fs::read_to_string(&path)?;
            workspace.import_into_open(&raw)?;
            print(ui_ctx, &badge(ui_ctx, Badge::Ok, "Page loaded from file"));
        }
        EditCommand::Save => {
            workspace.save()?;
            print(ui_ctx, &badge(ui_ctx, Badge::Ok, "Saved"));
        }
        EditCommand::Help => print(ui_ctx, HELP),
        EditCommand::Quit => return Ok(false),
    }
    Ok(true)
}

pub fn handle_edit(ctx: &AppContext, args: &EditArgs) -> anyhow::Result<()> {
    let mut workspace = ctx.open_workspace()?;
    if !workspace.gate().guard(workspace.store()) {
        return Err(FolioError::AuthRequired.into());
    }
    let ui_ctx = ctx.ui_context(false, None);

    let title = workspace
        .open(&args.target.category, &args.target.project)?
        .name()
        .to_string();
    if ui_ctx.mode.is_pretty() {
        print(&ui_ctx, &header(&ui_ctx, "edit", Some(&title)));
        blank_line(&ui_ctx);
        if let Some(open) = workspace.current() {
            render_page(&ui_ctx, open.document());
        }
        blank_line(&ui_ctx);
        print(&ui_ctx, &hint(&ui_ctx, "type `help` for commands, `quit` to leave"));
    }

    let lines = spawn_reader();
    loop {
        let received = match workspace.autosave().next_deadline() {
            Some(deadline) => {
                let wait = (deadline - Utc::now()).to_std().unwrap_or_default();
                lines.recv_timeout(wait)
            }
            None => lines.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => match line.parse::<EditCommand>() {
                Ok(command) => match apply(&ui_ctx, &mut workspace, command) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(FolioError::LastBlock) => print(
                        &ui_ctx,
                        &badge(&ui_ctx, Badge::Warn, "Cannot delete the last content block"),
                    ),
                    Err(err) if err.is_recoverable() => {
                        print(&ui_ctx, &badge(&ui_ctx, Badge::Warn, &err.to_string()))
                    }
                    Err(err) => print(&ui_ctx, &badge(&ui_ctx, Badge::Err, &err.to_string())),
                },
                Err(message) => print(&ui_ctx, &badge(&ui_ctx, Badge::Err, &message)),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(outcome) = workspace.tick(Utc::now()) {
            report_flush(&ui_ctx, outcome);
        }
    }

    workspace.close()?;
    if !ctx.quiet() {
        match ui_ctx.mode {
            OutputMode::Pretty => print(&ui_ctx, &badge(&ui_ctx, Badge::Ok, "Page saved")),
            OutputMode::Plain | OutputMode::Json => println!("status=ok"),
        }
    }
    Ok(())
}
