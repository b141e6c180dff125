//! Rendering primitives for CLI output.
//!
//! Every function returns the text for the resolved [`OutputMode`]: pretty
//! output for people, `key=value` lines and tab-separated rows for scripts,
//! and nothing in JSON mode (commands print their own JSON document).

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{ASCII_MARKDOWN, NOTHING, UTF8_FULL};
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use super::context::UiContext;
use super::mode::OutputMode;
use super::theme::{styled, styles, Badge};

const MAX_PATH_WIDTH: usize = 50;

/// Keep the tail of a long path, which holds the file name.
fn shorten_path(path: &str) -> String {
    let len = path.chars().count();
    if len <= MAX_PATH_WIDTH {
        return path.to_string();
    }
    let tail: String = path.chars().skip(len - (MAX_PATH_WIDTH - 3)).collect();
    format!("...{}", tail)
}

/// `Folio · <command> (<context>)`, optionally followed by the store path.
///
/// Plain mode prints `folio <command>`; JSON mode prints nothing.
pub fn header_with_context(
    ctx: &UiContext,
    command: &str,
    context: Option<&str>,
    store: Option<&str>,
) -> String {
    match ctx.mode {
        OutputMode::Json => String::new(),
        OutputMode::Plain => format!("folio {}", command),
        OutputMode::Pretty => {
            let mut line = format!(
                "{} \u{00B7} {}",
                styled("Folio", styles::bold(), ctx.color),
                command
            );
            if let Some(context) = context {
                line.push_str(&format!(" ({})", context));
            }
            match store {
                Some(path) => format!("{}\n{}", line, kv(ctx, "Store", &shorten_path(path))),
                None => line,
            }
        }
    }
}

pub fn header(ctx: &UiContext, command: &str, context: Option<&str>) -> String {
    header_with_context(ctx, command, context, None)
}

pub fn divider(ctx: &UiContext) -> String {
    match ctx.mode {
        OutputMode::Pretty => "\u{2500}".repeat(ctx.width.min(60)),
        _ => "---".to_string(),
    }
}

pub fn badge(ctx: &UiContext, kind: Badge, message: &str) -> String {
    let mark = styled(kind.display(ctx.unicode), kind.style(), ctx.color);
    if message.is_empty() {
        mark
    } else {
        format!("{} {}", mark, message)
    }
}

/// `Last Modified` becomes `last_modified` in plain output.
fn plain_key(key: &str) -> String {
    key.trim().to_lowercase().replace(' ', "_")
}

/// `Key: value` (dim key) when pretty, `key=value` otherwise.
pub fn kv(ctx: &UiContext, key: &str, value: &str) -> String {
    if ctx.mode.is_pretty() {
        format!(
            "{} {}",
            styled(&format!("{}:", key), styles::dim(), ctx.color),
            value
        )
    } else {
        format!("{}={}", plain_key(key), value)
    }
}

pub fn hint(ctx: &UiContext, text: &str) -> String {
    if ctx.mode.is_pretty() {
        format!("{} {}", styled("Hint:", styles::dim(), ctx.color), text)
    } else {
        format!("hint={}", text)
    }
}

/// Summary printed after a successful change.
///
/// Pretty output is an OK badge with indented details; plain output starts
/// with `status=ok`.
pub fn receipt(ctx: &UiContext, title: &str, items: &[(&str, &str)]) -> String {
    let (first, indent) = if ctx.mode.is_pretty() {
        (badge(ctx, Badge::Ok, title), "  ")
    } else {
        ("status=ok".to_string(), "")
    };
    std::iter::once(first)
        .chain(
            items
                .iter()
                .map(|(key, value)| format!("{}{}", indent, kv(ctx, key, value))),
        )
        .collect::<Vec<_>>()
        .join("\n")
}

/// A table column.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    pub numeric: bool,
}

impl Column {
    pub const fn new(header: &'static str) -> Self {
        Self {
            header,
            numeric: false,
        }
    }

    /// Right-align the column in pretty tables.
    pub const fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }
}

/// Plain rows are tab-separated; project names contain spaces.
fn plain_rows(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_table(ctx: &UiContext, columns: &[Column], rows: &[Vec<String>], boxed: bool) -> String {
    let mut out = Table::new();
    match (boxed, ctx.unicode) {
        (true, true) => {
            out.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
        }
        (true, false) => {
            out.load_preset(ASCII_MARKDOWN);
        }
        (false, _) => {
            out.load_preset(NOTHING);
        }
    }
    out.set_content_arrangement(ContentArrangement::Dynamic);
    out.set_width(ctx.width.min(u16::MAX as usize) as u16);

    out.set_header(columns.iter().map(|column| {
        let cell = Cell::new(column.header);
        if !boxed && ctx.color {
            cell.add_attribute(Attribute::Dim)
        } else {
            cell
        }
    }));
    for (i, column) in columns.iter().enumerate() {
        if let Some(col) = out.column_mut(i) {
            if column.numeric {
                col.set_cell_alignment(CellAlignment::Right);
            }
            if !boxed {
                col.set_padding((0, 2));
            }
        }
    }
    for row in rows {
        out.add_row(row);
    }
    out.to_string()
}

/// Bordered table in pretty mode, tab-separated rows otherwise.
pub fn table(ctx: &UiContext, columns: &[Column], rows: &[Vec<String>]) -> String {
    if ctx.mode.is_pretty() {
        build_table(ctx, columns, rows, true)
    } else {
        plain_rows(rows)
    }
}

/// Borderless table with dim headers, for short lists.
pub fn simple_table(ctx: &UiContext, columns: &[Column], rows: &[Vec<String>]) -> String {
    if ctx.mode.is_pretty() {
        build_table(ctx, columns, rows, false)
    } else {
        plain_rows(rows)
    }
}

/// Print to stdout unless the command is in JSON mode.
pub fn print(ctx: &UiContext, message: &str) {
    if !ctx.mode.is_json() {
        println!("{}", message);
    }
}

pub fn blank_line(ctx: &UiContext) {
    if ctx.mode.is_pretty() {
        println!();
    }
}

/// Error text for stderr.
///
/// Pretty: an error badge and a dim hint line. Plain: `Error: ...` and
/// `hint=...` with the `Hint: ` prefix removed.
pub fn error_message(ctx: &UiContext, message: &str, error_hint: Option<&str>) -> String {
    let (head, tail) = if ctx.mode.is_pretty() {
        (
            badge(ctx, Badge::Err, message),
            error_hint.map(|h| styled(h, styles::dim(), ctx.color)),
        )
    } else {
        (
            format!("Error: {}", message),
            error_hint.map(|h| format!("hint={}", h.strip_prefix("Hint: ").unwrap_or(h))),
        )
    };
    match tail {
        Some(tail) => format!("{}\n{}", head, tail),
        None => head,
    }
}

pub fn print_error(ctx: &UiContext, message: &str, error_hint: Option<&str>) {
    eprintln!("{}", error_message(ctx, message, error_hint));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(mode: OutputMode) -> UiContext {
        UiContext {
            color: false,
            unicode: mode == OutputMode::Pretty,
            width: 80,
            mode,
        }
    }

    #[test]
    fn test_header_by_mode() {
        let pretty = header(&ctx(OutputMode::Pretty), "project list", Some("minecraft"));
        assert_eq!(pretty, "Folio \u{00B7} project list (minecraft)");
        assert_eq!(header(&ctx(OutputMode::Plain), "status", None), "folio status");
        assert!(header(&ctx(OutputMode::Json), "status", None).is_empty());
    }

    #[test]
    fn test_header_keeps_tail_of_long_store_path() {
        let path = format!("/home/someone/{}/folio.db", "x".repeat(60));
        let h = header_with_context(&ctx(OutputMode::Pretty), "status", None, Some(&path));
        let store_line = h.lines().nth(1).unwrap();
        assert!(store_line.starts_with("Store: ..."));
        assert!(store_line.ends_with("/folio.db"));
        assert_eq!(store_line.len(), "Store: ".len() + MAX_PATH_WIDTH);
    }

    #[test]
    fn test_short_path_untouched() {
        assert_eq!(shorten_path("/tmp/folio.db"), "/tmp/folio.db");
    }

    #[test]
    fn test_kv_and_hint() {
        let plain = ctx(OutputMode::Plain);
        assert_eq!(kv(&plain, "Last Modified", "2025-03-14"), "last_modified=2025-03-14");
        assert_eq!(hint(&plain, "folio login"), "hint=folio login");
        assert_eq!(kv(&ctx(OutputMode::Pretty), "Title", "Voyage"), "Title: Voyage");
    }

    #[test]
    fn test_receipt_by_mode() {
        let items = [("Category", "minecraft"), ("Slug", "voyage")];
        assert_eq!(
            receipt(&ctx(OutputMode::Plain), "Project added", &items),
            "status=ok\ncategory=minecraft\nslug=voyage"
        );
        let pretty = receipt(&ctx(OutputMode::Pretty), "Project added", &items);
        let lines: Vec<&str> = pretty.lines().collect();
        assert!(lines[0].ends_with("Project added"));
        assert_eq!(lines[1], "  Category: minecraft");
    }

    #[test]
    fn test_plain_tables_are_tab_separated() {
        let columns = [Column::new("Slug"), Column::new("Name")];
        let rows = vec![
            vec!["world-of-life-mod".to_string(), "World of Life Mod".to_string()],
            vec!["voyage".to_string(), "Voyage".to_string()],
        ];
        let expected = "world-of-life-mod\tWorld of Life Mod\nvoyage\tVoyage";
        assert_eq!(table(&ctx(OutputMode::Plain), &columns, &rows), expected);
        assert_eq!(simple_table(&ctx(OutputMode::Plain), &columns, &rows), expected);
    }

    #[test]
    fn test_pretty_tables_show_headers() {
        let columns = [Column::new("Id"), Column::new("Projects").numeric()];
        let rows = vec![vec!["minecraft".to_string(), "2".to_string()]];
        let boxed = table(&ctx(OutputMode::Pretty), &columns, &rows);
        assert!(boxed.contains("Projects"));
        assert!(boxed.contains("minecraft"));

        let empty = simple_table(&ctx(OutputMode::Pretty), &columns, &[]);
        assert!(empty.contains("Id"));
    }

    #[test]
    fn test_error_message_by_mode() {
        let plain = error_message(
            &ctx(OutputMode::Plain),
            "Authentication required",
            Some("Hint: Run `folio login`."),
        );
        assert_eq!(plain, "Error: Authentication required\nhint=Run `folio login`.");

        let pretty = error_message(&ctx(OutputMode::Pretty), "Incorrect password", None);
        assert!(pretty.contains("Incorrect password"));
        assert!(!pretty.contains('\n'));
    }
}
