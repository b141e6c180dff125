//! UI primitives for the Folio CLI.
//!
//! This module provides:
//! - **Context**: Environment detection (TTY, width, color, unicode)
//! - **Mode**: Output mode resolution (json, plain, pretty)
//! - **Theme**: Badge tokens, styles, symbols
//! - **Render**: Tables, headers, receipts, hints, formatted text
//! - **Format**: String utilities (truncate, wrap, dates)
//!
//! # Usage
//!
//! ```ignore
//! use crate::ui::{OutputMode, Badge};
//! use crate::ui::render::{header, table, badge, hint};
//!
//! let ctx = app.ui_context(args.output.json, args.output.format.as_deref());
//!
//! if ctx.mode.is_json() {
//!     // Handle JSON output separately
//!     return Ok(());
//! }
//!
//! println!("{}", header(&ctx, "project list", Some("minecraft")));
//! println!("{}", table(&ctx, &columns, &rows));
//! println!("{}", hint(&ctx, "folio project show <category> <project>"));
//! ```

mod context;
pub mod format;
mod mode;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use mode::OutputMode;
pub use theme::Badge;

pub use render::{
    badge, blank_line, divider, header, header_with_context, hint, kv, print, print_error,
    receipt, simple_table, table, Column,
};

pub use format::{format_datetime, format_remaining, single_line, truncate, wrap};
