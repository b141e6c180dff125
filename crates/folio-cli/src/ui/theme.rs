//! Symbols, badges and styles.

use owo_colors::{OwoColorize, Style};

/// A symbol with an ASCII fallback for `--ascii` and dumb terminals.
#[derive(Debug, Clone, Copy)]
pub struct SymbolPair {
    pub ascii: &'static str,
    pub unicode: &'static str,
}

impl SymbolPair {
    pub const fn new(ascii: &'static str, unicode: &'static str) -> Self {
        Self { ascii, unicode }
    }

    pub fn get(&self, unicode: bool) -> &'static str {
        if unicode {
            self.unicode
        } else {
            self.ascii
        }
    }
}

/// Block markers used when printing a page.
pub mod symbols {
    use super::SymbolPair;

    pub const SECTION: SymbolPair = SymbolPair::new("#", "\u{00A7}");
    pub const IMAGE: SymbolPair = SymbolPair::new("[img]", "\u{25A3}");
}

/// Status marker in front of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Ok,
    Warn,
    Err,
    Info,
}

impl Badge {
    fn mark(self) -> SymbolPair {
        match self {
            Badge::Ok => SymbolPair::new("[OK]", "[\u{2713}]"),
            Badge::Warn => SymbolPair::new("[WARN]", "[\u{26A0}]"),
            Badge::Err => SymbolPair::new("[ERR]", "[\u{2717}]"),
            Badge::Info => SymbolPair::new("[INFO]", "[\u{2139}]"),
        }
    }

    pub fn display(&self, unicode: bool) -> &'static str {
        self.mark().get(unicode)
    }

    pub fn style(&self) -> Style {
        let base = Style::new().bold();
        match self {
            Badge::Ok => base.green(),
            Badge::Warn => base.yellow(),
            Badge::Err => base.red(),
            Badge::Info => base.cyan(),
        }
    }
}

pub mod styles {
    use owo_colors::Style;

    /// Labels, metadata, hints
    pub fn dim() -> Style {
        Style::new().dimmed()
    }

    /// Titles
    pub fn bold() -> Style {
        Style::new().bold()
    }

    /// Image URLs
    pub fn cyan() -> Style {
        Style::new().cyan()
    }
}

/// Apply `style` to `text` when color is enabled.
pub fn styled(text: &str, style: Style, color: bool) -> String {
    if color {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}
