//! Rendering context: what the terminal supports and which mode was asked for.

use std::io::IsTerminal;

use super::mode::{FormatRequest, OutputMode};

const FALLBACK_WIDTH: usize = 80;

/// Facts about the process environment that shape output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Terminal {
    pub stdout_tty: bool,
    pub dumb: bool,
    pub no_color_env: bool,
    pub width: Option<usize>,
}

impl Terminal {
    pub fn detect() -> Self {
        Self {
            stdout_tty: std::io::stdout().is_terminal(),
            dumb: std::env::var("TERM").is_ok_and(|term| term == "dumb"),
            no_color_env: std::env::var_os("NO_COLOR").is_some(),
            width: columns_env().or_else(ioctl_width),
        }
    }
}

/// Settings every renderer receives.
#[derive(Debug, Clone)]
pub struct UiContext {
    pub color: bool,
    pub unicode: bool,
    pub width: usize,
    pub mode: OutputMode,
}

impl UiContext {
    /// Build the context from the live terminal and the output flags.
    pub fn from_env(json: bool, format: Option<&str>, no_color: bool, ascii: bool) -> Self {
        Self::for_terminal(Terminal::detect(), json, format, no_color, ascii)
    }

    pub(crate) fn for_terminal(
        term: Terminal,
        json: bool,
        format: Option<&str>,
        no_color: bool,
        ascii: bool,
    ) -> Self {
        let mode = OutputMode::resolve(
            json,
            FormatRequest::parse(format),
            term.stdout_tty,
            term.dumb,
        );
        Self {
            color: term.stdout_tty && !term.dumb && !term.no_color_env && !no_color,
            unicode: !ascii,
            width: term.width.unwrap_or(FALLBACK_WIDTH),
            mode,
        }
    }
}

/// `COLUMNS`, when set to a positive number.
fn columns_env() -> Option<usize> {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|cols| cols.trim().parse::<usize>().ok())
        .filter(|&width| width > 0)
}

#[cfg(unix)]
fn ioctl_width() -> Option<usize> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    // SAFETY: TIOCGWINSZ only writes into the winsize we pass.
    let rc = unsafe {
        libc::ioctl(
            libc::STDOUT_FILENO,
            libc::TIOCGWINSZ,
            &mut size as *mut libc::winsize,
        )
    };
    (rc == 0 && size.ws_col > 0).then_some(size.ws_col as usize)
}

#[cfg(not(unix))]
fn ioctl_width() -> Option<usize> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tty() -> Terminal {
        Terminal {
            stdout_tty: true,
            dumb: false,
            no_color_env: false,
            width: Some(120),
        }
    }

    #[test]
    fn test_interactive_terminal_is_pretty_and_colored() {
        let ctx = UiContext::for_terminal(tty(), false, None, false, false);
        assert_eq!(ctx.mode, OutputMode::Pretty);
        assert!(ctx.color);
        assert!(ctx.unicode);
        assert_eq!(ctx.width, 120);
    }

    #[test]
    fn test_color_switches() {
        assert!(!UiContext::for_terminal(tty(), false, None, true, false).color);

        let no_color = Terminal {
            no_color_env: true,
            ..tty()
        };
        assert!(!UiContext::for_terminal(no_color, false, None, false, false).color);

        let dumb = Terminal { dumb: true, ..tty() };
        let ctx = UiContext::for_terminal(dumb, false, None, false, false);
        assert!(!ctx.color);
        assert_eq!(ctx.mode, OutputMode::Plain);
    }

    #[test]
    fn test_piped_output_is_plain_without_color() {
        let piped = Terminal {
            stdout_tty: false,
            width: None,
            ..tty()
        };
        let ctx = UiContext::for_terminal(piped, false, None, false, true);
        assert_eq!(ctx.mode, OutputMode::Plain);
        assert!(!ctx.color);
        assert!(!ctx.unicode);
        assert_eq!(ctx.width, FALLBACK_WIDTH);
    }

    #[test]
    fn test_json_flag() {
        let ctx = UiContext::for_terminal(tty(), true, Some("pretty"), false, false);
        assert!(ctx.mode.is_json());
    }
}
