//! Output mode selection.

/// How a command writes its results to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// A single JSON document, nothing else
    Json,
    /// `key=value` lines and tab-separated rows for scripts
    #[default]
    Plain,
    /// Tables, badges and colors for people
    Pretty,
}

/// Parsed value of `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatRequest {
    Json,
    Plain,
    Pretty,
    /// No (or an unrecognized) format: decide from the terminal
    Auto,
}

impl FormatRequest {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => FormatRequest::Json,
            Some("plain") | Some("text") => FormatRequest::Plain,
            Some("pretty") | Some("table") => FormatRequest::Pretty,
            _ => FormatRequest::Auto,
        }
    }
}

impl OutputMode {
    /// `--json` wins, then an explicit `--format`; otherwise pretty only on
    /// an interactive stdout that is not `TERM=dumb`.
    pub fn resolve(
        json_flag: bool,
        request: FormatRequest,
        stdout_tty: bool,
        term_is_dumb: bool,
    ) -> Self {
        if json_flag {
            return OutputMode::Json;
        }
        match request {
            FormatRequest::Json => OutputMode::Json,
            FormatRequest::Plain => OutputMode::Plain,
            FormatRequest::Pretty => OutputMode::Pretty,
            FormatRequest::Auto if stdout_tty && !term_is_dumb => OutputMode::Pretty,
            FormatRequest::Auto => OutputMode::Plain,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, OutputMode::Json)
    }

    pub fn is_pretty(&self) -> bool {
        matches!(self, OutputMode::Pretty)
    }
}
