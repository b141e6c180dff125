//! Text helpers for terminal output.

use chrono::{DateTime, Duration, Utc};

/// Cut `s` to at most `max` characters, ending in `…` when shortened.
pub fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some(_) if max == 0 => String::new(),
        Some(_) => {
            let keep: String = s.chars().take(max - 1).collect();
            format!("{}\u{2026}", keep.trim_end())
        }
    }
}

/// Greedy word wrap to `width` characters.
///
/// Explicit newlines start a new line; blank lines are kept. A word longer
/// than `width` sits on its own line unbroken.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if line_len > 0 && line_len + 1 + word_len > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.push_str(word);
            line_len += word_len;
        }
        lines.push(line);
    }
    lines
}

/// `2025-03-14 10:00 UTC` for people, RFC 3339 for scripts.
pub fn format_datetime(dt: &DateTime<Utc>, pretty: bool) -> String {
    if pretty {
        dt.format("%Y-%m-%d %H:%M UTC").to_string()
    } else {
        dt.to_rfc3339()
    }
}

/// Session time left: `5h 12m`, `12m`, or `expired`.
pub fn format_remaining(span: Duration) -> String {
    if span <= Duration::zero() {
        return "expired".to_string();
    }
    let hours = span.num_hours();
    let minutes = span.num_minutes() - hours * 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes.max(1))
    }
}

/// Collapse line breaks so a value fits on one output line.
pub fn single_line(s: &str) -> String {
    s.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
