//! Terminal styling helpers
//!
//! Output is written through `anstream`, which strips the escape codes when
//! stdout is not a terminal, so styles are applied unconditionally here.

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;
use std::fmt::Display;
use std::io::IsTerminal;

/// Check mark used in summaries
pub const CHECK: &str = "✓";

/// Semantic styles for CLI output
pub trait Stylize: Display + Sized {
    /// Secondary text
    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    /// Headings and labels
    fn emphasis(&self) -> String {
        self.bold().to_string()
    }

    /// Names and numbers the user cares about
    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    /// Completed work
    fn success(&self) -> String {
        self.green().to_string()
    }

    /// Non-fatal problems
    fn warning(&self) -> String {
        self.yellow().to_string()
    }

    /// Fatal problems
    fn failure(&self) -> String {
        self.red().bold().to_string()
    }
}

impl<T: Display> Stylize for T {}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Muted arrow for list items
pub fn arrow() -> String {
    "→".muted()
}

/// Style for the one-line spinners
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}

/// `text` as a clickable link when the terminal supports it
pub fn hyperlink(text: &str, url: &str) -> String {
    if std::io::stdout().is_terminal() && supports_hyperlinks::supports_hyperlinks() {
        terminal_link::Link::new(text, url).to_string()
    } else {
        format!("{text} ({url})")
    }
}
