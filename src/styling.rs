//! Consolidated styling module for terminal output.
//!
//! This module uses the anstyle ecosystem:
//! - anstream for auto-detecting color support
//! - anstyle for composable styling
//! - Semantic style constants for domain-specific use

use anstyle::{AnsiColor, Color, Style};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

// ============================================================================
// Re-exports from anstream (auto-detecting output)
// ============================================================================

/// Auto-detecting eprintln that respects NO_COLOR, CLICOLOR_FORCE, and terminal capabilities
pub use anstream::eprintln;

// ============================================================================
// Semantic Style Constants
// ============================================================================

/// Error style (red) - use as `{ERROR}text{ERROR:#}`
pub const ERROR: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));

/// Warning style (yellow) - use as `{WARNING}text{WARNING:#}`
pub const WARNING: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));

/// Table borders and header
pub const FRAME: Style = Style::new().bold();

pub const BRANCH: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlue)));

/// Non-zero ahead counts
pub const AHEAD: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightGreen)));

/// Non-zero behind counts
pub const BEHIND: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightRed)));

// ============================================================================
// Message Emojis
// ============================================================================

/// Error emoji - use with ERROR style: `eprintln!("{ERROR_EMOJI} {ERROR}message{ERROR:#}");`
pub const ERROR_EMOJI: &str = "❌";

/// Warning emoji - use with WARNING style: `eprintln!("{WARNING_EMOJI} {WARNING}message{WARNING:#}");`
pub const WARNING_EMOJI: &str = "🟡";

pub fn warning_message(msg: impl std::fmt::Display) -> String {
    format!("{WARNING_EMOJI} {WARNING}{msg}{WARNING:#}")
}

pub fn error_message(msg: impl std::fmt::Display) -> String {
    format!("{ERROR_EMOJI} {ERROR}{msg}{ERROR:#}")
}

/// Print a warning to stderr regardless of log level.
pub fn warn(msg: impl std::fmt::Display) {
    eprintln!("{}", warning_message(msg));
}

// ============================================================================
// Styled Output Types
// ============================================================================

/// A piece of text with an optional style
#[derive(Clone, Debug)]
pub struct StyledString {
    pub text: String,
    pub style: Option<Style>,
}

impl StyledString {
    pub fn new(text: impl Into<String>, style: Option<Style>) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    /// Renders to a string with ANSI escape codes
    pub fn render(&self) -> String {
        if let Some(style) = &self.style {
            format!("{}{}{}", style.render(), self.text, style.render_reset())
        } else {
            self.text.clone()
        }
    }
}

/// A line composed of multiple styled strings
#[derive(Clone, Debug, Default)]
pub struct StyledLine {
    pub segments: Vec<StyledString>,
}

impl StyledLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw (unstyled) segment
    pub fn push_raw(&mut self, text: impl Into<String>) {
        self.segments.push(StyledString::raw(text));
    }

    /// Add a segment that is styled only when `style` is set
    pub fn push_maybe_styled(&mut self, text: impl Into<String>, style: Option<Style>) {
        self.segments.push(StyledString::new(text, style));
    }

    /// Renders the entire line with ANSI escape codes
    pub fn render(&self) -> String {
        self.segments.iter().map(|s| s.render()).collect()
    }
}

// ============================================================================
// Width helpers
// ============================================================================

/// Cut `text` to at most `max_width` terminal columns, on a char boundary.
pub fn truncate_to_width(text: &str, max_width: usize) -> &str {
    let mut width = 0;
    for (idx, ch) in text.char_indices() {
        width += ch.width().unwrap_or(0);
        if width > max_width {
            return &text[..idx];
        }
    }
    text
}

/// Truncate or pad `text` with spaces to exactly `width` columns.
pub fn fit_to_width(text: &str, width: usize) -> String {
    let truncated = truncate_to_width(text, width);
    let padding = width.saturating_sub(truncated.width());
    format!("{truncated}{}", " ".repeat(padding))
}
