//! Report rendering.
//!
//! All renderers are pure functions of a [`ResultSet`] returning the complete
//! text to print.

use serde::Deserialize;

use crate::model::ResultSet;

mod csv;
mod json;
mod table;

pub use csv::render_csv;
pub use json::render_json;
pub use table::{NO_REPOSITORIES, TableStyle, render_table};

/// Default cap on the Repository and Branch column widths.
pub const DEFAULT_MAX_WIDTH: usize = 50;

/// Output format selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Unicode box-drawing table with colors (falls back to simple when not a terminal)
    #[default]
    Pretty,
    /// ASCII table without colors
    Simple,
    /// Comma-separated values with a header row
    Csv,
    /// JSON array, including working-tree dirtiness
    Json,
}

/// Render `results` in `format`.
///
/// `pretty` only applies when stdout is a terminal; otherwise the simple
/// table is used so redirected output contains no escape sequences.
pub fn render(
    results: &ResultSet,
    format: OutputFormat,
    is_terminal: bool,
    max_width: usize,
) -> String {
    match format {
        OutputFormat::Csv => render_csv(results),
        OutputFormat::Json => render_json(results),
        OutputFormat::Pretty if is_terminal => render_table(results, TableStyle::Pretty, max_width),
        OutputFormat::Pretty | OutputFormat::Simple => {
            render_table(results, TableStyle::Simple, max_width)
        }
    }
}
