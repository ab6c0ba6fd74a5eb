//! Four-column table: Repository, Branch, Ahead, Behind.

use anstyle::Style;
use unicode_width::UnicodeWidthStr;

use crate::model::ResultSet;
use crate::styling::{AHEAD, BEHIND, BRANCH, FRAME, StyledLine, fit_to_width};

/// Printed instead of a table when there is nothing to show.
pub const NO_REPOSITORIES: &str = "No Git repositories found.";

const REPO_HEADER: &str = "Repository";
const BRANCH_HEADER: &str = "Branch";
/// Width of the Ahead/Behind value, right-aligned, followed by one space
const COUNT_WIDTH: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStyle {
    /// Unicode borders, ANSI colors
    Pretty,
    /// ASCII borders, no colors
    Simple,
}

struct Borders {
    horizontal: char,
    vertical: char,
    top: [char; 3],
    middle: [char; 3],
    bottom: [char; 3],
}

const UNICODE: Borders = Borders {
    horizontal: '─',
    vertical: '│',
    top: ['┌', '┬', '┐'],
    middle: ['├', '┼', '┤'],
    bottom: ['└', '┴', '┘'],
};

const ASCII: Borders = Borders {
    horizontal: '-',
    vertical: '|',
    top: ['+', '+', '+'],
    middle: ['+', '+', '+'],
    bottom: ['+', '+', '+'],
};

impl TableStyle {
    fn borders(self) -> &'static Borders {
        match self {
            TableStyle::Pretty => &UNICODE,
            TableStyle::Simple => &ASCII,
        }
    }

    /// `style` in pretty mode, nothing in simple mode.
    fn paint(self, style: Style) -> Option<Style> {
        match self {
            TableStyle::Pretty => Some(style),
            TableStyle::Simple => None,
        }
    }
}

/// Render the result set as a bordered table.
///
/// Repository and Branch columns are as wide as their widest value, capped at
/// `max_width` (longer values are truncated) and never narrower than the header.
pub fn render_table(results: &ResultSet, style: TableStyle, max_width: usize) -> String {
    if results.is_empty() {
        return format!("{NO_REPOSITORIES}\n");
    }

    let names: Vec<String> = results.iter().map(|s| s.repo_name()).collect();
    let repo_width = column_width(REPO_HEADER, names.iter().map(String::as_str), max_width);
    let branch_width = column_width(
        BRANCH_HEADER,
        results.iter().map(|s| s.branch.as_str()),
        max_width,
    );
    let widths = [repo_width + 2, branch_width + 2, COUNT_WIDTH + 1, COUNT_WIDTH + 1];

    let borders = style.borders();
    let frame = style.paint(FRAME);
    let rule = |[left, joint, right]: [char; 3]| {
        let mut line = String::new();
        line.push(left);
        for (i, width) in widths.iter().enumerate() {
            if i > 0 {
                line.push(joint);
            }
            line.extend(std::iter::repeat_n(borders.horizontal, *width));
        }
        line.push(right);
        let mut styled = StyledLine::new();
        styled.push_maybe_styled(line, frame);
        styled
    };
    let v = borders.vertical;

    let mut lines = Vec::with_capacity(results.len() + 4);
    lines.push(rule(borders.top));

    let mut header = StyledLine::new();
    header.push_maybe_styled(
        format!(
            "{v} {} {v} {} {v} {:<COUNT_WIDTH$}{v} {:<COUNT_WIDTH$}{v}",
            fit_to_width(REPO_HEADER, repo_width),
            fit_to_width(BRANCH_HEADER, branch_width),
            "Ahead",
            "Behind",
        ),
        frame,
    );
    lines.push(header);
    lines.push(rule(borders.middle));

    for (status, name) in results.iter().zip(&names) {
        let mut row = StyledLine::new();
        row.push_raw(format!("{v} {} {v} ", fit_to_width(name, repo_width)));
        row.push_maybe_styled(fit_to_width(&status.branch, branch_width), style.paint(BRANCH));
        row.push_raw(format!(" {v}"));
        row.push_maybe_styled(
            format!("{:>COUNT_WIDTH$}", status.ahead),
            (status.ahead > 0).then_some(AHEAD).and_then(|s| style.paint(s)),
        );
        row.push_raw(format!(" {v}"));
        row.push_maybe_styled(
            format!("{:>COUNT_WIDTH$}", status.behind),
            (status.behind > 0).then_some(BEHIND).and_then(|s| style.paint(s)),
        );
        row.push_raw(format!(" {v}"));
        lines.push(row);
    }

    lines.push(rule(borders.bottom));

    let mut out = String::new();
    for line in lines {
        out.push_str(&line.render());
        out.push('\n');
    }
    out
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>, max_width: usize) -> usize {
    let widest = values.map(UnicodeWidthStr::width).max().unwrap_or(0);
    widest.min(max_width).max(header.width())
}
