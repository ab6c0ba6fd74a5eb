use std::borrow::Cow;

use crate::model::ResultSet;

const HEADER: &str = "repository,branch,ahead,behind";

/// Header plus one row per status; empty string for an empty result set.
pub fn render_csv(results: &ResultSet) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(HEADER.len() + 1 + results.len() * 32);
    out.push_str(HEADER);
    out.push('\n');
    for status in results {
        let name = status.repo_name();
        out.push_str(&format!(
            "{},{},{},{}\n",
            escape_field(&name),
            escape_field(&status.branch),
            status.ahead,
            status.behind
        ));
    }
    out
}

/// RFC 4180 quoting: only fields containing a delimiter, quote or line break.
fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
