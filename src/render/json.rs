use std::path::Path;

use serde::Serialize;

use crate::model::ResultSet;

#[derive(Serialize)]
struct JsonRow<'a> {
    repository: String,
    path: &'a Path,
    branch: &'a str,
    ahead: usize,
    behind: usize,
    dirty: Option<bool>,
}

/// Pretty-printed JSON array of statuses, including dirtiness.
pub fn render_json(results: &ResultSet) -> String {
    let rows: Vec<JsonRow<'_>> = results
        .iter()
        .map(|s| JsonRow {
            repository: s.repo_name(),
            path: &s.repo,
            branch: &s.branch,
            ahead: s.ahead,
            behind: s.behind,
            dirty: s.dirty,
        })
        .collect();

    // Only non-UTF-8 paths fail here
    let json = serde_json::to_string_pretty(&rows).unwrap_or_else(|_| lossy(results));
    format!("{json}\n")
}

fn lossy(results: &ResultSet) -> String {
    let rows: Vec<serde_json::Value> = results
        .iter()
        .map(|s| {
            serde_json::json!({
                "repository": s.repo_name(),
                "path": s.repo.to_string_lossy(),
                "branch": s.branch,
                "ahead": s.ahead,
                "behind": s.behind,
                "dirty": s.dirty,
            })
        })
        .collect();
    serde_json::Value::Array(rows).to_string()
}
