use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::model::SortKey;
use crate::render::OutputFormat;

/// Branches `--main` adds, in order.
pub const MAIN_BRANCHES: [&str; 2] = ["main", "master"];

#[derive(Parser, Debug)]
#[command(
    name = "git-overview",
    about = "Show how far local branches are ahead of or behind their upstream across many repositories",
    long_about = None,
    disable_version_flag = true
)]
pub struct Cli {
    /// Directory to scan for repositories
    #[arg(default_value = ".", value_name = "DIRECTORY")]
    pub directory: PathBuf,

    /// Also check `main` and `master`
    #[arg(short, long)]
    pub main: bool,

    /// Additional branches to check (comma-separated, repeatable)
    #[arg(short, long = "branch", value_name = "BRANCHES", value_delimiter = ',')]
    pub branches: Vec<String>,

    /// Directories to skip (comma-separated, repeatable)
    #[arg(short, long, value_name = "DIRS", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Output format [default: pretty]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Sort key [default: repo]
    #[arg(short, long, value_enum)]
    pub sort: Option<SortKey>,

    /// Maximum width of the Repository and Branch columns [default: 50]
    #[arg(long, value_name = "N")]
    pub max_width: Option<NonZeroUsize>,

    /// Number of repositories to inspect concurrently
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<NonZeroUsize>,

    /// Don't fetch before comparing; use the last known remote state
    #[arg(long)]
    pub no_fetch: bool,

    /// Check every local branch
    #[arg(short, long)]
    pub all_branches: bool,

    /// Verbose logging (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// User config file [default: <config dir>/git-overview/config.toml]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print version and license
    #[arg(short = 'V', long)]
    pub version: bool,
}

impl Cli {
    /// `--main` branches followed by `--branch` values, trimmed, empties dropped.
    pub fn extra_branches(&self) -> Vec<String> {
        let main = MAIN_BRANCHES
            .iter()
            .filter(|_| self.main)
            .map(|b| b.to_string());
        main.chain(non_empty(&self.branches)).collect()
    }

    pub fn excluded_paths(&self) -> Vec<PathBuf> {
        non_empty(&self.exclude).map(PathBuf::from).collect()
    }
}

fn non_empty(values: &[String]) -> impl Iterator<Item = String> + '_ {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn version_banner() -> String {
    format!(
        "git-overview {}\n\
         Copyright (C) 2025 David Bellot\n\
         License GPLv3+: GNU GPL version 3 or later <https://gnu.org/licenses/gpl.html>.\n\
         This is free software: you are free to change and redistribute it.\n\
         There is NO WARRANTY, to the extent permitted by law.\n",
        env!("CARGO_PKG_VERSION")
    )
}
