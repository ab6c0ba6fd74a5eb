//! User configuration.
//!
//! An optional TOML file supplies defaults for command-line options. The
//! file lives at `<config dir>/git-overview/config.toml` unless
//! `GIT_OVERVIEW_CONFIG_PATH` or `--config` points elsewhere. Command-line
//! values always win; list options are concatenated, file entries first.
//!
//! ```toml
//! exclude = ["/home/me/src/archive"]
//! branches = ["develop"]
//! main = true
//! format = "simple"
//! sort = "behind"
//! max-width = 40
//! jobs = 8
//! fetch = true
//! fetch-timeout = 30
//! remote-timeout = 10
//! command-timeout = 5
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{ConfigError, File, FileFormat};
use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};
use serde::Deserialize;

use crate::cli::Cli;
use crate::dispatch::default_jobs;
use crate::git::CommandTimeouts;
use crate::model::SortKey;
use crate::render::{DEFAULT_MAX_WIDTH, OutputFormat};
use crate::status::StatusRequest;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "GIT_OVERVIEW_CONFIG_PATH";

/// Contents of the user config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserConfig {
    pub exclude: Vec<PathBuf>,
    pub branches: Vec<String>,
    pub main: bool,
    pub format: Option<OutputFormat>,
    pub sort: Option<SortKey>,
    pub max_width: Option<usize>,
    pub jobs: Option<usize>,
    pub fetch: Option<bool>,
    /// Seconds
    pub fetch_timeout: Option<u64>,
    /// Seconds
    pub remote_timeout: Option<u64>,
    /// Seconds
    pub command_timeout: Option<u64>,
}

impl UserConfig {
    /// Load the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(false))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max-width", self.max_width.map(|v| v as u64)),
            ("jobs", self.jobs.map(|v| v as u64)),
            ("fetch-timeout", self.fetch_timeout),
            ("remote-timeout", self.remote_timeout),
            ("command-timeout", self.command_timeout),
        ];
        for (key, value) in positive {
            if value == Some(0) {
                return Err(ConfigError::Message(format!("{key} must be at least 1")));
            }
        }
        Ok(())
    }
}

/// Config file location: `--config`, then `$GIT_OVERVIEW_CONFIG_PATH`, then
/// the platform config directory. `None` if no location can be determined.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    resolve_config_path(explicit, std::env::var_os(CONFIG_PATH_ENV))
}

fn resolve_config_path(explicit: Option<&Path>, env: Option<OsString>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    // XDG on Linux and macOS, %APPDATA% on Windows
    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("git-overview").join("config.toml"))
}

/// Effective options for one run, after merging the command line over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub directory: PathBuf,
    pub exclude: Vec<PathBuf>,
    pub request: StatusRequest,
    pub format: OutputFormat,
    pub sort: SortKey,
    pub max_width: usize,
    pub jobs: usize,
    pub timeouts: CommandTimeouts,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: UserConfig) -> Self {
        let mut extra_branches = Vec::new();
        if config.main && !cli.main {
            extra_branches.extend(crate::cli::MAIN_BRANCHES.map(String::from));
        }
        extra_branches.extend(
            config
                .branches
                .iter()
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty()),
        );
        extra_branches.extend(cli.extra_branches());

        let mut exclude = config.exclude;
        exclude.extend(cli.excluded_paths());

        let defaults = CommandTimeouts::default();
        let seconds = |value: Option<u64>, default: Duration| {
            value.map(Duration::from_secs).unwrap_or(default)
        };

        Self {
            directory: cli.directory.clone(),
            exclude,
            request: StatusRequest {
                extra_branches,
                all_branches: cli.all_branches,
                fetch: !cli.no_fetch && config.fetch.unwrap_or(true),
            },
            format: cli.format.or(config.format).unwrap_or_default(),
            sort: cli.sort.or(config.sort).unwrap_or_default(),
            max_width: cli
                .max_width
                .map(|n| n.get())
                .or(config.max_width)
                .unwrap_or(DEFAULT_MAX_WIDTH),
            jobs: cli
                .jobs
                .map(|n| n.get())
                .or(config.jobs)
                .unwrap_or_else(default_jobs),
            timeouts: CommandTimeouts {
                local: seconds(config.command_timeout, defaults.local),
                remote: seconds(config.remote_timeout, defaults.remote),
                fetch: seconds(config.fetch_timeout, defaults.fetch),
            },
        }
    }
}
