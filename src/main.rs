use std::io::{IsTerminal, Write};

use anyhow::Context;
use clap::Parser;
use git_overview::cli::{Cli, version_banner};
use git_overview::config::{Settings, UserConfig, config_path};
use git_overview::git::GitCli;
use git_overview::locate::find_repositories;
use git_overview::render::render;
use git_overview::{dispatch, styling};

fn main() {
    let cli = Cli::parse();

    if cli.version {
        print!("{}", version_banner());
        return;
    }

    init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        styling::eprintln!("{}", styling::error_message(format_args!("{err:#}")));
        std::process::exit(1);
    }
}

/// `warn` by default, overridable through `RUST_LOG`; `-v`/`-vv` force debug/trace.
fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.format_timestamp(None).format_target(false).init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match config_path(cli.config.as_deref()) {
        Some(path) => UserConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => UserConfig::default(),
    };
    let settings = Settings::resolve(cli, config);
    log::debug!("Settings: {settings:?}");

    let git = GitCli::new(settings.timeouts);
    let repos = find_repositories(&settings.directory, &settings.exclude, &git);
    log::debug!(
        "Found {} repositories under {}",
        repos.len(),
        settings.directory.display()
    );

    let results = dispatch::scan(
        &git,
        repos,
        &settings.request,
        settings.jobs,
        settings.sort,
    )?;

    let stdout = std::io::stdout();
    let report = render(
        &results,
        settings.format,
        stdout.is_terminal(),
        settings.max_width,
    );

    let mut out = anstream::AutoStream::auto(stdout.lock());
    match out.write_all(report.as_bytes()).and_then(|()| out.flush()) {
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        result => result.context("Failed to write report"),
    }
}
