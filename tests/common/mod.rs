//! Fixtures: real repositories with local bare remotes in a temp directory.
//!
//! Repositories are created under `<tmp>/scan`, their remotes under
//! `<tmp>/remotes`, so only the working copies are visible to a scan.

use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Environment that isolates git from the user's and system configuration.
const GIT_ENV: &[(&str, &str)] = &[
    ("GIT_CONFIG_GLOBAL", "/dev/null"),
    ("GIT_CONFIG_SYSTEM", "/dev/null"),
    ("GIT_AUTHOR_DATE", "2025-01-01T00:00:00Z"),
    ("GIT_COMMITTER_DATE", "2025-01-01T00:00:00Z"),
    ("GIT_TERMINAL_PROMPT", "0"),
    ("LC_ALL", "C"),
    ("LANG", "C"),
];

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .envs(GIT_ENV.iter().copied())
        .output()
        .unwrap_or_else(|e| panic!("failed to run git {args:?}: {e}"));

    if !output.status.success() {
        panic!(
            "git {args:?} failed in {}\nstdout:\n{}\nstderr:\n{}",
            dir.display(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub struct TestWorkspace {
    temp_dir: TempDir,
    scan_root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        // macOS tmp is behind a symlink; reports use canonical paths
        let base = dunce::canonicalize(temp_dir.path()).unwrap();
        let scan_root = base.join("scan");
        std::fs::create_dir_all(&scan_root).unwrap();
        std::fs::create_dir_all(base.join("remotes")).unwrap();
        Self {
            temp_dir,
            scan_root,
        }
    }

    /// Directory handed to `git-overview`.
    pub fn scan_root(&self) -> &Path {
        &self.scan_root
    }

    fn remotes(&self) -> PathBuf {
        self.scan_root.with_file_name("remotes")
    }

    /// Repository at `<scan>/<rel>` with one commit on `main`, pushed to a
    /// fresh bare remote with upstream tracking set up.
    pub fn repo(&self, rel: &str) -> PathBuf {
        let path = self.scan_root.join(rel);
        std::fs::create_dir_all(&path).unwrap();
        init_repo(&path);
        commit(&path, "initial");

        let remote = self.remotes().join(format!("{}.git", rel.replace('/', "_")));
        git(
            self.temp_dir.path(),
            &["init", "--bare", "-b", "main", remote.to_str().unwrap()],
        );
        git(&path, &["remote", "add", "origin", remote.to_str().unwrap()]);
        git(&path, &["push", "--quiet", "-u", "origin", "main"]);
        path
    }

    /// Repository with no remote at all.
    pub fn local_repo(&self, rel: &str) -> PathBuf {
        let path = self.scan_root.join(rel);
        std::fs::create_dir_all(&path).unwrap();
        init_repo(&path);
        commit(&path, "initial");
        path
    }

    /// Push `count` new commits to `branch` of `repo`'s remote from a separate
    /// clone, leaving `repo` itself behind.
    pub fn advance_remote(&self, repo: &Path, branch: &str, count: usize) {
        let remote = git(repo, &["config", "--get", "remote.origin.url"]);
        let name = repo.file_name().unwrap().to_string_lossy().into_owned();
        let clone = self.remotes().join(format!("{name}-{branch}-clone"));
        if !clone.exists() {
            git(
                self.temp_dir.path(),
                &["clone", "--quiet", &remote, clone.to_str().unwrap()],
            );
            git(&clone, &["config", "user.name", "Other User"]);
            git(&clone, &["config", "user.email", "other@example.com"]);
        }
        git(&clone, &["checkout", "--quiet", branch]);
        for i in 0..count {
            commit(&clone, &format!("upstream {i}"));
        }
        git(&clone, &["push", "--quiet", "origin", branch]);
    }

    /// `git-overview` with isolated git and config environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = cargo_bin_cmd!("git-overview");
        cmd.envs(GIT_ENV.iter().copied())
            .env(
                "GIT_OVERVIEW_CONFIG_PATH",
                self.temp_dir.path().join("no-config.toml"),
            )
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .current_dir(&self.scan_root);
        cmd
    }
}

fn init_repo(path: &Path) {
    git(path, &["init", "--quiet", "-b", "main"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "user.email", "test@example.com"]);
}

pub fn commit(repo: &Path, message: &str) {
    git(repo, &["commit", "--quiet", "--allow-empty", "-m", message]);
}

/// New branch from HEAD, pushed and tracking `origin/<branch>`.
pub fn push_branch(repo: &Path, branch: &str) {
    git(repo, &["checkout", "--quiet", "-b", branch]);
    git(repo, &["push", "--quiet", "-u", "origin", branch]);
}
