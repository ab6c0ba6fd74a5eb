//! Access to repositories through the `git` command-line tool.
//!
//! [`GitClient`] is the narrow set of primitives the scanner needs. [`GitCli`]
//! implements it by shelling out to `git`, one process per primitive, each
//! with its own timeout. Nothing here reads `.git` directly.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use crate::shell_exec::Cmd;

mod error;
#[cfg(test)]
pub(crate) mod fake;

pub use error::GitError;

/// Upstream configuration of a local branch (`branch.<name>.remote` / `.merge`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    /// Remote name, e.g. `origin`
    pub remote: String,
    /// Full ref on the remote, e.g. `refs/heads/main`
    pub merge: String,
}

/// Repository operations used by the locator and the status collector.
///
/// Implementations must be shareable across the worker pool.
pub trait GitClient: Send + Sync {
    /// Top-level directory of the working tree containing `dir`.
    fn toplevel(&self, dir: &Path) -> Result<PathBuf, GitError>;

    /// Refresh remote-tracking refs from the default remote.
    fn fetch(&self, repo: &Path) -> Result<(), GitError>;

    /// Checked-out branch, or `None` on a detached HEAD.
    fn current_branch(&self, repo: &Path) -> Result<Option<String>, GitError>;

    /// Names of all local branches.
    fn local_branches(&self, repo: &Path) -> Result<Vec<String>, GitError>;

    /// Whether the working tree has untracked, modified or staged changes.
    fn is_dirty(&self, repo: &Path) -> Result<bool, GitError>;

    fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, GitError>;

    /// Upstream of `branch`, or `None` if remote or merge ref is unset.
    fn upstream(&self, repo: &Path, branch: &str) -> Result<Option<Upstream>, GitError>;

    /// Tip SHA of the upstream ref as the remote reports it right now, without fetching.
    fn remote_tip(&self, repo: &Path, upstream: &Upstream) -> Result<Option<String>, GitError>;

    /// Tip SHA of the local branch.
    fn local_tip(&self, repo: &Path, branch: &str) -> Result<String, GitError>;

    /// Number of commits reachable from `head` but not from `base`.
    fn count_commits(&self, repo: &Path, base: &str, head: &str) -> Result<usize, GitError>;

    /// `(ahead, behind)` of `local` relative to `remote`.
    fn ahead_behind(&self, repo: &Path, local: &str, remote: &str) -> Result<(usize, usize), GitError> {
        let ahead = self.count_commits(repo, remote, local)?;
        let behind = self.count_commits(repo, local, remote)?;
        Ok((ahead, behind))
    }
}

/// Timeouts applied to each kind of `git` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTimeouts {
    /// Purely local queries (config, rev-parse, rev-list, status)
    pub local: Duration,
    /// `ls-remote`
    pub remote: Duration,
    /// `fetch`
    pub fetch: Duration,
}

impl Default for CommandTimeouts {
    fn default() -> Self {
        Self {
            local: Duration::from_secs(5),
            remote: Duration::from_secs(10),
            fetch: Duration::from_secs(30),
        }
    }
}

/// [`GitClient`] backed by the installed `git` binary.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    timeouts: CommandTimeouts,
}

impl GitCli {
    pub fn new(timeouts: CommandTimeouts) -> Self {
        Self { timeouts }
    }

    /// Run `git <args>` in `dir`, returning the raw output whatever the exit status.
    fn output(&self, dir: &Path, args: &[&str], timeout: Duration) -> Result<Output, GitError> {
        let cmd = Cmd::new("git")
            .args(args.iter().copied())
            .current_dir(dir)
            .context(context_name(dir))
            .timeout(timeout)
            // Never block a worker on a credential prompt
            .env("GIT_TERMINAL_PROMPT", "0");
        let command = cmd.command_line();
        cmd.run()
            .map_err(|e| GitError::from_io(command, timeout, e))
    }

    /// Run `git <args>` and return trimmed stdout, failing on non-zero exit.
    fn run(&self, dir: &Path, args: &[&str], timeout: Duration) -> Result<String, GitError> {
        let output = self.output(dir, args, timeout)?;
        if !output.status.success() {
            return Err(command_failed(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// `git config --get <key>`; exit status 1 means the key is unset.
    fn config_value(&self, repo: &Path, key: &str) -> Result<Option<String>, GitError> {
        let args = ["config", "--get", key];
        let output = self.output(repo, &args, self.timeouts.local)?;
        match output.status.code() {
            Some(0) => {
                let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok((!value.is_empty()).then_some(value))
            }
            Some(1) => Ok(None),
            _ => Err(command_failed(&args, &output)),
        }
    }
}

impl GitClient for GitCli {
    fn toplevel(&self, dir: &Path) -> Result<PathBuf, GitError> {
        let stdout = self.run(dir, &["rev-parse", "--show-toplevel"], self.timeouts.local)?;
        if stdout.is_empty() {
            return Err(GitError::Parse {
                command: "git rev-parse --show-toplevel".into(),
                output: stdout,
            });
        }
        Ok(PathBuf::from(stdout))
    }

    fn fetch(&self, repo: &Path) -> Result<(), GitError> {
        self.run(repo, &["fetch", "--quiet"], self.timeouts.fetch)
            .map(drop)
    }

    fn current_branch(&self, repo: &Path) -> Result<Option<String>, GitError> {
        let stdout = self.run(repo, &["branch", "--show-current"], self.timeouts.local)?;
        Ok((!stdout.is_empty()).then_some(stdout))
    }

    fn local_branches(&self, repo: &Path) -> Result<Vec<String>, GitError> {
        let stdout = self.run(
            repo,
            &["for-each-ref", "--format=%(refname:short)", "refs/heads/"],
            self.timeouts.local,
        )?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    fn is_dirty(&self, repo: &Path) -> Result<bool, GitError> {
        let stdout = self.run(repo, &["status", "--porcelain"], self.timeouts.local)?;
        Ok(!stdout.is_empty())
    }

    fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, GitError> {
        let refname = format!("refs/heads/{branch}");
        let args = ["show-ref", "--verify", "--quiet", refname.as_str()];
        let output = self.output(repo, &args, self.timeouts.local)?;
        Ok(output.status.success())
    }

    fn upstream(&self, repo: &Path, branch: &str) -> Result<Option<Upstream>, GitError> {
        let Some(remote) = self.config_value(repo, &format!("branch.{branch}.remote"))? else {
            return Ok(None);
        };
        let Some(merge) = self.config_value(repo, &format!("branch.{branch}.merge"))? else {
            return Ok(None);
        };
        Ok(Some(Upstream { remote, merge }))
    }

    fn remote_tip(&self, repo: &Path, upstream: &Upstream) -> Result<Option<String>, GitError> {
        let stdout = self.run(
            repo,
            &["ls-remote", upstream.remote.as_str(), upstream.merge.as_str()],
            self.timeouts.remote,
        )?;
        Ok(parse_ls_remote(&stdout, &upstream.merge))
    }

    fn local_tip(&self, repo: &Path, branch: &str) -> Result<String, GitError> {
        let refname = format!("refs/heads/{branch}");
        let args = ["rev-parse", "--verify", "--quiet", refname.as_str()];
        let stdout = self.run(repo, &args, self.timeouts.local)?;
        if stdout.is_empty() {
            return Err(GitError::Parse {
                command: format!("git {}", args.join(" ")),
                output: stdout,
            });
        }
        Ok(stdout)
    }

    fn count_commits(&self, repo: &Path, base: &str, head: &str) -> Result<usize, GitError> {
        let range = format!("{base}..{head}");
        let args = ["rev-list", "--count", range.as_str()];
        let stdout = self.run(repo, &args, self.timeouts.local)?;
        parse_count(&stdout).ok_or_else(|| GitError::Parse {
            command: format!("git {}", args.join(" ")),
            output: stdout,
        })
    }
}

fn command_failed(args: &[&str], output: &Output) -> GitError {
    GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Short label for log lines: the directory name of the repository.
fn context_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

/// Pick the SHA for `refname` out of `git ls-remote` output.
///
/// ls-remote patterns match on trailing path components, so
/// `refs/heads/main` can also match `refs/heads/team/refs/heads/main`.
/// Only an exact ref match counts.
fn parse_ls_remote(output: &str, refname: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        let sha = parts.next()?;
        let name = parts.next()?;
        (name == refname).then(|| sha.to_string())
    })
}

fn parse_count(output: &str) -> Option<usize> {
    output.trim().parse().ok()
}
