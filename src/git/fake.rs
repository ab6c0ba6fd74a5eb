//! Scripted in-memory [`GitClient`] for unit tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use super::{GitClient, GitError, Upstream};

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeBranch {
    pub upstream: Option<Upstream>,
    pub local_sha: Option<String>,
    pub remote_sha: Option<String>,
    /// `(ahead, behind)`; `None` makes the count query fail
    pub counts: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeRepo {
    pub current: Option<String>,
    pub dirty: bool,
    pub fetch_times_out: bool,
    /// Every query fails as if `git` were missing
    pub broken: bool,
    pub branches: Vec<(String, FakeBranch)>,
}

impl FakeRepo {
    pub fn on(current: &str) -> Self {
        Self {
            current: Some(current.to_string()),
            ..Self::default()
        }
    }

    /// Add a branch tracking `origin/<name>` with the given divergence.
    pub fn tracking(mut self, name: &str, ahead: usize, behind: usize) -> Self {
        self.branches.push((
            name.to_string(),
            FakeBranch {
                upstream: Some(Upstream {
                    remote: "origin".into(),
                    merge: format!("refs/heads/{name}"),
                }),
                local_sha: Some(format!("local-{name}")),
                remote_sha: Some(format!("remote-{name}")),
                counts: Some((ahead, behind)),
            },
        ));
        self
    }

    pub fn branch(mut self, name: &str, branch: FakeBranch) -> Self {
        self.branches.push((name.to_string(), branch));
        self
    }

    fn get(&self, name: &str) -> Option<&FakeBranch> {
        self.branches
            .iter()
            .find(|(branch, _)| branch == name)
            .map(|(_, branch)| branch)
    }
}

/// A fake keyed by repository path. Paths without an entry behave like
/// directories that aren't repositories.
#[derive(Debug, Default)]
pub(crate) struct FakeGit {
    repos: HashMap<PathBuf, FakeRepo>,
    /// Map a directory to a different toplevel (linked worktrees, symlinks)
    toplevels: HashMap<PathBuf, PathBuf>,
    fetched: Mutex<HashSet<PathBuf>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(mut self, path: impl Into<PathBuf>, repo: FakeRepo) -> Self {
        self.repos.insert(path.into(), repo);
        self
    }

    pub fn with_toplevel(mut self, dir: impl Into<PathBuf>, top: impl Into<PathBuf>) -> Self {
        self.toplevels.insert(dir.into(), top.into());
        self
    }

    pub fn was_fetched(&self, repo: &Path) -> bool {
        self.fetched.lock().unwrap().contains(repo)
    }

    fn repo(&self, path: &Path, command: &str) -> Result<&FakeRepo, GitError> {
        let repo = self.repos.get(path).ok_or_else(|| GitError::CommandFailed {
            command: command.to_string(),
            code: Some(128),
            stderr: "fatal: not a git repository".into(),
        })?;
        if repo.broken {
            return Err(GitError::Spawn {
                command: command.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "git not found"),
            });
        }
        Ok(repo)
    }

    fn branch(&self, path: &Path, name: &str, command: &str) -> Result<&FakeBranch, GitError> {
        self.repo(path, command)?
            .get(name)
            .ok_or_else(|| failed(command))
    }
}

fn failed(command: &str) -> GitError {
    GitError::CommandFailed {
        command: command.to_string(),
        code: Some(1),
        stderr: String::new(),
    }
}

impl GitClient for FakeGit {
    fn toplevel(&self, dir: &Path) -> Result<PathBuf, GitError> {
        Ok(self
            .toplevels
            .get(dir)
            .cloned()
            .unwrap_or_else(|| dir.to_path_buf()))
    }

    fn fetch(&self, repo: &Path) -> Result<(), GitError> {
        let fake = self.repo(repo, "git fetch")?;
        self.fetched.lock().unwrap().insert(repo.to_path_buf());
        if fake.fetch_times_out {
            return Err(GitError::TimedOut {
                command: "git fetch".into(),
                timeout: Duration::from_secs(30),
            });
        }
        Ok(())
    }

    fn current_branch(&self, repo: &Path) -> Result<Option<String>, GitError> {
        Ok(self.repo(repo, "git branch --show-current")?.current.clone())
    }

    fn local_branches(&self, repo: &Path) -> Result<Vec<String>, GitError> {
        Ok(self
            .repo(repo, "git for-each-ref")?
            .branches
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn is_dirty(&self, repo: &Path) -> Result<bool, GitError> {
        Ok(self.repo(repo, "git status --porcelain")?.dirty)
    }

    fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, GitError> {
        Ok(self.repo(repo, "git show-ref")?.get(branch).is_some())
    }

    fn upstream(&self, repo: &Path, branch: &str) -> Result<Option<Upstream>, GitError> {
        Ok(self
            .branch(repo, branch, "git config")?
            .upstream
            .clone())
    }

    fn remote_tip(&self, repo: &Path, upstream: &Upstream) -> Result<Option<String>, GitError> {
        let fake = self.repo(repo, "git ls-remote")?;
        Ok(fake
            .branches
            .iter()
            .find(|(_, branch)| branch.upstream.as_ref() == Some(upstream))
            .and_then(|(_, branch)| branch.remote_sha.clone()))
    }

    fn local_tip(&self, repo: &Path, branch: &str) -> Result<String, GitError> {
        self.branch(repo, branch, "git rev-parse")?
            .local_sha
            .clone()
            .ok_or_else(|| failed("git rev-parse"))
    }

    fn count_commits(&self, repo: &Path, base: &str, head: &str) -> Result<usize, GitError> {
        let fake = self.repo(repo, "git rev-list --count")?;
        for (_, branch) in &fake.branches {
            let (Some(local), Some(remote)) = (&branch.local_sha, &branch.remote_sha) else {
                continue;
            };
            let Some((ahead, behind)) = branch.counts else {
                continue;
            };
            if base == remote && head == local {
                return Ok(ahead);
            }
            if base == local && head == remote {
                return Ok(behind);
            }
        }
        Err(failed("git rev-list --count"))
    }
}
