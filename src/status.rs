//! Per-repository status collection.
//!
//! For one repository: refresh remote-tracking refs, work out which branches
//! to look at, and compute ahead/behind for each one that has a reachable
//! upstream. Branches that can't be resolved (no local ref, no upstream, remote
//! unreachable, failed count) are skipped without any user-visible message;
//! only a fatal [`GitError`] aborts the repository.

use std::path::Path;

use crate::git::{GitClient, GitError};
use crate::model::BranchStatus;
use crate::styling;

/// What to collect for each repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRequest {
    /// Branches to check in addition to the current one, in order
    pub extra_branches: Vec<String>,
    /// Also check every local branch
    pub all_branches: bool,
    /// Run `git fetch` before comparing
    pub fetch: bool,
}

/// Collect the branch statuses of one repository.
///
/// Returns `Err` only for faults that make the repository unusable (e.g. the
/// `git` binary can't be started); everything else degrades to fewer records.
pub fn collect_repository<C>(
    git: &C,
    repo: &Path,
    request: &StatusRequest,
) -> Result<Vec<BranchStatus>, GitError>
where
    C: GitClient + ?Sized,
{
    if request.fetch {
        match git.fetch(repo) {
            Ok(()) => {}
            Err(e) if e.is_timeout() => {
                styling::warn(format_args!(
                    "git fetch timed out for {}; using cached remote state",
                    repo.display()
                ));
            }
            Err(e) => soft(e, repo, "fetch")?,
        }
    }

    let current = match git.current_branch(repo) {
        Ok(branch) => branch,
        Err(e) => {
            soft(e, repo, "current branch")?;
            None
        }
    };

    // Not rendered by the table or CSV output; carried for JSON
    let dirty = match git.is_dirty(repo) {
        Ok(dirty) => Some(dirty),
        Err(e) => {
            soft(e, repo, "working tree status")?;
            None
        }
    };

    let local = if request.all_branches {
        match git.local_branches(repo) {
            Ok(branches) => branches,
            Err(e) => {
                soft(e, repo, "branch list")?;
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let candidates = candidate_branches(current.as_deref(), &request.extra_branches, &local);

    let mut statuses = Vec::new();
    for branch in candidates {
        match branch_status(git, repo, &branch) {
            Ok(Some((ahead, behind))) => statuses.push(BranchStatus {
                repo: repo.to_path_buf(),
                branch,
                ahead,
                behind,
                dirty,
            }),
            Ok(None) => {
                log::debug!("{}: skipping {branch} (no upstream to compare)", repo.display());
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                log::debug!("{}: skipping {branch}: {e}", repo.display());
            }
        }
    }

    Ok(statuses)
}

/// Propagate fatal errors; log and swallow the rest.
fn soft(err: GitError, repo: &Path, what: &str) -> Result<(), GitError> {
    if err.is_fatal() {
        return Err(err);
    }
    log::debug!("{}: {what} unavailable: {err}", repo.display());
    Ok(())
}

/// `(ahead, behind)` for `branch`, or `None` if there is nothing to compare against.
fn branch_status<C>(git: &C, repo: &Path, branch: &str) -> Result<Option<(usize, usize)>, GitError>
where
    C: GitClient + ?Sized,
{
    if !git.branch_exists(repo, branch)? {
        return Ok(None);
    }
    let Some(upstream) = git.upstream(repo, branch)? else {
        return Ok(None);
    };
    let Some(remote_sha) = git.remote_tip(repo, &upstream)? else {
        return Ok(None);
    };
    let local_sha = git.local_tip(repo, branch)?;
    git.ahead_behind(repo, &local_sha, &remote_sha).map(Some)
}

/// Current branch first, then extras, then all local branches; first occurrence wins.
pub fn candidate_branches(current: Option<&str>, extra: &[String], local: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let all = current
        .into_iter()
        .chain(extra.iter().map(String::as_str))
        .chain(local.iter().map(String::as_str));
    for branch in all {
        let branch = branch.trim();
        if branch.is_empty() || out.iter().any(|b| b == branch) {
            continue;
        }
        out.push(branch.to_string());
    }
    out
}
