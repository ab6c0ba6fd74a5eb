//! Result records produced by a scan.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Ahead/behind state of one branch of one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchStatus {
    pub repo: PathBuf,
    pub branch: String,
    /// Commits on the local branch missing from its upstream
    pub ahead: usize,
    /// Commits on the upstream missing from the local branch
    pub behind: usize,
    /// Working tree dirtiness of the repository; `None` if it couldn't be determined
    pub dirty: Option<bool>,
}

impl BranchStatus {
    /// Directory name of the repository, as shown in reports.
    pub fn repo_name(&self) -> String {
        repo_name(&self.repo)
    }
}

pub fn repo_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Field the report is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Repository name
    #[default]
    Repo,
    /// Commits ahead of upstream
    Ahead,
    /// Commits behind upstream
    Behind,
}

/// All branch statuses of a scan, in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    statuses: Vec<BranchStatus>,
}

impl ResultSet {
    /// Stable-sort `statuses` ascending by `key`.
    ///
    /// Entries with equal keys keep the order they were given in.
    pub fn sorted(mut statuses: Vec<BranchStatus>, key: SortKey) -> Self {
        match key {
            SortKey::Repo => statuses.sort_by_cached_key(BranchStatus::repo_name),
            SortKey::Ahead => statuses.sort_by_key(|s| s.ahead),
            SortKey::Behind => statuses.sort_by_key(|s| s.behind),
        }
        Self { statuses }
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BranchStatus> {
        self.statuses.iter()
    }

    pub fn as_slice(&self) -> &[BranchStatus] {
        &self.statuses
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a BranchStatus;
    type IntoIter = std::slice::Iter<'a, BranchStatus>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
pub(crate) fn status(repo: &str, branch: &str, ahead: usize, behind: usize) -> BranchStatus {
    BranchStatus {
        repo: PathBuf::from(repo),
        branch: branch.to_string(),
        ahead,
        behind,
        dirty: Some(false),
    }
}
