//! Fan-out of status collection over a bounded worker pool.
//!
//! Each worker takes one repository and runs its whole collection before
//! picking up the next. Workers share nothing but the read-only client and
//! request; results are gathered, flattened and only then sorted.

use std::path::PathBuf;

use anyhow::Context;
use rayon::prelude::*;

use crate::git::GitClient;
use crate::model::{BranchStatus, ResultSet, SortKey};
use crate::status::{StatusRequest, collect_repository};
use crate::styling;

/// Upper bound on the default worker count.
const MAX_DEFAULT_JOBS: usize = 32;

/// `min(32, available parallelism + 4)`.
pub fn default_jobs() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus + 4).min(MAX_DEFAULT_JOBS)
}

/// Collect the statuses of all `repos` using at most `jobs` workers.
///
/// A repository whose collection fails contributes no records and a warning;
/// the others are unaffected. The output is in `repos` order.
pub fn collect_all<C, I>(
    git: &C,
    repos: I,
    request: &StatusRequest,
    jobs: usize,
) -> anyhow::Result<Vec<BranchStatus>>
where
    C: GitClient + ?Sized,
    I: IntoIterator<Item = PathBuf>,
{
    let repos: Vec<PathBuf> = repos.into_iter().collect();
    let jobs = jobs.max(1);
    log::debug!("Collecting {} repositories with {} workers", repos.len(), jobs);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .thread_name(|i| format!("git-overview-{i}"))
        .build()
        .context("failed to start worker pool")?;

    let per_repo: Vec<Vec<BranchStatus>> = pool.install(|| {
        repos
            .par_iter()
            .with_max_len(1)
            .map(|repo| match collect_repository(git, repo, request) {
                Ok(statuses) => statuses,
                Err(err) => {
                    styling::warn(format_args!("Skipping {}: {err}", repo.display()));
                    Vec::new()
                }
            })
            .collect()
    });

    Ok(per_repo.into_iter().flatten().collect())
}

/// Collect, flatten and sort into the final report order.
pub fn scan<C, I>(
    git: &C,
    repos: I,
    request: &StatusRequest,
    jobs: usize,
    sort: SortKey,
) -> anyhow::Result<ResultSet>
where
    C: GitClient + ?Sized,
    I: IntoIterator<Item = PathBuf>,
{
    let statuses = collect_all(git, repos, request, jobs)?;
    Ok(ResultSet::sorted(statuses, sort))
}
