//! Repository discovery.
//!
//! Walks a directory tree (following symlinks) and collects the top-level
//! root of every git working copy found. Descent stops at the first `.git`
//! on each path, so repositories nested inside another one are not reported.
//! Hidden directories and excluded paths are pruned with their whole subtree.

use std::collections::{BTreeSet, HashSet};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::git::GitClient;
use crate::styling;

/// Find the distinct repository roots under `start`.
///
/// Unreadable subdirectories are reported as warnings and skipped. If `start`
/// itself can't be read, the error is reported and the scan ends with
/// whatever was found so far.
pub fn find_repositories<C>(start: &Path, exclude: &[PathBuf], git: &C) -> BTreeSet<PathBuf>
where
    C: GitClient + ?Sized,
{
    let mut repos = BTreeSet::new();

    if !start.is_dir() {
        styling::warn(format_args!("{} is not a directory", start.display()));
        return repos;
    }

    let excluded: HashSet<PathBuf> = exclude.iter().map(|p| canonicalize_best_effort(p)).collect();

    let mut walker = WalkDir::new(start).follow_links(true).into_iter();
    while let Some(next) = walker.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                styling::eprintln!(
                    "{}",
                    styling::error_message(format_args!(
                        "Error traversing {}: {err}",
                        start.display()
                    ))
                );
                break;
            }
            Err(err) if is_dangling_symlink(&err) => {
                log::debug!("Skipping dangling symlink: {err}");
                continue;
            }
            Err(err) => {
                match (err.path(), err.io_error()) {
                    (Some(path), Some(io)) => {
                        styling::warn(format_args!("Cannot access {}: {io}", path.display()));
                    }
                    _ => styling::warn(&err),
                }
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();

        if entry.depth() > 0 && is_hidden(entry.file_name()) {
            walker.skip_current_dir();
            continue;
        }

        if !excluded.is_empty() && excluded.contains(&canonicalize_best_effort(dir)) {
            log::debug!("Excluding {}", dir.display());
            walker.skip_current_dir();
            continue;
        }

        if has_git_entry(dir) {
            match git.toplevel(dir) {
                Ok(top) => {
                    let top = canonicalize_best_effort(&top);
                    log::debug!("Found repository {} (via {})", top.display(), dir.display());
                    repos.insert(top);
                }
                Err(err) => {
                    styling::warn(format_args!("Cannot access {}: {err}", dir.display()));
                }
            }
            walker.skip_current_dir();
        }
    }

    repos
}

/// A followed link whose target doesn't exist. Not a traversal failure.
fn is_dangling_symlink(err: &walkdir::Error) -> bool {
    let not_found = err
        .io_error()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound);
    not_found
        && err
            .path()
            .and_then(|p| p.symlink_metadata().ok())
            .is_some_and(|meta| meta.file_type().is_symlink())
}

/// `.git` may be a directory or, for linked worktrees and submodules, a file.
fn has_git_entry(dir: &Path) -> bool {
    dir.join(".git").symlink_metadata().is_ok()
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn canonicalize_best_effort(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
