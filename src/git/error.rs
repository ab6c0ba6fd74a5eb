//! Errors from `git` invocations.
//!
//! Only [`GitError::Spawn`] is fatal for a repository; everything else is a
//! per-query failure that skips one branch (or one step) and nothing more.

use std::time::Duration;

#[derive(Debug)]
pub enum GitError {
    /// The `git` process could not be started at all
    Spawn {
        command: String,
        source: std::io::Error,
    },
    /// The command was killed after exceeding its timeout
    TimedOut { command: String, timeout: Duration },
    /// The command exited non-zero
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    /// The command succeeded but its output was not what we expected
    Parse { command: String, output: String },
}

impl GitError {
    /// Whether this error should abort the whole repository rather than one query.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GitError::Spawn { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, GitError::TimedOut { .. })
    }

    /// Map an I/O error from `Cmd::run` to the matching variant.
    pub(crate) fn from_io(command: String, timeout: Duration, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::TimedOut {
            GitError::TimedOut { command, timeout }
        } else {
            GitError::Spawn {
                command,
                source: err,
            }
        }
    }
}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::Spawn { command, source } => {
                write!(f, "failed to run `{command}`: {source}")
            }
            GitError::TimedOut { command, timeout } => {
                write!(f, "`{command}` timed out after {}s", timeout.as_secs())
            }
            GitError::CommandFailed {
                command,
                code,
                stderr,
            } => {
                match code {
                    Some(code) => write!(f, "`{command}` exited with status {code}")?,
                    None => write!(f, "`{command}` was terminated by a signal")?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
            GitError::Parse { command, output } => {
                write!(f, "unexpected output from `{command}`: {output:?}")
            }
        }
    }
}

impl std::error::Error for GitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GitError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}
