//! External process execution
//!
//! Every `git` invocation goes through [`Cmd`], which provides:
//! - debug logging of the command line (with the repository as context)
//! - a `[trace]` line with timing and outcome once the command finishes
//! - an optional hard timeout; a command that exceeds it is killed and
//!   reported as [`std::io::ErrorKind::TimedOut`]

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

/// Monotonic epoch for trace timestamps.
static TRACE_EPOCH: OnceLock<Instant> = OnceLock::new();

fn trace_epoch() -> &'static Instant {
    TRACE_EPOCH.get_or_init(Instant::now)
}

/// Extract numeric thread ID from ThreadId's debug format ("ThreadId(N)").
fn thread_id_number() -> u64 {
    let debug_str = format!("{:?}", std::thread::current().id());
    debug_str
        .strip_prefix("ThreadId(")
        .and_then(|s| s.strip_suffix(")"))
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Spawn the process with piped output and wait at most `timeout` for it.
///
/// stdout/stderr are drained on background threads so a chatty child can't
/// block on a full pipe while we wait. On unix the child leads its own process
/// group, and a timeout kills the whole group so helpers it started (ssh,
/// remote helpers, credential helpers) go down with it.
fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> std::io::Result<Output> {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let mut stdout_handle = child.stdout.take();
    let mut stderr_handle = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(ref mut handle) = stdout_handle {
            let _ = handle.read_to_end(&mut buf);
        }
        buf
    });
    let stderr_thread = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(ref mut handle) = stderr_handle {
            let _ = handle.read_to_end(&mut buf);
        }
        buf
    });

    let status = match child.wait_timeout(timeout)? {
        Some(status) => status,
        None => {
            kill_process_tree(&mut child);
            let _ = child.wait();
            // Every holder of the pipes is gone, so the readers reach EOF
            let _ = stdout_thread.join();
            let _ = stderr_thread.join();
            return Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("command timed out after {}s", timeout.as_secs_f32()),
            ));
        }
    };

    let stdout = stdout_thread.join().unwrap_or_default();
    let stderr = stderr_thread.join().unwrap_or_default();

    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

#[cfg(unix)]
fn kill_process_tree(child: &mut Child) {
    // The child's pid is its process group id (see `process_group(0)` above)
    let pgid = nix::unistd::Pid::from_raw(child.id() as i32);
    if nix::sys::signal::killpg(pgid, nix::sys::signal::Signal::SIGKILL).is_err() {
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_process_tree(child: &mut Child) {
    let _ = child.kill();
}

/// Builder for executing commands with logging, tracing and an optional timeout.
///
/// ```ignore
/// let output = Cmd::new("git")
///     .args(["status", "--porcelain"])
///     .current_dir(&repo_path)
///     .context("my-repo")
///     .timeout(Duration::from_secs(5))
///     .run()?;
/// ```
#[derive(Debug, Clone)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    context: Option<String>,
    timeout: Option<Duration>,
    envs: Vec<(String, String)>,
}

impl Cmd {
    /// Create a new command builder for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            context: None,
            timeout: None,
            envs: Vec::new(),
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory for the command.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Set the logging context (typically the repository name).
    pub fn context(mut self, ctx: impl Into<String>) -> Self {
        self.context = Some(ctx.into());
        self
    }

    /// Kill the command if it runs longer than `duration`.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl Into<String>, val: impl Into<String>) -> Self {
        self.envs.push((key.into(), val.into()));
        self
    }

    /// The command line as logged, e.g. `git rev-list --count a..b`.
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    /// Execute the command and return its output.
    ///
    /// A non-zero exit status is *not* an error here; callers inspect
    /// `output.status`. Errors are spawn failures and timeouts.
    pub fn run(self) -> std::io::Result<Output> {
        let cmd_str = self.command_line();

        match &self.context {
            Some(ctx) => log::debug!("$ {} [{}]", cmd_str, ctx),
            None => log::debug!("$ {}", cmd_str),
        }

        let t0 = Instant::now();
        let ts = t0.duration_since(*trace_epoch()).as_micros() as u64;
        let tid = thread_id_number();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, val) in &self.envs {
            cmd.env(key, val);
        }

        let result = match self.timeout {
            Some(timeout) => run_with_timeout(&mut cmd, timeout),
            None => cmd.stdin(Stdio::null()).output(),
        };

        let dur_us = t0.elapsed().as_micros() as u64;
        let context = self.context.as_deref().unwrap_or("-");
        match &result {
            Ok(output) => log::trace!(
                "[trace] ts={} tid={} context={} cmd=\"{}\" dur_us={} ok={}",
                ts,
                tid,
                context,
                cmd_str,
                dur_us,
                output.status.success()
            ),
            Err(e) => log::trace!(
                "[trace] ts={} tid={} context={} cmd=\"{}\" dur_us={} err=\"{}\"",
                ts,
                tid,
                context,
                cmd_str,
                dur_us,
                e
            ),
        }

        result
    }
}
