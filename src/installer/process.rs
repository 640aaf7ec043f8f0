//! Package-manager child process with cooperative cancellation

use std::future::Future;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use super::PackageManager;
use crate::error::{Result, ScriptifyError};

/// How long output readers may lag behind the exited child. Grandchildren
/// that inherited the pipes can keep them open indefinitely.
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// How an installation ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Completed,
    Cancelled,
}

/// A resolved install invocation
#[derive(Debug, Clone)]
pub struct InstallCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl InstallCommand {
    /// `<manager> install|add <package>` run in `cwd`
    pub fn new(manager: PackageManager, package: &str, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: manager.program().to_string(),
            args: manager.install_args(package),
            cwd: cwd.into(),
        }
    }

    /// Arbitrary program, used for package managers outside [`PackageManager`]
    pub fn custom(program: impl Into<String>, args: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: cwd.into(),
        }
    }
}

/// Run an install command to completion.
///
/// When `cancel` resolves first, the child is sent SIGTERM and the run
/// resolves as [`InstallOutcome::Cancelled`]. Output is collected for error
/// reporting and only logged at debug level.
pub async fn run_install<C>(command: &InstallCommand, cancel: C) -> Result<InstallOutcome>
where
    C: Future<Output = ()>,
{
    tracing::info!(
        "Running {} {} in {}",
        command.program,
        command.args.join(" "),
        command.cwd.display()
    );

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .current_dir(&command.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ScriptifyError::InstallSpawn {
            program: command.program.clone(),
            source,
        })?;

    let stdout = Arc::new(Mutex::new(String::new()));
    let stderr = Arc::new(Mutex::new(String::new()));
    let stdout_task = tokio::spawn(collect_output(child.stdout.take(), "stdout", stdout.clone()));
    let stderr_task = tokio::spawn(collect_output(child.stderr.take(), "stderr", stderr.clone()));

    tokio::pin!(cancel);
    let finished = tokio::select! {
        status = child.wait() => Some(status),
        () = &mut cancel => None,
    };

    let cancelled = finished.is_none();
    let status = match finished {
        Some(status) => status,
        None => {
            tracing::info!("Cancelling {}", command.program);
            terminate(&mut child);
            child.wait().await
        }
    }
    .map_err(|e| ScriptifyError::io(&command.cwd, e))?;

    if cancelled {
        stdout_task.abort();
        stderr_task.abort();
        return classify_exit(status, true, String::new());
    }

    finish_output(stdout_task).await;
    finish_output(stderr_task).await;
    let stderr = stderr.lock().map(|s| s.clone()).unwrap_or_default();

    classify_exit(status, false, stderr)
}

/// Wait for a reader to hit end of stream, giving up after
/// [`OUTPUT_DRAIN_TIMEOUT`]. Whatever it read so far stays in its buffer.
async fn finish_output(mut task: JoinHandle<()>) {
    if tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, &mut task).await.is_err() {
        tracing::debug!("Output pipe still open after exit, stop reading");
        task.abort();
    }
}

fn classify_exit(status: ExitStatus, cancelled: bool, stderr: String) -> Result<InstallOutcome> {
    if status.success() {
        return Ok(InstallOutcome::Completed);
    }

    if terminated_by_sigterm(&status) || cancelled {
        return Ok(InstallOutcome::Cancelled);
    }

    Err(ScriptifyError::InstallFailed {
        code: status.code(),
        stderr,
    })
}

#[cfg(unix)]
fn terminated_by_sigterm(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(libc::SIGTERM)
}

#[cfg(not(unix))]
fn terminated_by_sigterm(_status: &ExitStatus) -> bool {
    false
}

/// Ask the child to stop (SIGTERM on unix, hard kill elsewhere)
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // SAFETY: plain signal delivery to a pid we spawned and still own.
        let rc = unsafe { libc::kill(pid as i32, libc::SIGTERM) };
        if rc == 0 {
            return;
        }
    }

    if let Err(e) = child.start_kill() {
        tracing::warn!("Failed to kill install process: {}", e);
    }
}

async fn collect_output<R>(reader: Option<R>, stream: &'static str, buffer: Arc<Mutex<String>>)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };

    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(stream, "{}", line);
        if let Ok(mut buffer) = buffer.lock() {
            buffer.push_str(&line);
            buffer.push('\n');
        }
    }
}
