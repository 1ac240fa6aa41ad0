//! OS command execution with a hard timeout.
//!
//! Every command runs through `sh -c` and is awaited to completion or until
//! its timeout fires, whichever comes first. A timed-out child is killed.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

/// Outcome of one shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    /// `-1` when the process was killed by a signal or timed out.
    pub exit_code: i32,
    pub timed_out: bool,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }

    pub fn timed_out() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: -1,
            timed_out: true,
        }
    }
}

/// Quote `arg` for `sh` when it contains anything beyond a plain word.
pub fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':'));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// Something that can run a shell command line.
#[allow(async_fn_in_trait)]
pub trait Shell {
    /// Run `command` and wait at most `timeout`.
    ///
    /// `Err` means the command could not be started at all; a non-zero exit
    /// or a timeout is reported through `ExecResult`.
    async fn run(&self, command: &str, timeout: Duration) -> anyhow::Result<ExecResult>;
}

/// Runs commands on the host via `sh -c`.
#[derive(Debug, Clone, Default)]
pub struct SystemShell;

impl Shell for SystemShell {
    async fn run(&self, command: &str, timeout: Duration) -> anyhow::Result<ExecResult> {
        if command.trim().is_empty() {
            anyhow::bail!("Empty command");
        }
        debug!(command, ?timeout, "Running shell command");

        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to spawn '{}': {}", command, e))?;

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                Ok(ExecResult {
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                    exit_code: output.status.code().unwrap_or(-1),
                    timed_out: false,
                })
            }
            Err(_) => {
                // Dropping the wait future drops the child, which kills it.
                warn!(command, ?timeout, "Command timed out");
                Ok(ExecResult::timed_out())
            }
        }
    }
}
