//! Subprocess execution with streamed output.

use crate::bundler::{Error, Result};
use std::{
    collections::BTreeMap,
    path::PathBuf,
    process::{ExitStatus, Stdio},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::Command,
};

/// Options for [`run_streaming`].
#[derive(Debug, Default, Clone)]
pub struct ExecOptions {
    /// Working directory, or the current one.
    pub cwd: Option<PathBuf>,
    /// Variables set on top of the inherited environment.
    pub env: BTreeMap<String, String>,
}

/// Result of a finished process.
#[derive(Debug)]
pub struct ExecOutput {
    /// Exit status of the process
    pub status: ExitStatus,
    /// Captured stderr lines
    pub stderr_lines: Vec<String>,
}

impl ExecOutput {
    /// Converts a non-zero exit into [`Error::BuildExecution`].
    pub fn check(self, command: &str) -> Result<Self> {
        if self.status.success() {
            return Ok(self);
        }
        Err(Error::BuildExecution {
            command: command.to_string(),
            exit_code: self.status.code().unwrap_or(-1),
            stderr: self.stderr_lines,
        })
    }
}

/// Runs `program args...` to completion.
///
/// Stdout is streamed line by line to the log. Stderr is forwarded to the log
/// as well and captured for error reporting. There is no timeout: a hung
/// process blocks the caller.
pub async fn run_streaming(program: &str, args: &[String], options: &ExecOptions) -> Result<ExecOutput> {
    let mut command = Command::new(program);
    command
        .args(args)
        .envs(&options.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = &options.cwd {
        command.current_dir(cwd);
    }

    log::debug!("Running: {} {}", program, args.join(" "));

    let mut child = command.spawn().map_err(|e| {
        Error::GenericError(format!("Failed to spawn `{program}`: {e}"))
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Drain both pipes concurrently
    let (_, stderr_lines) = tokio::join!(
        async {
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    log::info!("  {}", line);
                }
            }
        },
        async {
            let mut captured = Vec::new();
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    log::info!("  {}", line);
                    captured.push(line);
                }
            }
            captured
        }
    );

    let status = child.wait().await?;

    Ok(ExecOutput {
        status,
        stderr_lines,
    })
}
