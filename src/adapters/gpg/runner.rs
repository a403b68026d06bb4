use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tokio::io::AsyncWriteExt;

use crate::adapters::gpg::status::{StatusLine, parse_status};
use crate::core::errors::{MailPgpError, Result};

/// Output of one gpg invocation.
#[derive(Debug)]
pub struct GpgOutput {
    pub stdout: Vec<u8>,
    /// Human-readable stderr, with status lines removed.
    pub stderr: String,
    pub status: Vec<StatusLine>,
    pub success: bool,
}

impl GpgOutput {
    fn from_raw(output: std::process::Output) -> Self {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let (status, messages) = parse_status(&stderr);
        Self {
            stdout: output.stdout,
            stderr: messages,
            status,
            success: output.status.success(),
        }
    }

    /// Fail with the gpg error text unless the process exited cleanly.
    pub fn ensure_success(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(MailPgpError::GpgFailed {
                reason: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs the system `gpg` binary in batch mode.
///
/// Status lines (`[GNUPG:] ...`) are requested on stderr and parsed
/// out of every run.
#[derive(Debug, Clone)]
pub struct Gpg {
    binary: PathBuf,
    homedir: Option<PathBuf>,
}

impl Gpg {
    pub fn new(binary: PathBuf, homedir: Option<PathBuf>) -> Self {
        Self { binary, homedir }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Check if gpg can be started.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn base_args(&self) -> Vec<String> {
        let mut args = vec![
            "--batch".to_string(),
            "--no-tty".to_string(),
            "--status-fd".to_string(),
            "2".to_string(),
        ];
        if let Some(home) = &self.homedir {
            args.push("--homedir".to_string());
            args.push(home.to_string_lossy().into_owned());
        }
        args
    }

    fn spawn_error(&self, e: std::io::Error) -> MailPgpError {
        if e.kind() == std::io::ErrorKind::NotFound {
            MailPgpError::GpgUnavailable {
                reason: format!("'{}' not found", self.binary.display()),
            }
        } else {
            MailPgpError::GpgFailed {
                reason: format!("Failed to run gpg: {e}"),
            }
        }
    }

    /// Run gpg to completion, feeding `stdin_data` if given.
    pub fn run(&self, args: &[&str], stdin_data: Option<&[u8]>) -> Result<GpgOutput> {
        tracing::trace!(?args, "running gpg");

        let mut cmd = Command::new(&self.binary);
        cmd.args(self.base_args())
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if stdin_data.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = cmd.spawn().map_err(|e| self.spawn_error(e))?;

        if let (Some(data), Some(mut stdin)) = (stdin_data, child.stdin.take()) {
            stdin
                .write_all(data)
                .map_err(|e| MailPgpError::GpgFailed {
                    reason: format!("Failed to write to gpg stdin: {e}"),
                })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| MailPgpError::GpgFailed {
                reason: format!("gpg process failed: {e}"),
            })?;

        Ok(GpgOutput::from_raw(output))
    }

    /// Async variant of [`Gpg::run`] for long-running operations.
    pub async fn run_async(&self, args: &[&str], stdin_data: Option<&[u8]>) -> Result<GpgOutput> {
        tracing::trace!(?args, "running gpg");

        let mut cmd = tokio::process::Command::new(&self.binary);
        cmd.args(self.base_args())
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if stdin_data.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = cmd.spawn().map_err(|e| self.spawn_error(e))?;

        if let (Some(data), Some(mut stdin)) = (stdin_data, child.stdin.take()) {
            stdin
                .write_all(data)
                .await
                .map_err(|e| MailPgpError::GpgFailed {
                    reason: format!("Failed to write to gpg stdin: {e}"),
                })?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| MailPgpError::GpgFailed {
                reason: format!("gpg process failed: {e}"),
            })?;

        Ok(GpgOutput::from_raw(output))
    }
}

impl Default for Gpg {
    fn default() -> Self {
        Self::new(PathBuf::from("gpg"), None)
    }
}
