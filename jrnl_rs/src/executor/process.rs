//! Subprocess backend: spawns the real jrnl binary.

use std::future::Future;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command as TokioCommand;
use tracing::{debug, warn};

use super::{RunOutput, Runner};
use crate::command::with_journal_override;
use crate::config::JrnlConfig;

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone)]
pub struct ProcessRunner {
    binary: String,
    timeout: Duration,
    max_output_bytes: usize,
    journal_override: Option<String>,
}

#[derive(Debug, Default)]
struct Captured {
    text: String,
    overflowed: bool,
}

/// Read a pipe to EOF, keeping at most `cap` bytes.
///
/// Keeps draining past the cap so the child never blocks on a full pipe.
async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>, cap: usize) -> Captured {
    let Some(mut pipe) = pipe else {
        return Captured::default();
    };
    let mut kept = Vec::new();
    let mut overflowed = false;
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        match pipe.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let room = cap.saturating_sub(kept.len());
                if n > room {
                    overflowed = true;
                }
                kept.extend_from_slice(&buf[..n.min(room)]);
            }
            Err(e) => {
                debug!("pipe read failed: {}", e);
                break;
            }
        }
    }
    Captured {
        text: String::from_utf8_lossy(&kept).into_owned(),
        overflowed,
    }
}

impl ProcessRunner {
    pub fn new(config: &JrnlConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            timeout: config.timeout,
            max_output_bytes: config.max_output_bytes,
            journal_override: config.journal_override.clone(),
        }
    }

    fn spawn_failure(&self, err: std::io::Error) -> RunOutput {
        debug!("jrnl process error: {}", err);
        let message = if err.kind() == ErrorKind::NotFound {
            format!("\n{}: command not found ({})", self.binary, err)
        } else {
            format!("\nfailed to spawn {}: {}", self.binary, err)
        };
        RunOutput::failed(message)
    }

    async fn run_process(&self, args: &[String]) -> RunOutput {
        let argv = with_journal_override(args, self.journal_override.as_deref());

        let spawned = TokioCommand::new(&self.binary)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => return self.spawn_failure(e),
        };

        let mut stdout_task = tokio::spawn(drain(child.stdout.take(), self.max_output_bytes));
        let mut stderr_task = tokio::spawn(drain(child.stderr.take(), self.max_output_bytes));

        // One deadline covers the exit and both pipes: a descendant that
        // inherited stdout can hold it open after jrnl itself has exited.
        let finished = tokio::time::timeout(self.timeout, async {
            let status = child.wait().await;
            let stdout = (&mut stdout_task).await.unwrap_or_default();
            let stderr = (&mut stderr_task).await.unwrap_or_default();
            (status, stdout, stderr)
        })
        .await;

        let (status, stdout, mut stderr) = match finished {
            Ok((Ok(status), stdout, stderr)) => (Some(status), stdout, stderr.text),
            Ok((Err(e), stdout, stderr)) => {
                warn!("waiting for jrnl failed: {}", e);
                let _ = child.kill().await;
                (None, stdout, stderr.text)
            }
            Err(_) => {
                let _ = child.kill().await;
                stdout_task.abort();
                stderr_task.abort();
                return RunOutput::failed(format!(
                    "\nCommand timed out after {}ms",
                    self.timeout.as_millis()
                ));
            }
        };

        if stdout.overflowed {
            stderr.push_str(&format!(
                "\nOutput exceeded {} bytes",
                self.max_output_bytes
            ));
            return RunOutput {
                stdout: stdout.text,
                stderr,
                success: false,
                exit_code: status.and_then(|s| s.code()),
            };
        }

        RunOutput {
            stdout: stdout.text,
            stderr,
            success: status.is_some_and(|s| s.success()),
            exit_code: status.and_then(|s| s.code()),
        }
    }
}

impl Runner for ProcessRunner {
    fn run(&self, args: &[String]) -> impl Future<Output = RunOutput> + Send {
        self.run_process(args)
    }
}
