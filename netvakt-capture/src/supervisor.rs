//! Capture process supervisor.
//!
//! State machine: Stopped -> Starting -> Running -> (Exited | Crashed) ->
//! Starting after a fixed backoff. A crash (non-zero exit) schedules a
//! restart; a clean exit ends the run; a spawn failure is fatal because
//! no records can ever be produced.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{ChildStderr, Command};
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use netvakt_config::CaptureConfig;

use crate::lines::LineAssembler;

/// Stderr lines matching this are expected startup chatter, not errors.
const EXPECTED_STDERR: &str = "Capturing on";

#[derive(Debug, Error)]
pub enum CaptureError {
    /// Spawn failure (binary missing, permission denied). Fatal: the
    /// service terminates since no records can ever be produced.
    #[error("failed to spawn capture process '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("capture I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fixed argument set asking the capture tool for one line of positional
/// fields per frame, first occurrence only, `|`-separated.
pub fn tshark_args(config: &CaptureConfig) -> Vec<String> {
    let mut args: Vec<String> = [
        "-i",
        config.interface.as_str(),
        "-T",
        "fields",
        "-e",
        "frame.time_epoch",
        "-e",
        "ip.src",
        "-e",
        "ip.dst",
        "-e",
        "tcp.srcport",
        "-e",
        "tcp.dstport",
        "-e",
        "udp.srcport",
        "-e",
        "udp.dstport",
        "-e",
        "ip.proto",
        "-e",
        "frame.len",
        "-e",
        "tcp.flags",
        "-E",
        "separator=|",
        "-E",
        "occurrence=f",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    if let Some(filter) = &config.filter {
        args.push("-f".into());
        args.push(filter.clone());
    }

    args
}

enum SupervisorState {
    Starting,
    Backoff,
}

/// Owns the external capture process and feeds its stdout lines into the
/// pipeline channel.
pub struct CaptureSupervisor {
    config: CaptureConfig,
    lines: mpsc::Sender<String>,
}

impl CaptureSupervisor {
    pub fn new(config: CaptureConfig, lines: mpsc::Sender<String>) -> Self {
        Self { config, lines }
    }

    /// Run until shutdown, a clean capture exit, or a fatal spawn error.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), CaptureError> {
        let backoff = Duration::from_secs(self.config.restart_backoff_secs);
        let mut state = SupervisorState::Starting;

        loop {
            match state {
                SupervisorState::Starting => {
                    if self.capture_once(&mut shutdown).await? {
                        return Ok(());
                    }
                    state = SupervisorState::Backoff;
                }
                SupervisorState::Backoff => {
                    warn!(
                        delay_secs = backoff.as_secs(),
                        "Restarting capture after backoff"
                    );
                    tokio::select! {
                        _ = shutdown.changed() => return Ok(()),
                        _ = sleep(backoff) => {}
                    }
                    state = SupervisorState::Starting;
                }
            }
        }
    }

    /// One Starting -> Running -> (Exited | Crashed) pass. Returns true
    /// when the supervisor should stop (shutdown or clean exit).
    async fn capture_once(
        &self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<bool, CaptureError> {
        info!(
            binary = %self.config.binary,
            interface = %self.config.interface,
            "Starting capture process"
        );

        let mut child = Command::new(&self.config.binary)
            .args(tshark_args(&self.config))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CaptureError::Spawn {
                binary: self.config.binary.clone(),
                source,
            })?;

        let mut stdout = child.stdout.take().expect("capture stdout is piped");
        let stderr = child.stderr.take().expect("capture stderr is piped");
        let stderr_task = tokio::spawn(log_stderr(stderr));

        let mut assembler = LineAssembler::new();
        let mut chunk = [0u8; 4096];
        let mut interrupted = false;

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("Capture supervisor shutting down");
                    let _ = child.start_kill();
                    interrupted = true;
                    break;
                }
                read = stdout.read(&mut chunk) => match read {
                    Ok(0) => break,
                    Ok(n) => {
                        // Capture field output is ASCII; lossy is safe
                        // across chunk boundaries here.
                        let text = String::from_utf8_lossy(&chunk[..n]);
                        for line in assembler.push(&text) {
                            if line.trim().is_empty() {
                                continue;
                            }
                            if self.lines.send(line).await.is_err() {
                                // Pipeline gone; nothing left to feed.
                                let _ = child.start_kill();
                                interrupted = true;
                                break;
                            }
                        }
                        if interrupted {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(%err, "Capture stdout read failed");
                        break;
                    }
                },
            }
        }

        if let Some(partial) = assembler.remainder() {
            debug!(%partial, "Discarding trailing partial line");
        }

        let status = child.wait().await?;
        stderr_task.abort();

        if interrupted {
            return Ok(true);
        }
        if status.success() {
            info!("Capture process exited cleanly");
            return Ok(true);
        }
        warn!(code = ?status.code(), "Capture process crashed");
        Ok(false)
    }
}

async fn log_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.contains(EXPECTED_STDERR) {
            debug!(%line, "capture");
        } else {
            warn!(%line, "capture stderr");
        }
    }
}
