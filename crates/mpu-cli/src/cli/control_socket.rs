//! Control socket: server (during `mpu upload`) and client (`mpu pause|resume|abort`).
//! Protocol: one command per line: "pause", "resume" or "abort".

use anyhow::{bail, Result};
use mpu_core::UploadControl;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    Abort,
}

impl ControlCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "pause" => Some(ControlCommand::Pause),
            "resume" => Some(ControlCommand::Resume),
            "abort" => Some(ControlCommand::Abort),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ControlCommand::Pause => "pause",
            ControlCommand::Resume => "resume",
            ControlCommand::Abort => "abort",
        }
    }
}

/// Apply a command to the running upload's control flags. A resume that lands
/// before the wave boundary cancels the pending pause.
fn apply(control: &UploadControl, cmd: ControlCommand) {
    match cmd {
        ControlCommand::Pause => control.pause(),
        ControlCommand::Resume => control.resume(),
        ControlCommand::Abort => control.abort(),
    }
}

/// Binds `path` and spawns a task that applies each command line to `control`
/// and forwards it on `tx`. Malformed lines are ignored.
pub fn spawn_control_listener(
    control: UploadControl,
    tx: mpsc::Sender<ControlCommand>,
    path: &Path,
) -> Result<tokio::task::JoinHandle<()>> {
    let _ = std::fs::remove_file(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let listener = UnixListener::bind(path)?;
    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let control = control.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let mut lines = BufReader::new(stream).lines();
                        while let Ok(Some(line)) = lines.next_line().await {
                            match ControlCommand::parse(&line) {
                                Some(cmd) => {
                                    tracing::info!(command = cmd.as_str(), "control command");
                                    apply(&control, cmd);
                                    let _ = tx.try_send(cmd);
                                }
                                None => tracing::debug!(line = %line.trim(), "ignoring control line"),
                            }
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}

/// Sends one command line to the control socket at `socket_path`.
pub async fn send_command(socket_path: &Path, cmd: ControlCommand) -> Result<()> {
    if !socket_path.exists() {
        bail!("no upload is running ({} not found)", socket_path.display());
    }
    let mut stream = UnixStream::connect(socket_path).await?;
    stream.write_all(format!("{}\n", cmd.as_str()).as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
