//! Pause/abort signalling for a running upload.
//!
//! The orchestrator owns one [`UploadControl`] and hands clones to whoever
//! needs to steer it (CLI control socket, another task). Pause is a plain flag
//! read at the top of the wave loop. Abort is a watch channel so in-flight
//! remote calls and waves can be raced against it.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable handle to one upload's control flags.
#[derive(Debug, Clone)]
pub struct UploadControl {
    paused: Arc<AtomicBool>,
    abort: Arc<watch::Sender<bool>>,
}

impl Default for UploadControl {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadControl {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            paused: Arc::new(AtomicBool::new(false)),
            abort: Arc::new(tx),
        }
    }

    /// Ask the wave loop to stop after the current wave.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    /// Clear a pending pause request. Resuming a paused upload is done through
    /// the orchestrator, which also calls this.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    /// Request abort. Observed immediately by anything awaiting [`Self::aborted`].
    pub fn abort(&self) {
        self.abort.send_replace(true);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub fn is_aborted(&self) -> bool {
        *self.abort.borrow()
    }

    /// Resolves once abort has been requested.
    pub async fn aborted(&self) {
        let mut rx = self.abort.subscribe();
        // The sender lives in `self`, so wait_for only returns once the flag is set.
        let _ = rx.wait_for(|aborted| *aborted).await;
    }

    /// Clear both flags for a fresh upload.
    pub(crate) fn reset(&self) {
        self.paused.store(false, Ordering::Relaxed);
        self.abort.send_replace(false);
    }
}

/// Control socket of a running `mpu upload` (`~/.local/state/mpu/control.sock`).
pub fn default_control_socket_path() -> std::io::Result<PathBuf> {
    let dir = xdg::BaseDirectories::with_prefix("mpu")?.get_state_home();
    Ok(dir.join("control.sock"))
}
