//! Upload orchestrator: the state machine driving one file through
//! initiate → waves → complete (or abort).
//!
//! One orchestrator owns one session's mutable state (phase, receipts, upload
//! state). Other tasks steer it only through its [`UploadControl`]. Separate
//! uploads use separate orchestrators and share nothing mutable.

mod finish;
mod phase;
mod run;
mod state;

pub use phase::UploadPhase;
pub use state::{UploadOutcome, UploadSettings, UploadState};

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::chunker::Part;
use crate::control::UploadControl;
use crate::error::UploadError;
use crate::progress::ProgressEvent;
use crate::remote::SessionApi;
use crate::session::{PartReceipt, ReceiptSet, UploadSession};
use crate::source::{PartSource, SelectedFile};
use crate::transport::PartTransport;

/// Per-session working set, alive from initiation to finalize/abort.
struct ActiveSession {
    session: UploadSession,
    parts: Vec<Part>,
    source: Arc<dyn PartSource>,
    receipts: ReceiptSet,
    waves: u32,
    stalled_waves: u32,
}

pub struct Orchestrator {
    api: Arc<dyn SessionApi>,
    transport: Arc<dyn PartTransport>,
    settings: UploadSettings,
    control: UploadControl,
    progress_tx: Option<mpsc::Sender<ProgressEvent>>,
    phase: UploadPhase,
    file: Option<SelectedFile>,
    state: UploadState,
    active: Option<ActiveSession>,
}

impl Orchestrator {
    pub fn new(
        api: Arc<dyn SessionApi>,
        transport: Arc<dyn PartTransport>,
        settings: UploadSettings,
    ) -> Self {
        Self {
            api,
            transport,
            settings,
            control: UploadControl::new(),
            progress_tx: None,
            phase: UploadPhase::Idle,
            file: None,
            state: UploadState::default(),
            active: None,
        }
    }

    /// Deliver a [`ProgressEvent`] after every wave. Events are dropped if the
    /// receiver falls behind.
    pub fn with_progress(mut self, tx: mpsc::Sender<ProgressEvent>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Handle for pausing or aborting from another task.
    pub fn control(&self) -> UploadControl {
        self.control.clone()
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Receipts confirmed so far in the current session, by part number.
    pub fn confirmed_receipts(&self) -> Vec<PartReceipt> {
        self.active
            .as_ref()
            .map(|a| a.receipts.to_vec())
            .unwrap_or_default()
    }

    /// Choose the file for the next upload. Not allowed while a session is live.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), UploadError> {
        if !self.phase.can_transition_to(UploadPhase::Idle) {
            return Err(UploadError::InvalidState {
                action: "select a file",
                phase: self.phase,
            });
        }
        self.state = UploadState::new(file.name.clone(), file.size());
        self.file = Some(file);
        self.phase = UploadPhase::Idle;
        Ok(())
    }

    /// Initiate a session for the selected file under `destination` and run
    /// waves until the upload completes, is paused, or is aborted.
    pub async fn start_upload(&mut self, destination: &str) -> Result<UploadOutcome, UploadError> {
        if self.phase != UploadPhase::Idle {
            return Err(UploadError::InvalidState {
                action: "start an upload",
                phase: self.phase,
            });
        }
        let file = self
            .file
            .clone()
            .ok_or_else(|| UploadError::Configuration("no file selected".into()))?;
        self.control.reset();
        self.initiate(&file, destination).await?;
        if self.control.is_aborted() {
            return Ok(self.abort_session().await);
        }
        self.transition(UploadPhase::Uploading);
        self.run_waves().await
    }

    /// Continue a paused upload with the same session and receipts.
    pub async fn resume(&mut self) -> Result<UploadOutcome, UploadError> {
        if self.phase != UploadPhase::Paused {
            return Err(UploadError::InvalidState {
                action: "resume",
                phase: self.phase,
            });
        }
        self.control.resume();
        if self.control.is_aborted() {
            return Ok(self.abort_session().await);
        }
        tracing::info!(upload_id = ?self.state.upload_id, "resuming upload");
        self.transition(UploadPhase::Uploading);
        self.run_waves().await
    }

    /// Abort the current session (if any) and reset local state.
    ///
    /// While `start_upload`/`resume` is running, use [`UploadControl::abort`]
    /// instead; the loop performs the same steps. No-op once the run has ended.
    pub async fn abort(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        self.control.abort();
        self.abort_session().await;
    }

    fn transition(&mut self, to: UploadPhase) {
        if !self.phase.can_transition_to(to) {
            tracing::warn!(from = %self.phase, to = %to, "unexpected phase transition");
        }
        tracing::debug!(from = %self.phase, to = %to, "phase");
        self.phase = to;
    }

    fn active(&self) -> Result<&ActiveSession, UploadError> {
        self.active.as_ref().ok_or(UploadError::InvalidState {
            action: "continue without a session",
            phase: self.phase,
        })
    }

    fn active_mut(&mut self) -> Result<&mut ActiveSession, UploadError> {
        let phase = self.phase;
        self.active.as_mut().ok_or(UploadError::InvalidState {
            action: "continue without a session",
            phase,
        })
    }

    /// Forget the session, receipts and file; keep the phase.
    fn reset_local(&mut self) {
        self.active = None;
        self.file = None;
        self.state = UploadState::default();
    }
}
