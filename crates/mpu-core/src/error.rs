//! Session-level error type surfaced to callers of the orchestrator.
//!
//! Per-part failures use [`crate::retry::PartError`] instead; they are retried
//! and then dropped from a wave, never surfaced here directly.

use crate::orchestrator::UploadPhase;

/// Error that ends (or refuses) an upload session.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Bad local or remote configuration (e.g. a zero part size). Not retried.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// Network or HTTP failure on a session-level call (initiate, batch, complete, abort).
    #[error("transport error: {0}")]
    Transport(String),
    /// Remote answered with something that does not fit the protocol.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// The local file could not be read. Not retried.
    #[error("reading source: {0}")]
    Source(String),
    /// The caller aborted the upload.
    #[error("upload cancelled")]
    Cancelled,
    /// The wave loop stopped making progress.
    #[error("upload stalled after {waves} wave(s): {reason}")]
    Stalled { waves: u32, reason: String },
    /// Operation not allowed in the current phase.
    #[error("cannot {action} while {phase}")]
    InvalidState {
        action: &'static str,
        phase: UploadPhase,
    },
}

impl UploadError {
    pub(crate) fn transport(e: impl std::fmt::Display) -> Self {
        UploadError::Transport(e.to_string())
    }

    pub(crate) fn protocol(e: impl std::fmt::Display) -> Self {
        UploadError::Protocol(e.to_string())
    }
}

impl From<curl::Error> for UploadError {
    fn from(e: curl::Error) -> Self {
        UploadError::transport(e)
    }
}
