//! Caller-facing upload state and run settings.

use crate::config::MpuConfig;
use crate::progress::CALCULATING;
use crate::retry::RetryPolicy;

/// Snapshot of the current upload for presentation. Owned and written only by
/// the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadState {
    pub upload_id: Option<String>,
    pub file_name: String,
    pub file_size: u64,
    pub uploaded_size: u64,
    pub speed: String,
    pub time_remaining: String,
}

impl UploadState {
    pub fn new(file_name: impl Into<String>, file_size: u64) -> Self {
        Self {
            upload_id: None,
            file_name: file_name.into(),
            file_size,
            uploaded_size: 0,
            speed: "0.0 B".to_string(),
            time_remaining: CALCULATING.to_string(),
        }
    }
}

impl Default for UploadState {
    fn default() -> Self {
        Self::new(String::new(), 0)
    }
}

/// How the orchestrator was told to finish a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Session finalized; the remote's reference to the stored object.
    Completed { file_url: String },
    /// Stopped at a wave boundary; call `resume` to continue.
    Paused,
    /// Aborted by the caller; local state was reset.
    Aborted,
}

/// Knobs for one orchestrator.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub bucket: String,
    pub retry: RetryPolicy,
    /// Cap on parts in flight within one wave (`None` = whole wave at once).
    pub max_concurrent_parts: Option<usize>,
    /// Hard ceiling on waves for one session.
    pub max_waves: u32,
    /// Consecutive waves without a new receipt before giving up.
    pub max_stalled_waves: u32,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self::from(&MpuConfig::default())
    }
}

impl From<&MpuConfig> for UploadSettings {
    fn from(cfg: &MpuConfig) -> Self {
        Self {
            bucket: cfg.bucket.clone(),
            retry: cfg.retry_policy(),
            max_concurrent_parts: cfg.max_concurrent_parts,
            max_waves: cfg.max_waves.max(1),
            max_stalled_waves: cfg.max_stalled_waves.max(1),
        }
    }
}
