//! Result of one wave.

use crate::error::UploadError;
use crate::session::PartReceipt;

/// A part that produced no receipt in this wave. It stays unconfirmed and is
/// expected to be re-offered by the remote in a later wave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPart {
    pub part_number: u32,
    pub reason: String,
}

/// Tagged wave result.
#[derive(Debug)]
pub enum WaveOutcome {
    /// Every planned part produced a receipt.
    Success(Vec<PartReceipt>),
    /// Some parts failed after retries; the receipts that did arrive are still valid.
    PartialFailure {
        receipts: Vec<PartReceipt>,
        failed: Vec<FailedPart>,
    },
    /// Continuing makes no sense (e.g. the local source cannot be read).
    Fatal(UploadError),
}

impl WaveOutcome {
    pub(crate) fn from_parts(
        mut receipts: Vec<PartReceipt>,
        mut failed: Vec<FailedPart>,
        fatal: Option<UploadError>,
    ) -> Self {
        if let Some(e) = fatal {
            return WaveOutcome::Fatal(e);
        }
        receipts.sort_by_key(|r| r.part_number);
        if failed.is_empty() {
            WaveOutcome::Success(receipts)
        } else {
            failed.sort_by_key(|f| f.part_number);
            WaveOutcome::PartialFailure { receipts, failed }
        }
    }

    /// Receipts carried by this outcome (none for `Fatal`).
    pub fn receipts(&self) -> &[PartReceipt] {
        match self {
            WaveOutcome::Success(r) => r,
            WaveOutcome::PartialFailure { receipts, .. } => receipts,
            WaveOutcome::Fatal(_) => &[],
        }
    }

    pub fn failed(&self) -> &[FailedPart] {
        match self {
            WaveOutcome::PartialFailure { failed, .. } => failed,
            WaveOutcome::Success(_) | WaveOutcome::Fatal(_) => &[],
        }
    }
}
