//! Batch coordinator: exchanges receipts for waves of destinations and fans
//! each wave out to the part uploader.
//!
//! Waves never overlap; the next wave is requested only after the current
//! one's results are merged, because the remote hands out destinations in
//! exchange for confirmed receipts.

mod execute;
mod outcome;
mod plan;

pub use execute::{execute_wave, WaveContext};
pub use outcome::{FailedPart, WaveOutcome};
pub use plan::{plan_wave, WavePlan};

use std::sync::Arc;

use crate::error::UploadError;
use crate::remote::{call_blocking, BatchAssignment, SessionApi};
use crate::session::PartReceipt;

/// Ask the remote for the next wave, sending the full cumulative receipt set.
///
/// Sending everything confirmed so far keeps the call idempotent: a repeated
/// request after a lost response carries the same information.
pub async fn request_wave(
    api: Arc<dyn SessionApi>,
    upload_id: String,
    confirmed: Vec<PartReceipt>,
) -> Result<BatchAssignment, UploadError> {
    call_blocking("request batch", move || api.request_batch(&upload_id, &confirmed)).await
}
