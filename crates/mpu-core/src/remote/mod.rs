//! Remote multipart session API.
//!
//! The remote creates sessions, hands out presigned part URLs in waves in
//! exchange for confirmed receipts, and finalizes or aborts. [`SessionApi`] is
//! the seam the orchestrator talks to; [`HttpSessionApi`] is the JSON-over-HTTP
//! implementation.

mod http;
mod types;

pub use http::HttpSessionApi;
pub use types::{
    AbortRequest, BatchAssignment, BatchProgress, BatchRequest, CompleteRequest,
    CompleteResponse, InitiateRequest, InitiateResponse, MultipartUploadInfo, PresignedUrl,
};

use crate::error::UploadError;
use crate::session::PartReceipt;

/// Run one blocking session call on the blocking pool.
pub(crate) async fn call_blocking<T, F>(what: &'static str, f: F) -> Result<T, UploadError>
where
    F: FnOnce() -> Result<T, UploadError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| UploadError::Transport(format!("{} task: {}", what, e)))?
}

/// Session-level calls against the remote. Blocking; the orchestrator runs
/// them on `spawn_blocking`.
pub trait SessionApi: Send + Sync + 'static {
    fn initiate(&self, req: &InitiateRequest) -> Result<InitiateResponse, UploadError>;

    /// Exchange confirmed receipts for the next wave of destinations.
    fn request_batch(
        &self,
        upload_id: &str,
        confirmed: &[PartReceipt],
    ) -> Result<BatchAssignment, UploadError>;

    fn complete(&self, upload_id: &str, parts: &[PartReceipt]) -> Result<CompleteResponse, UploadError>;

    fn abort(&self, upload_id: &str) -> Result<(), UploadError>;
}
