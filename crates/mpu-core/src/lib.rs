//! Chunked multipart upload engine.
//!
//! A file is split into fixed-size parts, the remote hands out presigned part
//! URLs in waves, each wave is uploaded concurrently with per-part retry, and
//! the confirmed receipts are exchanged for the next wave until the remote
//! reports completion and the upload is finalized.

pub mod chunker;
pub mod config;
pub mod control;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod progress;
pub mod remote;
pub mod retry;
pub mod session;
pub mod source;
pub mod transport;
pub mod uploader;

pub use control::UploadControl;
pub use error::UploadError;
pub use orchestrator::{Orchestrator, UploadOutcome, UploadPhase, UploadSettings, UploadState};
pub use progress::ProgressEvent;
pub use remote::{HttpSessionApi, SessionApi};
pub use session::{PartReceipt, UploadSession};
pub use source::SelectedFile;
pub use transport::{CurlTransport, PartTransport};
