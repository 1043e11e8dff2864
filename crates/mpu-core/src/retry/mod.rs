//! Retry and backoff policy for part uploads.
//!
//! This module encapsulates error classification (timeouts, throttling,
//! connection failures, missing ETags) and exponential backoff decisions so
//! that the part uploader and the batch coordinator share one policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::PartError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
