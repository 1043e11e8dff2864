//! HTTP transport built on libcurl (`curl` crate).
//!
//! Two kinds of calls go over the wire: raw-body PUTs of part bytes to
//! presigned URLs, and small JSON POSTs to the session API. Both are blocking;
//! async callers run them through `tokio::task::spawn_blocking`.

mod headers;
mod json;
mod put;

use std::time::Duration;

use crate::retry::PartError;

pub use headers::header_value;
pub(crate) use json::post_json;
pub use put::CurlTransport;

/// Timeouts applied to every curl handle.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Abort when throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    /// Hard wall-clock cap so a completely stuck transfer eventually fails.
    pub timeout: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            timeout: Duration::from_secs(3600),
        }
    }
}

impl CurlOptions {
    pub(crate) fn apply(&self, easy: &mut curl::easy::Easy) -> Result<(), curl::Error> {
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.low_speed_time)?;
        easy.timeout(self.timeout)?;
        Ok(())
    }
}

/// Raw result of one PUT: status code and the ETag header exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutResponse {
    pub status: u32,
    pub etag: Option<String>,
}

/// Sends one part body to one destination URL.
///
/// Implementations only move bytes; deciding whether the response counts as a
/// confirmed part is the uploader's job.
pub trait PartTransport: Send + Sync + 'static {
    fn put_part(&self, url: &str, body: &[u8]) -> Result<PutResponse, PartError>;
}
