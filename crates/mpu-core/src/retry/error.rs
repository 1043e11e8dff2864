//! Part upload error type for retry classification.

use std::fmt;

/// Error returned by a single part upload attempt (curl failure, HTTP error,
/// missing completion token, or local read failure).
/// Used so we can classify and decide retries before surfacing anything.
#[derive(Debug)]
pub enum PartError {
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Transfer succeeded but the response carried no ETag. Retried like a
    /// transport failure; the part is never confirmed without one.
    MissingEtag,
    /// Reading the part's bytes from the local source failed. Not retried.
    Source(std::io::Error),
    /// The upload was aborted before this attempt could start.
    Aborted,
}

impl fmt::Display for PartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartError::Curl(e) => write!(f, "{}", e),
            PartError::Http(code) => write!(f, "HTTP {}", code),
            PartError::MissingEtag => write!(f, "response carried no ETag"),
            PartError::Source(e) => write!(f, "source: {}", e),
            PartError::Aborted => write!(f, "aborted"),
        }
    }
}

impl std::error::Error for PartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PartError::Curl(e) => Some(e),
            PartError::Source(e) => Some(e),
            PartError::Http(_) | PartError::MissingEtag | PartError::Aborted => None,
        }
    }
}
