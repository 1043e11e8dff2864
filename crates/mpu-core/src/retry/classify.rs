//! Classify HTTP status, curl errors and part errors into retry policy error kinds.

use super::error::PartError;
use super::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Rejected(code as u16),
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_url_malformed() || e.is_unsupported_protocol() {
        return ErrorKind::Other;
    }
    // Anything else on the wire (reset, DNS, TLS, send/recv) is worth another attempt.
    ErrorKind::Connection
}

/// Classify a part error into an ErrorKind.
pub fn classify(e: &PartError) -> ErrorKind {
    match e {
        PartError::Curl(ce) => classify_curl_error(ce),
        PartError::Http(code) => classify_http_status(*code),
        PartError::MissingEtag => ErrorKind::MissingToken,
        PartError::Source(_) | PartError::Aborted => ErrorKind::Other,
    }
}
