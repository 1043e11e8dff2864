//! Single-part HTTP PUT to a presigned URL.

use std::str;

use super::headers::header_value;
use super::{CurlOptions, PartTransport, PutResponse};
use crate::retry::PartError;

/// libcurl-backed [`PartTransport`]. One Easy handle per attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlTransport {
    opts: CurlOptions,
}

impl CurlTransport {
    pub fn new(opts: CurlOptions) -> Self {
        Self { opts }
    }
}

impl PartTransport for CurlTransport {
    fn put_part(&self, url: &str, body: &[u8]) -> Result<PutResponse, PartError> {
        put_bytes(url, body, &self.opts)
    }
}

/// PUT `body` to `url`, collecting response headers. The response body is discarded.
fn put_bytes(url: &str, body: &[u8], opts: &CurlOptions) -> Result<PutResponse, PartError> {
    let mut headers: Vec<String> = Vec::new();
    let mut remaining = body;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(PartError::Curl)?;
    easy.upload(true).map_err(PartError::Curl)?;
    easy.in_filesize(body.len() as u64).map_err(PartError::Curl)?;
    opts.apply(&mut easy).map_err(PartError::Curl)?;

    // Presigned URLs sign a fixed header set; only suppress `Expect: 100-continue`.
    let mut list = curl::easy::List::new();
    list.append("Expect:").map_err(PartError::Curl)?;
    easy.http_headers(list).map_err(PartError::Curl)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .read_function(|into| {
                let n = into.len().min(remaining.len());
                into[..n].copy_from_slice(&remaining[..n]);
                remaining = &remaining[n..];
                Ok(n)
            })
            .map_err(PartError::Curl)?;
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(PartError::Curl)?;
        transfer
            .write_function(|data| Ok(data.len()))
            .map_err(PartError::Curl)?;
        transfer.perform().map_err(PartError::Curl)?;
    }

    let status = easy.response_code().map_err(PartError::Curl)?;
    Ok(PutResponse {
        status,
        etag: header_value(&headers, "etag"),
    })
}
