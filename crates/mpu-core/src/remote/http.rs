//! JSON-over-HTTP session API client (libcurl).

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::types::{
    AbortRequest, BatchAssignment, BatchRequest, CompleteRequest, CompleteResponse,
    InitiateRequest, InitiateResponse,
};
use super::SessionApi;
use crate::error::UploadError;
use crate::session::PartReceipt;
use crate::transport::{post_json, CurlOptions};

/// Longest response body excerpt carried in an error message.
const ERROR_BODY_EXCERPT: usize = 200;

/// Session API client rooted at a base URL (e.g. `https://host/api/`).
#[derive(Debug, Clone)]
pub struct HttpSessionApi {
    base: Url,
    bearer: Option<String>,
    opts: CurlOptions,
}

impl HttpSessionApi {
    pub fn new(base_url: &str, bearer: Option<String>, opts: CurlOptions) -> Result<Self, UploadError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| UploadError::Configuration(format!("api base url {:?}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(UploadError::Configuration(format!(
                "api base url {:?} cannot be a base",
                base_url
            )));
        }
        // Endpoints are appended as segments under the base path.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base, bearer, opts })
    }

    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, UploadError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| UploadError::Configuration("api base url cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn call<B, R>(&self, segments: &[&str], body: &B) -> Result<R, UploadError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let raw = self.send(segments, body)?;
        serde_json::from_slice(&raw)
            .map_err(|e| UploadError::Protocol(format!("{}: malformed response: {}", segments.join("/"), e)))
    }

    fn send<B: Serialize>(&self, segments: &[&str], body: &B) -> Result<Vec<u8>, UploadError> {
        let url = self.endpoint(segments)?;
        let payload = serde_json::to_vec(body).map_err(UploadError::protocol)?;
        tracing::debug!(url = %url, bytes = payload.len(), "session api call");
        let (code, response) = post_json(url.as_str(), &payload, self.bearer.as_deref(), &self.opts)?;
        if !(200..300).contains(&code) {
            let excerpt: String = String::from_utf8_lossy(&response)
                .chars()
                .take(ERROR_BODY_EXCERPT)
                .collect();
            return Err(UploadError::Transport(format!(
                "POST {} returned HTTP {}: {}",
                url.path(),
                code,
                excerpt.trim()
            )));
        }
        Ok(response)
    }
}

impl SessionApi for HttpSessionApi {
    fn initiate(&self, req: &InitiateRequest) -> Result<InitiateResponse, UploadError> {
        self.call(&["uploads", "initiate"], req)
    }

    fn request_batch(
        &self,
        upload_id: &str,
        confirmed: &[PartReceipt],
    ) -> Result<BatchAssignment, UploadError> {
        let req = BatchRequest {
            upload_id,
            confirmed_etags: confirmed,
        };
        self.call(&["uploads", upload_id, "presigned-urls", "batch"], &req)
    }

    fn complete(&self, upload_id: &str, parts: &[PartReceipt]) -> Result<CompleteResponse, UploadError> {
        let req = CompleteRequest { upload_id, parts };
        self.call(&["complete-upload"], &req)
    }

    fn abort(&self, upload_id: &str) -> Result<(), UploadError> {
        // Any 2xx counts as an ack; the body is not inspected.
        self.send(&["abort-upload"], &AbortRequest { upload_id })?;
        Ok(())
    }
}
