//! Wire types for the session API (JSON, camelCase).

use serde::{Deserialize, Serialize};

use crate::session::PartReceipt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateRequest {
    pub bucket: String,
    /// Destination path (folder) inside the bucket.
    pub path: String,
    pub file_name: String,
    pub content_type: String,
    pub file_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateResponse {
    pub upload_id: String,
    pub bucket: String,
    pub object_key: String,
    pub multipart_upload_info: MultipartUploadInfo,
}

/// Part layout chosen by the remote. `part_size_bytes` is trusted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartUploadInfo {
    pub part_size_bytes: u64,
    pub total_parts: u32,
    #[serde(default)]
    pub presigned_urls_batch_size: u32,
    #[serde(default)]
    pub total_batches: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest<'a> {
    pub upload_id: &'a str,
    #[serde(rename = "confirmedETags")]
    pub confirmed_etags: &'a [PartReceipt],
}

/// One wave: destinations plus the remote's view of overall progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAssignment {
    pub progress: BatchProgress,
    #[serde(default)]
    pub presigned_urls: Vec<PresignedUrl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub completed_parts: u32,
    pub total_parts: u32,
    #[serde(default)]
    pub percent_complete: f64,
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrl {
    pub part_number: u32,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest<'a> {
    pub upload_id: &'a str,
    pub parts: &'a [PartReceipt],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResponse {
    pub file_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbortRequest<'a> {
    pub upload_id: &'a str,
}
