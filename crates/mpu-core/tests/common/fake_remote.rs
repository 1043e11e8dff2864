//! In-process session API and part store for orchestrator tests.
//!
//! `FakeRemote` hands out `batch_size` missing parts per wave and reports
//! completion once the caller's cumulative receipts cover every part.
//! `FakeStore` accepts PUTs to `fake://<upload>/<part>` URLs and can be told
//! to fail specific parts.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use mpu_core::remote::{
    BatchAssignment, BatchProgress, CompleteResponse, InitiateRequest, InitiateResponse,
    MultipartUploadInfo, PresignedUrl, SessionApi,
};
use mpu_core::retry::PartError;
use mpu_core::transport::{PartTransport, PutResponse};
use mpu_core::{PartReceipt, UploadControl, UploadError};

#[derive(Debug, Clone, Copy, Default)]
pub enum Hook {
    #[default]
    None,
    Pause,
    Abort,
}

#[derive(Default)]
struct RemoteState {
    initiates: Vec<InitiateRequest>,
    batch_calls: Vec<Vec<PartReceipt>>,
    complete_calls: Vec<Vec<PartReceipt>>,
    abort_calls: Vec<String>,
    total_parts: u32,
    control: Option<UploadControl>,
    /// Fire a hook on the n-th batch call (1-based).
    hooks: HashMap<usize, Hook>,
}

pub struct FakeRemote {
    pub part_size: u64,
    pub batch_size: usize,
    pub fail_initiate: bool,
    pub fail_complete: bool,
    pub fail_abort: bool,
    /// Never report completion.
    pub never_complete: bool,
    /// Report completion on every batch call, receipts or not.
    pub complete_early: bool,
    state: Mutex<RemoteState>,
}

impl FakeRemote {
    pub fn new(part_size: u64, batch_size: usize) -> Self {
        Self {
            part_size,
            batch_size,
            fail_initiate: false,
            fail_complete: false,
            fail_abort: false,
            never_complete: false,
            complete_early: false,
            state: Mutex::new(RemoteState::default()),
        }
    }

    pub fn on_batch(&self, call: usize, hook: Hook, control: UploadControl) {
        let mut st = self.state.lock().unwrap();
        st.hooks.insert(call, hook);
        st.control = Some(control);
    }

    pub fn initiates(&self) -> Vec<InitiateRequest> {
        self.state.lock().unwrap().initiates.clone()
    }

    pub fn batch_calls(&self) -> Vec<Vec<PartReceipt>> {
        self.state.lock().unwrap().batch_calls.clone()
    }

    pub fn complete_calls(&self) -> Vec<Vec<PartReceipt>> {
        self.state.lock().unwrap().complete_calls.clone()
    }

    pub fn abort_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().abort_calls.clone()
    }
}

impl SessionApi for FakeRemote {
    fn initiate(&self, req: &InitiateRequest) -> Result<InitiateResponse, UploadError> {
        let mut st = self.state.lock().unwrap();
        st.initiates.push(req.clone());
        if self.fail_initiate {
            return Err(UploadError::Transport("initiate refused".into()));
        }
        let total_parts = req.file_size.div_ceil(self.part_size) as u32;
        st.total_parts = total_parts;
        Ok(InitiateResponse {
            upload_id: "up-1".into(),
            bucket: req.bucket.clone(),
            object_key: format!("{}/{}", req.path, req.file_name),
            multipart_upload_info: MultipartUploadInfo {
                part_size_bytes: self.part_size,
                total_parts,
                presigned_urls_batch_size: self.batch_size as u32,
                total_batches: total_parts.div_ceil(self.batch_size as u32),
            },
        })
    }

    fn request_batch(
        &self,
        upload_id: &str,
        confirmed: &[PartReceipt],
    ) -> Result<BatchAssignment, UploadError> {
        let mut st = self.state.lock().unwrap();
        st.batch_calls.push(confirmed.to_vec());
        let call = st.batch_calls.len();
        if let (Some(hook), Some(control)) = (st.hooks.get(&call), st.control.as_ref()) {
            match hook {
                Hook::Pause => control.pause(),
                Hook::Abort => control.abort(),
                Hook::None => {}
            }
        }

        let done: Vec<u32> = confirmed.iter().map(|r| r.part_number).collect();
        let total = st.total_parts;
        let is_complete = self.complete_early
            || (!self.never_complete && (1..=total).all(|n| done.contains(&n)));
        let presigned_urls = if is_complete {
            Vec::new()
        } else {
            (1..=total)
                .filter(|n| !done.contains(n))
                .take(self.batch_size)
                .map(|n| PresignedUrl {
                    part_number: n,
                    url: format!("fake://{}/{}", upload_id, n),
                })
                .collect()
        };
        Ok(BatchAssignment {
            progress: BatchProgress {
                completed_parts: done.len() as u32,
                total_parts: total,
                percent_complete: 0.0,
                is_complete,
            },
            presigned_urls,
        })
    }

    fn complete(&self, upload_id: &str, parts: &[PartReceipt]) -> Result<CompleteResponse, UploadError> {
        let mut st = self.state.lock().unwrap();
        st.complete_calls.push(parts.to_vec());
        if self.fail_complete {
            return Err(UploadError::Transport("complete refused".into()));
        }
        Ok(CompleteResponse {
            file_url: format!("https://files.example/{}", upload_id),
        })
    }

    fn abort(&self, upload_id: &str) -> Result<(), UploadError> {
        let mut st = self.state.lock().unwrap();
        st.abort_calls.push(upload_id.to_string());
        if self.fail_abort {
            return Err(UploadError::Transport("abort refused".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct StoreState {
    /// PUT attempts per part number.
    attempts: BTreeMap<u32, u32>,
    /// Bytes stored per part number (last successful PUT).
    stored: BTreeMap<u32, Vec<u8>>,
}

#[derive(Default)]
pub struct FakeStore {
    /// Part number -> number of leading attempts answered with HTTP 500.
    pub fail_first: HashMap<u32, u32>,
    /// Time every PUT takes before answering.
    pub latency: Duration,
    state: Mutex<StoreState>,
}

impl FakeStore {
    pub fn failing(fail_first: &[(u32, u32)]) -> Self {
        Self {
            fail_first: fail_first.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn slow(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> BTreeMap<u32, u32> {
        self.state.lock().unwrap().attempts.clone()
    }

    pub fn total_attempts(&self) -> u32 {
        self.state.lock().unwrap().attempts.values().sum()
    }

    /// Concatenation of stored parts in part-number order.
    pub fn assembled(&self) -> Vec<u8> {
        self.state
            .lock()
            .unwrap()
            .stored
            .values()
            .flat_map(|b| b.iter().copied())
            .collect()
    }
}

impl PartTransport for FakeStore {
    fn put_part(&self, url: &str, body: &[u8]) -> Result<PutResponse, PartError> {
        let n: u32 = url
            .rsplit('/')
            .next()
            .and_then(|s| s.parse().ok())
            .expect("fake url ends with part number");
        std::thread::sleep(self.latency);
        let mut st = self.state.lock().unwrap();
        let attempt = {
            let a = st.attempts.entry(n).or_insert(0);
            *a += 1;
            *a
        };
        if attempt <= self.fail_first.get(&n).copied().unwrap_or(0) {
            return Ok(PutResponse {
                status: 500,
                etag: None,
            });
        }
        st.stored.insert(n, body.to_vec());
        Ok(PutResponse {
            status: 200,
            etag: Some(format!("\"etag-{}\"", n)),
        })
    }
}
