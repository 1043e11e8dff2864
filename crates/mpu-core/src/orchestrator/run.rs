//! Session initiation and the wave loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::error::TrySendError;

use super::{ActiveSession, Orchestrator, UploadOutcome, UploadPhase};
use crate::control::UploadControl;
use crate::coordinator::{self, execute_wave, plan_wave, WaveContext, WaveOutcome};
use crate::error::UploadError;
use crate::progress::{percent_complete, ProgressEvent, ProgressTracker};
use crate::remote::{call_blocking, InitiateRequest};
use crate::session::{ReceiptSet, UploadSession};
use crate::source::SelectedFile;

/// Await `fut` unless abort is requested first. The losing future is dropped;
/// blocking work it started finishes in the background and its result is discarded.
async fn race_abort<F: Future>(control: &UploadControl, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = control.aborted() => None,
        out = fut => Some(out),
    }
}

impl Orchestrator {
    /// Idle → Initiating: create the remote session and derive the part plan.
    pub(super) async fn initiate(
        &mut self,
        file: &SelectedFile,
        destination: &str,
    ) -> Result<(), UploadError> {
        self.transition(UploadPhase::Initiating);
        let req = InitiateRequest {
            bucket: self.settings.bucket.clone(),
            path: destination.to_string(),
            file_name: file.name.clone(),
            content_type: file.content_type.clone(),
            file_size: file.size(),
        };
        let api = Arc::clone(&self.api);
        let resp = match call_blocking("initiate", move || api.initiate(&req)).await {
            Ok(r) => r,
            Err(e) => return Err(self.fail(e).await),
        };
        self.state.upload_id = Some(resp.upload_id.clone());

        let info = resp.multipart_upload_info;
        let session = UploadSession::new(
            resp.upload_id,
            resp.bucket,
            resp.object_key,
            file.size(),
            info.part_size_bytes,
        );
        let session = match session {
            Ok(s) => s,
            Err(e) => return Err(self.fail(e).await),
        };
        let parts = match session.parts() {
            Ok(p) => p,
            Err(e) => return Err(self.fail(e).await),
        };
        if info.total_parts != session.total_parts {
            tracing::warn!(
                remote = info.total_parts,
                local = session.total_parts,
                "remote part count differs from local plan"
            );
        }
        tracing::info!(
            upload_id = %session.upload_id,
            object_key = %session.object_key,
            part_size = session.part_size,
            total_parts = session.total_parts,
            batch_size = info.presigned_urls_batch_size,
            "session initiated"
        );

        self.active = Some(ActiveSession {
            session,
            parts,
            source: Arc::clone(&file.source),
            receipts: ReceiptSet::new(),
            waves: 0,
            stalled_waves: 0,
        });
        Ok(())
    }

    /// The wave loop. Pause and abort are checked once per iteration, before a
    /// new wave is requested; abort additionally races every in-flight call.
    pub(super) async fn run_waves(&mut self) -> Result<UploadOutcome, UploadError> {
        let mut tracker =
            ProgressTracker::with_baseline(self.state.file_size, self.state.uploaded_size, Instant::now());

        loop {
            if self.control.is_aborted() {
                return Ok(self.abort_session().await);
            }
            if self.control.is_paused() {
                self.transition(UploadPhase::Paused);
                tracing::info!(
                    confirmed = self.active()?.receipts.len(),
                    uploaded = self.state.uploaded_size,
                    "upload paused"
                );
                return Ok(UploadOutcome::Paused);
            }

            let (upload_id, confirmed) = {
                let a = self.active()?;
                (a.session.upload_id.clone(), a.receipts.to_vec())
            };
            let request = coordinator::request_wave(Arc::clone(&self.api), upload_id, confirmed);
            let raced = race_abort(&self.control, request).await;
            let assignment = match raced {
                None => return Ok(self.abort_session().await),
                Some(Err(e)) => return Err(self.fail(e).await),
                Some(Ok(a)) => a,
            };
            if assignment.progress.is_complete {
                return self.complete().await;
            }

            let wave = {
                let a = self.active_mut()?;
                a.waves += 1;
                a.waves
            };
            if wave > self.settings.max_waves {
                let err = UploadError::Stalled {
                    waves: wave - 1,
                    reason: "remote did not report completion".into(),
                };
                return Err(self.fail(err).await);
            }

            let a = self.active()?;
            let plan = plan_wave(&assignment.presigned_urls, &a.parts, &a.receipts);
            let ctx = WaveContext {
                transport: Arc::clone(&self.transport),
                source: Arc::clone(&a.source),
                policy: self.settings.retry,
                max_concurrent: self.settings.max_concurrent_parts,
                control: self.control.clone(),
            };
            tracing::debug!(
                wave,
                offered = assignment.presigned_urls.len(),
                jobs = plan.jobs.len(),
                remote_completed = assignment.progress.completed_parts,
                "wave assigned"
            );

            let raced = race_abort(&self.control, execute_wave(plan.jobs, ctx)).await;
            let outcome = match raced {
                None => {
                    tracing::info!(wave, "abort during wave; discarding pending part results");
                    return Ok(self.abort_session().await);
                }
                Some(o) => o,
            };
            let (receipts, failed) = match outcome {
                WaveOutcome::Success(r) => (r, Vec::new()),
                WaveOutcome::PartialFailure { receipts, failed } => (receipts, failed),
                WaveOutcome::Fatal(e) => return Err(self.fail(e).await),
            };

            let (newly_confirmed, confirmed, total, stalled) = {
                let a = self.active_mut()?;
                let mut newly = 0usize;
                for r in receipts {
                    if a.receipts.confirm(r) {
                        newly += 1;
                    }
                }
                if newly == 0 {
                    a.stalled_waves += 1;
                } else {
                    a.stalled_waves = 0;
                }
                (newly, a.receipts.len(), a.session.total_parts, a.stalled_waves)
            };
            tracing::info!(
                wave,
                newly_confirmed,
                failed = failed.len() + plan.rejected.len(),
                confirmed,
                total,
                "wave finished"
            );
            self.publish_progress(&mut tracker)?;

            if stalled >= self.settings.max_stalled_waves {
                let err = UploadError::Stalled {
                    waves: wave,
                    reason: format!("{} consecutive wave(s) confirmed no new part", stalled),
                };
                return Err(self.fail(err).await);
            }
        }
    }

    /// Fold the confirmed receipts into `UploadState` and emit one progress event.
    fn publish_progress(&mut self, tracker: &mut ProgressTracker) -> Result<(), UploadError> {
        let (uploaded, completed_parts, total_parts) = {
            let a = self.active()?;
            (
                a.receipts.confirmed_bytes(&a.parts),
                a.receipts.len() as u32,
                a.session.total_parts,
            )
        };
        self.state.uploaded_size = self.state.uploaded_size.max(uploaded);
        if let Some(th) = tracker.observe(self.state.uploaded_size, Instant::now()) {
            self.state.speed = th.speed;
            self.state.time_remaining = th.time_remaining;
        }
        let event = ProgressEvent {
            percent_complete: percent_complete(self.state.uploaded_size, self.state.file_size),
            uploaded_size: self.state.uploaded_size,
            speed: self.state.speed.clone(),
            time_remaining: self.state.time_remaining.clone(),
            completed_parts,
            total_parts,
        };
        if let Some(tx) = &self.progress_tx {
            match tx.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(ev)) => {
                    tracing::trace!(uploaded = ev.uploaded_size, "progress receiver behind; event dropped");
                }
                Err(TrySendError::Closed(_)) => {}
            }
        }
        Ok(())
    }
}
