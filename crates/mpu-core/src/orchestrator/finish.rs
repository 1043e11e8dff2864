//! Terminal paths: finalize, abort, fail.

use std::sync::Arc;

use super::{Orchestrator, UploadOutcome, UploadPhase};
use crate::error::UploadError;
use crate::remote::call_blocking;

impl Orchestrator {
    /// Uploading → Completing → Done: hand the full receipt set to the remote.
    pub(super) async fn complete(&mut self) -> Result<UploadOutcome, UploadError> {
        self.transition(UploadPhase::Completing);
        let (upload_id, parts, total) = {
            let a = self.active()?;
            (a.session.upload_id.clone(), a.receipts.to_vec(), a.session.total_parts)
        };
        let receipts = &self.active()?.receipts;
        if !receipts.covers(total) {
            let err = UploadError::Protocol(format!(
                "remote reported completion but parts {:?} have no receipt",
                receipts.missing(total)
            ));
            return Err(self.fail(err).await);
        }
        if self.control.is_aborted() {
            return Ok(self.abort_session().await);
        }

        let api = Arc::clone(&self.api);
        let id = upload_id.clone();
        match call_blocking("complete upload", move || api.complete(&id, &parts)).await {
            Ok(resp) => {
                tracing::info!(upload_id = %upload_id, file_url = %resp.file_url, "upload complete");
                self.reset_local();
                self.transition(UploadPhase::Done);
                Ok(UploadOutcome::Completed {
                    file_url: resp.file_url,
                })
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    /// Any live phase → Aborting → Aborted. Issues at most one abort call and
    /// resets local state whatever that call returns.
    pub(super) async fn abort_session(&mut self) -> UploadOutcome {
        self.transition(UploadPhase::Aborting);
        if let Some(id) = self.state.upload_id.clone() {
            tracing::info!(upload_id = %id, "aborting upload");
            self.abort_remote(id).await;
        }
        self.reset_local();
        self.transition(UploadPhase::Aborted);
        UploadOutcome::Aborted
    }

    /// Session-level failure: best-effort abort, reset, Failed.
    pub(super) async fn fail(&mut self, err: UploadError) -> UploadError {
        tracing::error!(phase = %self.phase, "upload failed: {}", err);
        if let Some(id) = self.state.upload_id.clone() {
            self.abort_remote(id).await;
        }
        self.reset_local();
        self.transition(UploadPhase::Failed);
        err
    }

    async fn abort_remote(&self, upload_id: String) {
        let api = Arc::clone(&self.api);
        let id = upload_id.clone();
        if let Err(e) = call_blocking("abort upload", move || api.abort(&id)).await {
            tracing::warn!(upload_id = %upload_id, "abort request failed: {}", e);
        }
    }
}
