//! Concurrent execution of one wave's part uploads.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::outcome::{FailedPart, WaveOutcome};
use crate::chunker::Part;
use crate::control::UploadControl;
use crate::error::UploadError;
use crate::retry::{PartError, RetryPolicy};
use crate::source::PartSource;
use crate::transport::PartTransport;
use crate::uploader::upload_part;

/// Everything a wave needs besides its job list. Cheap to clone.
#[derive(Clone)]
pub struct WaveContext {
    pub transport: Arc<dyn PartTransport>,
    pub source: Arc<dyn PartSource>,
    pub policy: RetryPolicy,
    /// At most this many parts in flight; `None` runs every part of the wave at once.
    pub max_concurrent: Option<usize>,
    pub control: UploadControl,
}

/// Upload every job of a wave and aggregate the results into one outcome.
///
/// Parts run independently: a failed part never cancels its siblings. Each
/// part runs the blocking uploader (curl + backoff) on `spawn_blocking`.
pub async fn execute_wave(jobs: Vec<(Part, String)>, ctx: WaveContext) -> WaveOutcome {
    let semaphore = ctx.max_concurrent.map(|n| Arc::new(Semaphore::new(n.max(1))));
    let mut set = JoinSet::new();

    for (part, url) in jobs {
        let transport = Arc::clone(&ctx.transport);
        let source = Arc::clone(&ctx.source);
        let control = ctx.control.clone();
        let policy = ctx.policy;
        let semaphore = semaphore.clone();
        set.spawn(async move {
            let _permit = match semaphore {
                Some(s) => s.acquire_owned().await.ok(),
                None => None,
            };
            let res = tokio::task::spawn_blocking(move || {
                upload_part(
                    transport.as_ref(),
                    &url,
                    &part,
                    source.as_ref(),
                    &policy,
                    || control.is_aborted(),
                )
            })
            .await;
            (part.number, res)
        });
    }

    let mut receipts = Vec::new();
    let mut failed = Vec::new();
    let mut fatal = None;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((_, Ok(Ok(receipt)))) => receipts.push(receipt),
            Ok((n, Ok(Err(PartError::Source(e))))) => {
                tracing::error!(part = n, "cannot read part from source: {}", e);
                if fatal.is_none() {
                    fatal = Some(UploadError::Source(format!("part {}: {}", n, e)));
                }
            }
            Ok((n, Ok(Err(e)))) => {
                tracing::warn!(part = n, "part failed after retries: {}", e);
                failed.push(FailedPart {
                    part_number: n,
                    reason: e.to_string(),
                });
            }
            Ok((n, Err(join_err))) => {
                tracing::error!(part = n, "part upload task failed: {}", join_err);
                if fatal.is_none() {
                    fatal = Some(UploadError::Transport(format!("part {} task: {}", n, join_err)));
                }
            }
            Err(join_err) => {
                tracing::error!("wave task failed: {}", join_err);
                if fatal.is_none() {
                    fatal = Some(UploadError::Transport(format!("wave task: {}", join_err)));
                }
            }
        }
    }

    WaveOutcome::from_parts(receipts, failed, fatal)
}
