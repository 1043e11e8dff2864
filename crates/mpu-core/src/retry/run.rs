//! Retry loop: run a closure until success or policy says stop.

use super::classify;
use super::error::PartError;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
///
/// Blocking; run on a `spawn_blocking` thread. `is_aborted` is polled before
/// every attempt so an aborted upload stops spending attempts.
pub fn run_with_retry<T, F, A>(policy: &RetryPolicy, is_aborted: A, mut f: F) -> Result<T, PartError>
where
    F: FnMut(u32) -> Result<T, PartError>,
    A: Fn() -> bool,
{
    let mut attempt = 1u32;
    loop {
        if is_aborted() {
            return Err(PartError::Aborted);
        }
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(attempt, ?kind, delay_ms = d.as_millis() as u64, "retrying: {}", e);
                        std::thread::sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}
