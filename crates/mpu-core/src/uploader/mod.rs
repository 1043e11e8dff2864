//! Part uploader: one part, one destination, bounded retries.
//!
//! A part counts as stored only when the PUT returns 2xx *and* carries an
//! ETag. Either condition failing is a retryable attempt failure.

mod etag;

pub use etag::normalize_etag;

use crate::chunker::Part;
use crate::retry::{run_with_retry, PartError, RetryPolicy};
use crate::session::PartReceipt;
use crate::source::PartSource;
use crate::transport::PartTransport;

/// Uploads `part` from `source` to `url`, retrying per `policy`.
///
/// Blocking (curl + backoff sleeps); call from `spawn_blocking`. The part
/// bytes are read once and reused across attempts.
pub fn upload_part<A>(
    transport: &dyn PartTransport,
    url: &str,
    part: &Part,
    source: &dyn PartSource,
    policy: &RetryPolicy,
    is_aborted: A,
) -> Result<PartReceipt, PartError>
where
    A: Fn() -> bool,
{
    if is_aborted() {
        return Err(PartError::Aborted);
    }
    let body = source.read_part(part).map_err(PartError::Source)?;
    run_with_retry(policy, is_aborted, |attempt| {
        let resp = transport.put_part(url, &body)?;
        if !(200..300).contains(&resp.status) {
            return Err(PartError::Http(resp.status));
        }
        let etag = resp
            .etag
            .as_deref()
            .and_then(normalize_etag)
            .ok_or(PartError::MissingEtag)?;
        tracing::trace!(part = part.number, attempt, bytes = body.len(), "part stored");
        Ok(PartReceipt {
            part_number: part.number,
            etag,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::BytesSource;
    use crate::transport::PutResponse;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays a fixed list of responses, then keeps returning the last one.
    struct Scripted {
        responses: Mutex<Vec<Result<PutResponse, PartError>>>,
        bodies: Mutex<Vec<Vec<u8>>>,
    }

    impl Scripted {
        fn new(mut responses: Vec<Result<PutResponse, PartError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                bodies: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.bodies.lock().unwrap().len()
        }
    }

    impl PartTransport for Scripted {
        fn put_part(&self, _url: &str, body: &[u8]) -> Result<PutResponse, PartError> {
            self.bodies.lock().unwrap().push(body.to_vec());
            let mut r = self.responses.lock().unwrap();
            if r.len() > 1 {
                r.pop().unwrap()
            } else {
                match r.last().unwrap() {
                    Ok(resp) => Ok(resp.clone()),
                    Err(_) => Err(PartError::Http(500)),
                }
            }
        }
    }

    fn ok(etag: Option<&str>) -> Result<PutResponse, PartError> {
        Ok(PutResponse {
            status: 200,
            etag: etag.map(str::to_string),
        })
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    fn part() -> (BytesSource, Part) {
        let src = BytesSource::new((0u8..10).collect::<Vec<_>>());
        (src, Part { number: 2, start: 4, end: 8 })
    }

    #[test]
    fn quoted_etag_is_normalized() {
        let (src, p) = part();
        let t = Scripted::new(vec![ok(Some("\"abc\""))]);
        let receipt = upload_part(&t, "http://x/2", &p, &src, &policy(), || false).unwrap();
        assert_eq!(receipt.part_number, 2);
        assert_eq!(receipt.etag, "abc");
        assert_eq!(t.bodies.lock().unwrap()[0], vec![4, 5, 6, 7]);
    }

    #[test]
    fn two_failures_then_success() {
        let (src, p) = part();
        let t = Scripted::new(vec![
            Err(PartError::Http(503)),
            ok(None),
            ok(Some("etag-2")),
        ]);
        let receipt = upload_part(&t, "http://x/2", &p, &src, &policy(), || false).unwrap();
        assert_eq!(receipt.etag, "etag-2");
        assert_eq!(t.calls(), 3);
    }

    #[test]
    fn missing_etag_exhausts_retries() {
        let (src, p) = part();
        let t = Scripted::new(vec![ok(None)]);
        let err = upload_part(&t, "http://x/2", &p, &src, &policy(), || false).unwrap_err();
        assert!(matches!(err, PartError::MissingEtag));
        assert_eq!(t.calls(), 3);
    }

    #[test]
    fn non_2xx_is_a_failure() {
        let (src, p) = part();
        let t = Scripted::new(vec![Ok(PutResponse {
            status: 403,
            etag: Some("x".into()),
        })]);
        let err = upload_part(&t, "http://x/2", &p, &src, &policy(), || false).unwrap_err();
        assert!(matches!(err, PartError::Http(403)));
    }

    #[test]
    fn aborted_upload_sends_nothing() {
        let (src, p) = part();
        let t = Scripted::new(vec![ok(Some("e"))]);
        let err = upload_part(&t, "http://x/2", &p, &src, &policy(), || true).unwrap_err();
        assert!(matches!(err, PartError::Aborted));
        assert_eq!(t.calls(), 0);
    }
}
