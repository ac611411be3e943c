//! Retry and backoff policy for outbound HTTP attempts.
//!
//! Stateless: the dispatcher owns the attempt counter and the sleep, and asks
//! `RetryHandler` how to classify each attempt and how long to wait before
//! the next one. Attempts are numbered from 0; a step with `retries: n` makes
//! at most `n + 1` attempts.

use std::time::Duration;

use super::dispatcher::{DispatchError, TransportError, TransportResponse};

/// Backoff base delay in milliseconds (first retry waits this long).
pub const BACKOFF_BASE_MS: u64 = 1_000;

/// Upper bound for a single backoff delay in milliseconds.
pub const BACKOFF_CAP_MS: u64 = 10_000;

// ---------------------------------------------------------------------------
// AttemptOutcome
// ---------------------------------------------------------------------------

/// Classification of a single HTTP attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Status below 400.
    Success(TransportResponse),
    /// 5xx or transport failure; may be retried if attempts remain.
    Retryable(DispatchError),
    /// 4xx or a request that can never succeed; abort immediately.
    Fatal(DispatchError),
}

// ---------------------------------------------------------------------------
// RetryHandler
// ---------------------------------------------------------------------------

/// Stateless retry policy for `http_request` steps.
pub struct RetryHandler;

impl RetryHandler {
    /// Whether another attempt follows `attempt` (0-based) given `retries`.
    pub fn should_retry(retries: u32, attempt: u32) -> bool {
        attempt < retries
    }

    /// Delay before the attempt that follows `attempt`:
    /// `min(1000 * 2^attempt, 10000)` milliseconds.
    pub fn backoff_delay(attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let ms = BACKOFF_BASE_MS.saturating_mul(factor).min(BACKOFF_CAP_MS);
        Duration::from_millis(ms)
    }

    /// Classify the result of one transport call.
    pub fn classify(result: Result<TransportResponse, TransportError>) -> AttemptOutcome {
        match result {
            Ok(response) if response.status < 400 => AttemptOutcome::Success(response),
            Ok(response) => {
                let fatal = response.status < 500;
                let error = DispatchError::Status {
                    status: response.status,
                    body: response.body,
                };
                if fatal {
                    AttemptOutcome::Fatal(error)
                } else {
                    AttemptOutcome::Retryable(error)
                }
            }
            Err(err) if err.is_retryable() => AttemptOutcome::Retryable(err.into()),
            Err(err) => AttemptOutcome::Fatal(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn response(status: u16) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse {
            status,
            body: Value::Null,
        })
    }

    #[test]
    fn test_should_retry() {
        assert!(!RetryHandler::should_retry(0, 0));
        assert!(RetryHandler::should_retry(2, 0));
        assert!(RetryHandler::should_retry(2, 1));
        assert!(!RetryHandler::should_retry(2, 2));
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        let delays: Vec<u64> = (0..6)
            .map(|a| RetryHandler::backoff_delay(a).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 10000, 10000]);
    }

    #[test]
    fn test_backoff_large_attempt_does_not_overflow() {
        assert_eq!(
            RetryHandler::backoff_delay(200),
            Duration::from_millis(BACKOFF_CAP_MS)
        );
    }

    #[test]
    fn test_classify_success_statuses() {
        for status in [200, 201, 204, 301, 399] {
            assert!(matches!(
                RetryHandler::classify(response(status)),
                AttemptOutcome::Success(_)
            ));
        }
    }

    #[test]
    fn test_classify_client_errors_are_fatal() {
        let outcome = RetryHandler::classify(Ok(TransportResponse {
            status: 404,
            body: json!({ "error": "missing" }),
        }));
        match outcome {
            AttemptOutcome::Fatal(DispatchError::Status { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, json!({ "error": "missing" }));
            }
            other => panic!("expected fatal status error, got {other:?}"),
        }
        assert!(matches!(
            RetryHandler::classify(response(499)),
            AttemptOutcome::Fatal(_)
        ));
    }

    #[test]
    fn test_classify_server_errors_are_retryable() {
        for status in [500, 502, 503, 599] {
            assert!(matches!(
                RetryHandler::classify(response(status)),
                AttemptOutcome::Retryable(_)
            ));
        }
    }

    #[test]
    fn test_classify_transport_errors() {
        assert!(matches!(
            RetryHandler::classify(Err(TransportError::Timeout(Duration::from_millis(5)))),
            AttemptOutcome::Retryable(_)
        ));
        assert!(matches!(
            RetryHandler::classify(Err(TransportError::Connect("refused".into()))),
            AttemptOutcome::Retryable(_)
        ));
        assert!(matches!(
            RetryHandler::classify(Err(TransportError::InvalidRequest("bad header".into()))),
            AttemptOutcome::Fatal(_)
        ));
    }
}
