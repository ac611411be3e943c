//! Outbound HTTP dispatch for `http_request` steps.
//!
//! `HttpDispatcher` renders the request from the step definition and the
//! current context, then drives the attempt loop: each attempt goes through
//! the `HttpTransport` port, gets classified by `RetryHandler`, and on a
//! retryable failure the dispatcher sleeps for the backoff delay before the
//! next attempt. The transport is implemented in `hookflow-infra` (reqwest).

use std::future::Future;
use std::time::Duration;

use hookflow_types::workflow::{Context, HttpBody, HttpMethod, HttpRequestStep};
use serde_json::Value;

use super::context::clone_context;
use super::retry::{AttemptOutcome, RetryHandler};
use super::template::{render, render_value};

/// Key under which the workflow id is exposed to request templates.
pub const WORKFLOW_ID_KEY: &str = "workflow_id";

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// A fully rendered outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Rendered headers, sorted by name.
    pub headers: Vec<(String, String)>,
    /// JSON body, if the step configured one.
    pub body: Option<Value>,
    /// Per-attempt timeout.
    pub timeout: Duration,
}

/// Status and body of a received response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Parsed JSON when the body is valid JSON, otherwise the raw text.
    pub body: Value,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure below the HTTP status level (no response received).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),

    /// The request could not be built (bad header, bad URL). Never retried.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Network-level failures are retryable; malformed requests are not.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransportError::InvalidRequest(_))
    }
}

/// Failure of an `http_request` step.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// A response with status >= 400 (the last one observed).
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: Value },

    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The rendered URL is not an absolute URL.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl DispatchError {
    /// Response status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body, when a response was received.
    pub fn body(&self) -> Option<&Value> {
        match self {
            DispatchError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Transport port
// ---------------------------------------------------------------------------

/// Sends a single HTTP request. One call is one attempt.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait HttpTransport: Send + Sync {
    fn send(
        &self,
        request: &OutboundRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

// ---------------------------------------------------------------------------
// HttpDispatcher
// ---------------------------------------------------------------------------

/// Builds and sends the request of an `http_request` step with retry/backoff.
pub struct HttpDispatcher<T> {
    transport: T,
}

impl<T: HttpTransport> HttpDispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Render the request for `step` against `ctx` plus `workflow_id`.
    pub fn build_request(
        step: &HttpRequestStep,
        ctx: &Context,
        workflow_id: &str,
    ) -> Result<OutboundRequest, DispatchError> {
        let mut scope = clone_context(ctx);
        scope.insert(
            WORKFLOW_ID_KEY.to_string(),
            Value::String(workflow_id.to_string()),
        );

        let url = render(&step.url, &scope);
        if let Err(e) = url::Url::parse(&url) {
            return Err(DispatchError::InvalidUrl {
                url,
                reason: e.to_string(),
            });
        }

        let mut headers: Vec<(String, String)> = step
            .headers
            .iter()
            .flatten()
            .map(|(name, value)| (name.clone(), render(value, &scope)))
            .collect();
        headers.sort_by(|a, b| a.0.cmp(&b.0));

        let body = match &step.body {
            None => None,
            Some(HttpBody::Ctx) => Some(Value::Object(scope)),
            Some(HttpBody::Custom { value }) => Some(render_value(value, &scope)),
        };

        Ok(OutboundRequest {
            method: step.method,
            url,
            headers,
            body,
            timeout: Duration::from_millis(step.timeout_ms),
        })
    }

    /// Send the step's request, retrying 5xx and transport failures.
    ///
    /// Returns the first response with status below 400. A 4xx response
    /// aborts immediately. When retries are exhausted the last observed
    /// error is returned.
    pub async fn dispatch(
        &self,
        step: &HttpRequestStep,
        ctx: &Context,
        workflow_id: &str,
    ) -> Result<TransportResponse, DispatchError> {
        let request = Self::build_request(step, ctx, workflow_id)?;
        let mut attempt: u32 = 0;

        loop {
            tracing::debug!(
                attempt,
                method = %request.method,
                url = %request.url,
                "sending http request"
            );

            let error = match RetryHandler::classify(self.transport.send(&request).await) {
                AttemptOutcome::Success(response) => {
                    tracing::debug!(attempt, status = response.status, "http request succeeded");
                    return Ok(response);
                }
                AttemptOutcome::Fatal(error) => {
                    tracing::warn!(attempt, error = %error, "http request failed, not retrying");
                    return Err(error);
                }
                AttemptOutcome::Retryable(error) => error,
            };

            if !RetryHandler::should_retry(step.retries, attempt) {
                tracing::warn!(attempt, error = %error, "http request failed, retries exhausted");
                return Err(error);
            }

            let delay = RetryHandler::backoff_delay(attempt);
            tracing::warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "http request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    use serde_json::json;
    use tokio::time::Instant;

    /// Scripted transport: pops one result per attempt and records requests.
    /// Once the script is exhausted every attempt gets a 200 with a null body.
    #[derive(Clone, Default)]
    pub(crate) struct FakeTransport {
        script: Arc<Mutex<VecDeque<Result<TransportResponse, TransportError>>>>,
        pub(crate) sent: Arc<Mutex<Vec<(OutboundRequest, Instant)>>>,
    }

    impl FakeTransport {
        pub(crate) fn with_script(
            script: impl IntoIterator<Item = Result<TransportResponse, TransportError>>,
        ) -> Self {
            Self {
                script: Arc::new(Mutex::new(script.into_iter().collect())),
                sent: Arc::default(),
            }
        }

        pub(crate) fn statuses(statuses: &[u16]) -> Self {
            Self::with_script(statuses.iter().map(|&status| {
                Ok(TransportResponse {
                    status,
                    body: Value::Null,
                })
            }))
        }

        pub(crate) fn attempts(&self) -> usize {
            self.sent.lock().unwrap().len()
        }

        pub(crate) fn requests(&self) -> Vec<OutboundRequest> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(r, _)| r.clone())
                .collect()
        }
    }

    impl HttpTransport for FakeTransport {
        async fn send(
            &self,
            request: &OutboundRequest,
        ) -> Result<TransportResponse, TransportError> {
            self.sent
                .lock()
                .unwrap()
                .push((request.clone(), Instant::now()));
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(TransportResponse {
                    status: 200,
                    body: Value::Null,
                }))
        }
    }

    fn step(value: Value) -> HttpRequestStep {
        serde_json::from_value(value).unwrap()
    }

    fn ctx(value: Value) -> Context {
        match value {
            Value::Object(map) => map,
            other => panic!("test context must be an object, got {other}"),
        }
    }

    // -----------------------------------------------------------------------
    // build_request
    // -----------------------------------------------------------------------

    #[test]
    fn test_build_request_renders_url_headers_and_custom_body() {
        let step = step(json!({
            "method": "POST",
            "url": "https://api.example.com/users/{{user.id}}?wf={{workflow_id}}",
            "headers": { "X-User": "{{user.name}}", "Authorization": "Bearer {{token}}" },
            "body": { "mode": "custom", "value": { "who": "{{user.name}}", "n": 1 } },
            "timeoutMs": 1500
        }));
        let c = ctx(json!({ "user": { "id": 9, "name": "ada" }, "token": "t0k" }));

        let request = HttpDispatcher::<FakeTransport>::build_request(&step, &c, "wf_1").unwrap();

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://api.example.com/users/9?wf=wf_1");
        assert_eq!(
            request.headers,
            vec![
                ("Authorization".to_string(), "Bearer t0k".to_string()),
                ("X-User".to_string(), "ada".to_string()),
            ]
        );
        assert_eq!(request.body, Some(json!({ "who": "ada", "n": 1 })));
        assert_eq!(request.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_build_request_ctx_body_includes_workflow_id() {
        let step = step(json!({
            "method": "PUT",
            "url": "https://example.com",
            "body": { "mode": "ctx" }
        }));
        let c = ctx(json!({ "a": 1 }));

        let request = HttpDispatcher::<FakeTransport>::build_request(&step, &c, "wf_x").unwrap();
        assert_eq!(request.body, Some(json!({ "a": 1, "workflow_id": "wf_x" })));
        assert!(c.get("workflow_id").is_none());
    }

    #[test]
    fn test_build_request_without_body() {
        let step = step(json!({ "method": "GET", "url": "https://example.com" }));
        let request =
            HttpDispatcher::<FakeTransport>::build_request(&step, &Context::new(), "wf").unwrap();
        assert_eq!(request.body, None);
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_build_request_rejects_relative_url() {
        let step = step(json!({ "method": "GET", "url": "{{host}}/path" }));
        let err =
            HttpDispatcher::<FakeTransport>::build_request(&step, &Context::new(), "wf")
                .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidUrl { ref url, .. } if url == "/path"));
    }

    // -----------------------------------------------------------------------
    // dispatch
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_retries_5xx_with_exponential_backoff() {
        let transport = FakeTransport::statuses(&[503, 503, 200]);
        let dispatcher = HttpDispatcher::new(transport.clone());
        let step = step(json!({ "method": "GET", "url": "https://example.com", "retries": 2 }));

        let response = dispatcher
            .dispatch(&step, &Context::new(), "wf")
            .await
            .unwrap();
        assert_eq!(response.status, 200);

        let times: Vec<Instant> = transport.sent.lock().unwrap().iter().map(|(_, t)| *t).collect();
        assert_eq!(times.len(), 3);
        assert_eq!(times[1] - times[0], Duration::from_millis(1000));
        assert_eq!(times[2] - times[1], Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_is_not_retried() {
        let transport = FakeTransport::with_script([Ok(TransportResponse {
            status: 404,
            body: json!({ "error": "not found" }),
        })]);
        let dispatcher = HttpDispatcher::new(transport.clone());
        let step = step(json!({ "method": "GET", "url": "https://example.com", "retries": 5 }));

        let err = dispatcher
            .dispatch(&step, &Context::new(), "wf")
            .await
            .unwrap_err();

        assert_eq!(transport.attempts(), 1);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some(&json!({ "error": "not found" })));
        assert_eq!(err.to_string(), r#"HTTP 404: {"error":"not found"}"#);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_return_last_error() {
        let transport = FakeTransport::with_script([
            Ok(TransportResponse {
                status: 500,
                body: json!("first"),
            }),
            Err(TransportError::Timeout(Duration::from_millis(100))),
        ]);
        let dispatcher = HttpDispatcher::new(transport.clone());
        let step = step(json!({ "method": "GET", "url": "https://example.com", "retries": 1 }));

        let err = dispatcher
            .dispatch(&step, &Context::new(), "wf")
            .await
            .unwrap_err();

        assert_eq!(transport.attempts(), 2);
        assert_eq!(
            err,
            DispatchError::Transport(TransportError::Timeout(Duration::from_millis(100)))
        );
        assert_eq!(err.status(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_single_attempt() {
        let transport = FakeTransport::statuses(&[502]);
        let dispatcher = HttpDispatcher::new(transport.clone());
        let step = step(json!({ "method": "DELETE", "url": "https://example.com" }));

        let err = dispatcher
            .dispatch(&step, &Context::new(), "wf")
            .await
            .unwrap_err();
        assert_eq!(transport.attempts(), 1);
        assert_eq!(err.status(), Some(502));
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_attempt() {
        let transport = FakeTransport::default();
        let dispatcher = HttpDispatcher::new(transport.clone());
        let step = HttpRequestStep {
            method: HttpMethod::Get,
            url: "not a url".into(),
            headers: Some(HashMap::new()),
            body: None,
            timeout_ms: 10,
            retries: 3,
        };

        let err = dispatcher
            .dispatch(&step, &Context::new(), "wf")
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidUrl { .. }));
        assert_eq!(transport.attempts(), 0);
        assert!(transport.requests().is_empty());
    }
}
