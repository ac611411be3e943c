//! `reqwest`-backed HTTP transport for `http_request` steps.
//!
//! [`ReqwestTransport`] implements the [`HttpTransport`] port from
//! hookflow-core. The trait is defined in core, the implementation lives in
//! infra (same pattern as `SqliteWorkflowRepository` implementing
//! `WorkflowRepository`). One `send` call is exactly one attempt; retries are
//! driven by the core dispatcher.

use hookflow_core::workflow::dispatcher::{
    HttpTransport, OutboundRequest, TransportError, TransportResponse,
};
use hookflow_types::workflow::HttpMethod;
use serde_json::Value;

/// Shared outbound HTTP client.
///
/// Cloning is cheap: `reqwest::Client` is reference-counted. Idle connections
/// are not kept, so every attempt opens its own connection.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport that sends `user_agent` with every request.
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn map_error(err: reqwest::Error, request: &OutboundRequest) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(request.timeout)
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

/// JSON when the body parses as JSON, otherwise the raw text.
fn parse_body(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url)
            .timeout(request.timeout);

        // Headers go first so a configured Content-Type wins over `.json()`.
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| map_error(e, request))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| map_error(e, request))?;

        tracing::debug!(
            url = request.url.as_str(),
            status,
            body_len = text.len(),
            "http attempt completed"
        );

        Ok(TransportResponse {
            status,
            body: parse_body(text),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
