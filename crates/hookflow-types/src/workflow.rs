//! Workflow domain types for Hookflow.
//!
//! Defines the JSON shape of workflow definitions (steps, transform ops,
//! filter conditions, outbound HTTP settings), the persisted workflow and run
//! records, and the `RunOutcome` the engine hands to persistence.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Execution context
// ---------------------------------------------------------------------------

/// The JSON mapping threaded through a run's steps.
///
/// Keys keep insertion order (`serde_json` is built with `preserve_order`).
pub type Context = Map<String, Value>;

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// A stored workflow definition.
///
/// Immutable during a run: the runner only reads `steps` and `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// `wf_` followed by 32 hex characters.
    pub id: String,
    /// Human-readable workflow name.
    pub name: String,
    /// Disabled workflows reject trigger requests.
    pub enabled: bool,
    /// How the workflow is started.
    pub trigger: Trigger,
    /// Ordered, non-empty list of steps.
    pub steps: Vec<Step>,
}

/// How a workflow can be triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Inbound HTTP request on a generated path (e.g. `/t/3f9a...`).
    Http { path: String },
}

impl Trigger {
    /// The trigger path this workflow listens on.
    pub fn path(&self) -> &str {
        match self {
            Trigger::Http { path } => path,
        }
    }
}

/// Payload for creating a workflow through the API or CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkflowInput {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub steps: Vec<Step>,
}

fn default_enabled() -> bool {
    true
}

/// Partial update payload. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWorkflowInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Step>>,
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// A single workflow step, tagged by `type`.
///
/// ```json
/// { "type": "filter", "conditions": [{ "path": "event", "op": "eq", "value": "push" }] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Mutate a copy of the context with a list of ops.
    Transform { ops: Vec<TransformOp> },
    /// Stop the whole run (as `skipped`) unless every condition holds.
    Filter { conditions: Vec<FilterCondition> },
    /// Send an outbound HTTP request.
    HttpRequest(HttpRequestStep),
}

impl Step {
    /// The kind tag of this step.
    pub fn kind(&self) -> StepKind {
        match self {
            Step::Transform { .. } => StepKind::Transform,
            Step::Filter { .. } => StepKind::Filter,
            Step::HttpRequest(_) => StepKind::HttpRequest,
        }
    }
}

/// The kind of a step, as reported in run error details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Transform,
    Filter,
    HttpRequest,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Transform => "transform",
            StepKind::Filter => "filter",
            StepKind::HttpRequest => "http_request",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transform operation, tagged by `op`.
///
/// Required fields are optional here and enforced when the op runs, so a
/// stored definition with a missing field fails its run rather than its save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformOp {
    /// Set `value` at `path` when the current value is null, `""` or `[]`.
    Default {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        /// `None` when the field is absent; `Some(Value::Null)` for an explicit null.
        #[serde(
            default,
            deserialize_with = "explicit_value",
            skip_serializing_if = "Option::is_none"
        )]
        value: Option<Value>,
    },
    /// Render `template` against the context and write the result at `to`.
    Template {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template: Option<String>,
    },
    /// Replace the context with only the listed paths.
    Pick {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        paths: Option<Vec<String>>,
    },
}

/// Keeps an explicit JSON `null` as `Some(Value::Null)` instead of `None`.
fn explicit_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub path: String,
    pub op: FilterOp,
    #[serde(default)]
    pub value: Value,
}

/// Comparison operator for filter conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Neq,
}

/// Configuration of an `http_request` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestStep {
    pub method: HttpMethod,
    /// May contain `{{path}}` placeholders.
    pub url: String,
    /// Header values may contain `{{path}}` placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<HttpBody>,
    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Extra attempts after the first one (0..=10).
    #[serde(default)]
    pub retries: u32,
}

/// Default per-attempt timeout (5 seconds).
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Upper bound for `HttpRequestStep::retries`.
pub const MAX_RETRIES: u32 = 10;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Allowed outbound HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body construction mode, tagged by `mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HttpBody {
    /// Send the whole context plus `workflow_id`.
    Ctx,
    /// Send `value` with every string leaf rendered as a template.
    Custom {
        #[serde(default)]
        value: Value,
    },
}

// ---------------------------------------------------------------------------
// Run outcome and records
// ---------------------------------------------------------------------------

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Failed,
    Skipped,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
            RunStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured detail attached to a failed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Kind of the step that failed.
    pub step: StepKind,
    /// Failure message (same as the run's `error`).
    pub error: String,
    /// Response status of the last HTTP attempt, when one was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Response body of the last HTTP attempt, when one was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Result of one workflow execution, produced once per trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Final context snapshot (pre-step context for skipped/failed runs).
    pub context: Context,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ErrorDetails>,
}

/// A persisted run record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// `run_` followed by 32 hex characters.
    pub id: String,
    pub workflow_id: String,
    pub status: RunStatus,
    #[serde(rename = "ctx")]
    pub context: Context,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ErrorDetails>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_request_step_defaults() {
        let step: Step = serde_json::from_value(json!({
            "type": "http_request",
            "method": "POST",
            "url": "https://example.com/hook"
        }))
        .unwrap();

        match step {
            Step::HttpRequest(http) => {
                assert_eq!(http.method, HttpMethod::Post);
                assert_eq!(http.timeout_ms, DEFAULT_TIMEOUT_MS);
                assert_eq!(http.retries, 0);
                assert!(http.headers.is_none());
                assert!(http.body.is_none());
            }
            other => panic!("expected http_request, got {other:?}"),
        }
    }

    #[test]
    fn test_http_request_step_camel_case_fields() {
        let step: Step = serde_json::from_value(json!({
            "type": "http_request",
            "method": "GET",
            "url": "https://example.com",
            "timeoutMs": 250,
            "retries": 3,
            "body": { "mode": "custom", "value": { "id": "{{id}}" } }
        }))
        .unwrap();

        let Step::HttpRequest(http) = step else {
            panic!("expected http_request");
        };
        assert_eq!(http.timeout_ms, 250);
        assert_eq!(http.retries, 3);
        assert_eq!(
            http.body,
            Some(HttpBody::Custom {
                value: json!({ "id": "{{id}}" })
            })
        );
    }

    #[test]
    fn test_unknown_step_type_rejected() {
        let result: Result<Step, _> =
            serde_json::from_value(json!({ "type": "loop", "steps": [] }));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_op_rejected() {
        let result: Result<TransformOp, _> =
            serde_json::from_value(json!({ "op": "rename", "from": "a", "to": "b" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_lowercase_method_rejected() {
        let result: Result<HttpMethod, _> = serde_json::from_value(json!("get"));
        assert!(result.is_err());
        let result: Result<HttpMethod, _> = serde_json::from_value(json!("HEAD"));
        assert!(result.is_err());
    }

    #[test]
    fn test_default_op_distinguishes_null_from_absent() {
        let absent: TransformOp =
            serde_json::from_value(json!({ "op": "default", "path": "a" })).unwrap();
        let null: TransformOp =
            serde_json::from_value(json!({ "op": "default", "path": "a", "value": null }))
                .unwrap();

        assert_eq!(
            absent,
            TransformOp::Default {
                path: Some("a".into()),
                value: None
            }
        );
        assert_eq!(
            null,
            TransformOp::Default {
                path: Some("a".into()),
                value: Some(Value::Null)
            }
        );
    }

    #[test]
    fn test_filter_condition_value_defaults_to_null() {
        let cond: FilterCondition =
            serde_json::from_value(json!({ "path": "a", "op": "neq" })).unwrap();
        assert_eq!(cond.op, FilterOp::Neq);
        assert_eq!(cond.value, Value::Null);
    }

    #[test]
    fn test_step_kind_display() {
        assert_eq!(StepKind::HttpRequest.to_string(), "http_request");
        let step = Step::Filter { conditions: vec![] };
        assert_eq!(step.kind(), StepKind::Filter);
    }

    #[test]
    fn test_workflow_from_yaml() {
        let yaml = r#"
id: wf_0123
name: notify
enabled: true
trigger:
  type: http
  path: /t/abc
steps:
  - type: transform
    ops:
      - op: template
        to: greeting
        template: "hello {{user.name}}"
"#;
        let wf: Workflow = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(wf.trigger.path(), "/t/abc");
        assert_eq!(wf.steps.len(), 1);
        assert_eq!(wf.steps[0].kind(), StepKind::Transform);
    }

    #[test]
    fn test_run_record_serializes_context_as_ctx() {
        let run = WorkflowRun {
            id: "run_1".into(),
            workflow_id: "wf_1".into(),
            status: RunStatus::Skipped,
            context: Context::new(),
            error_message: None,
            error_details: None,
            started_at: Utc::now(),
            completed_at: None,
        };
        let value = serde_json::to_value(&run).unwrap();
        assert_eq!(value["status"], json!("skipped"));
        assert_eq!(value["ctx"], json!({}));
        assert!(value.get("error_message").is_none());
    }
}
