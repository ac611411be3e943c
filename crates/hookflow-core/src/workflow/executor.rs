//! Workflow runner: sequential step execution producing a `RunOutcome`.
//!
//! # Execution flow
//!
//! 1. Copy the trigger-supplied initial context.
//! 2. Run each step in order through `StepRunner`.
//! 3. A filter miss stops the run as `skipped` with the pre-step context.
//! 4. A step error stops the run as `failed` with the pre-step context and
//!    structured error details.
//! 5. Otherwise adopt the step's context and continue; after the last step
//!    the run is `success`.
//!
//! The runner never persists anything and never retries a failed step; HTTP
//! retries happen inside the dispatcher.

use hookflow_types::workflow::{Context, ErrorDetails, RunOutcome, RunStatus, Step};
use tracing::Instrument;

use super::context::clone_context;
use super::dispatcher::HttpTransport;
use super::step_runner::{StepError, StepOutcome, StepRunner};

/// Drives a workflow's steps for one run.
pub struct WorkflowRunner<T> {
    step_runner: StepRunner<T>,
}

impl<T: HttpTransport> WorkflowRunner<T> {
    pub fn new(transport: T) -> Self {
        Self {
            step_runner: StepRunner::new(transport),
        }
    }

    /// Execute `steps` against a copy of `initial` and return the outcome.
    pub async fn execute_workflow(
        &self,
        steps: &[Step],
        initial: &Context,
        workflow_id: &str,
    ) -> RunOutcome {
        let span = tracing::info_span!("workflow_run", workflow_id = %workflow_id);
        async move {
            let outcome = self.run_steps(steps, initial, workflow_id).await;
            match outcome.status {
                RunStatus::Failed => tracing::warn!(
                    status = %outcome.status,
                    error = outcome.error.as_deref().unwrap_or_default(),
                    "workflow run finished"
                ),
                _ => tracing::info!(status = %outcome.status, "workflow run finished"),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run_steps(&self, steps: &[Step], initial: &Context, workflow_id: &str) -> RunOutcome {
        let mut ctx = clone_context(initial);

        for (step_index, step) in steps.iter().enumerate() {
            let step_kind = step.kind();
            tracing::debug!(step_index, step_kind = %step_kind, "running step");

            match self.step_runner.run(step, &ctx, workflow_id).await {
                Ok(StepOutcome::Continue(Some(next))) => ctx = next,
                Ok(StepOutcome::Continue(None)) => {}
                Ok(StepOutcome::Skipped) => {
                    tracing::info!(step_index, "filter did not match, skipping run");
                    return RunOutcome {
                        status: RunStatus::Skipped,
                        context: ctx,
                        error: None,
                        error_details: None,
                    };
                }
                Err(err) => {
                    tracing::debug!(
                        step_index,
                        step_kind = %step_kind,
                        error = %err,
                        "step failed"
                    );
                    return failed_outcome(step, ctx, &err);
                }
            }
        }

        RunOutcome {
            status: RunStatus::Success,
            context: ctx,
            error: None,
            error_details: None,
        }
    }
}

fn failed_outcome(step: &Step, ctx: Context, err: &StepError) -> RunOutcome {
    let message = err.to_string();
    RunOutcome {
        status: RunStatus::Failed,
        context: ctx,
        error: Some(message.clone()),
        error_details: Some(ErrorDetails {
            step: step.kind(),
            error: message,
            status: err.status(),
            data: err.data().cloned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::dispatcher::tests::FakeTransport;
    use crate::workflow::dispatcher::TransportResponse;
    use hookflow_types::workflow::StepKind;
    use serde_json::{json, Value};

    fn steps(value: Value) -> Vec<Step> {
        serde_json::from_value(value).unwrap()
    }

    fn ctx(value: Value) -> Context {
        match value {
            Value::Object(map) => map,
            other => panic!("test context must be an object, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_all_steps_succeed() {
        let transport = FakeTransport::default();
        let runner = WorkflowRunner::new(transport.clone());
        let steps = steps(json!([
            { "type": "transform", "ops": [{ "op": "default", "path": "message", "value": "hi" }] },
            { "type": "http_request", "method": "POST", "url": "https://echo.test", "body": { "mode": "ctx" } }
        ]));

        let outcome = runner.execute_workflow(&steps, &Context::new(), "wf_1").await;

        assert_eq!(outcome.status, RunStatus::Success);
        assert_eq!(Value::Object(outcome.context), json!({ "message": "hi" }));
        assert!(outcome.error.is_none());
        assert_eq!(
            transport.requests()[0].body,
            Some(json!({ "message": "hi", "workflow_id": "wf_1" }))
        );
    }

    #[tokio::test]
    async fn test_filter_skip_stops_run() {
        let transport = FakeTransport::default();
        let runner = WorkflowRunner::new(transport.clone());
        let steps = steps(json!([
            { "type": "transform", "ops": [{ "op": "template", "to": "seen", "template": "yes" }] },
            { "type": "filter", "conditions": [{ "path": "a", "op": "eq", "value": 1 }] },
            { "type": "http_request", "method": "GET", "url": "https://never.test" }
        ]));

        let outcome = runner.execute_workflow(&steps, &ctx(json!({ "a": 2 })), "wf").await;

        assert_eq!(outcome.status, RunStatus::Skipped);
        assert_eq!(Value::Object(outcome.context), json!({ "a": 2, "seen": "yes" }));
        assert!(outcome.error_details.is_none());
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_pre_step_context() {
        let runner = WorkflowRunner::new(FakeTransport::default());
        let steps = steps(json!([
            { "type": "transform", "ops": [{ "op": "default", "path": "x", "value": 1 }] },
            { "type": "transform", "ops": [
                { "op": "default", "path": "y", "value": 2 },
                { "op": "pick" }
            ] }
        ]));

        let outcome = runner.execute_workflow(&steps, &Context::new(), "wf").await;

        assert_eq!(outcome.status, RunStatus::Failed);
        assert_eq!(Value::Object(outcome.context), json!({ "x": 1 }));
        let message = r#"Transform operation "pick" requires "paths" array"#;
        assert_eq!(outcome.error.as_deref(), Some(message));
        assert_eq!(
            outcome.error_details,
            Some(ErrorDetails {
                step: StepKind::Transform,
                error: message.to_string(),
                status: None,
                data: None,
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_http_failure_captures_status_and_body() {
        let transport = FakeTransport::with_script([Ok(TransportResponse {
            status: 404,
            body: json!("no such hook"),
        })]);
        let runner = WorkflowRunner::new(transport.clone());
        let steps = steps(json!([
            { "type": "http_request", "method": "POST", "url": "https://x.test", "retries": 3 },
            { "type": "transform", "ops": [{ "op": "default", "path": "after", "value": true }] }
        ]));

        let outcome = runner.execute_workflow(&steps, &ctx(json!({ "k": "v" })), "wf").await;

        assert_eq!(outcome.status, RunStatus::Failed);
        assert_eq!(transport.attempts(), 1);
        assert_eq!(Value::Object(outcome.context), json!({ "k": "v" }));
        let details = outcome.error_details.unwrap();
        assert_eq!(details.step, StepKind::HttpRequest);
        assert_eq!(details.status, Some(404));
        assert_eq!(details.data, Some(json!("no such hook")));
        assert_eq!(details.error, r#"HTTP 404: "no such hook""#);
    }

    #[tokio::test]
    async fn test_initial_context_is_not_mutated() {
        let runner = WorkflowRunner::new(FakeTransport::default());
        let initial = ctx(json!({ "a": null }));
        let steps = steps(json!([
            { "type": "transform", "ops": [{ "op": "default", "path": "a", "value": 1 }] }
        ]));

        let outcome = runner.execute_workflow(&steps, &initial, "wf").await;
        assert_eq!(outcome.context.get("a"), Some(&json!(1)));
        assert_eq!(initial.get("a"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_empty_step_list_succeeds_with_initial_context() {
        let runner = WorkflowRunner::new(FakeTransport::default());
        let initial = ctx(json!({ "a": 1 }));
        let outcome = runner.execute_workflow(&[], &initial, "wf").await;
        assert_eq!(outcome.status, RunStatus::Success);
        assert_eq!(outcome.context, initial);
    }
}
