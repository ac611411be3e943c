//! Step interpreter for the three workflow step types.
//!
//! `StepRunner` dispatches on the `Step` variant:
//! - **transform**: applies `default` / `template` / `pick` ops to a copy of
//!   the context and hands the copy back.
//! - **filter**: checks every condition against the context; the first
//!   failing one stops the run as `skipped`.
//! - **http_request**: sends the request through `HttpDispatcher`; the
//!   context is left as is.

use hookflow_types::workflow::{Context, FilterCondition, FilterOp, Step, TransformOp};
use serde_json::Value;

use super::context::{assign_value, clone_context, get_value, is_empty_value, set_value};
use super::dispatcher::{DispatchError, HttpDispatcher, HttpTransport};
use super::template::render;

// ---------------------------------------------------------------------------
// StepOutcome
// ---------------------------------------------------------------------------

/// Result of a step that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Continue with the next step. `Some` carries a replacement context,
    /// `None` keeps the current one.
    Continue(Option<Context>),
    /// A filter condition did not hold; the whole run stops as `skipped`.
    Skipped,
}

// ---------------------------------------------------------------------------
// StepError
// ---------------------------------------------------------------------------

/// Errors that fail a step (and with it the run).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StepError {
    /// A transform op is missing a required field.
    #[error("{0}")]
    Validation(String),

    /// The outbound HTTP request failed.
    #[error(transparent)]
    Http(#[from] DispatchError),
}

impl StepError {
    /// Response status of the failed HTTP attempt, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            StepError::Http(e) => e.status(),
            StepError::Validation(_) => None,
        }
    }

    /// Response body of the failed HTTP attempt, if any.
    pub fn data(&self) -> Option<&Value> {
        match self {
            StepError::Http(e) => e.body(),
            StepError::Validation(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// StepRunner
// ---------------------------------------------------------------------------

/// Executes individual workflow steps.
pub struct StepRunner<T> {
    dispatcher: HttpDispatcher<T>,
}

impl<T: HttpTransport> StepRunner<T> {
    pub fn new(transport: T) -> Self {
        Self {
            dispatcher: HttpDispatcher::new(transport),
        }
    }

    /// Run one step against `ctx`.
    pub async fn run(
        &self,
        step: &Step,
        ctx: &Context,
        workflow_id: &str,
    ) -> Result<StepOutcome, StepError> {
        match step {
            Step::Transform { ops } => {
                apply_transform(ops, ctx).map(|c| StepOutcome::Continue(Some(c)))
            }
            Step::Filter { conditions } => {
                if evaluate_filter(conditions, ctx) {
                    Ok(StepOutcome::Continue(None))
                } else {
                    Ok(StepOutcome::Skipped)
                }
            }
            Step::HttpRequest(http) => {
                let response = self.dispatcher.dispatch(http, ctx, workflow_id).await?;
                tracing::debug!(status = response.status, "http_request step completed");
                Ok(StepOutcome::Continue(None))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// transform
// ---------------------------------------------------------------------------

/// Apply `ops` in order to a copy of `ctx` and return the copy.
pub fn apply_transform(ops: &[TransformOp], ctx: &Context) -> Result<Context, StepError> {
    let mut next = clone_context(ctx);
    for op in ops {
        apply_op(op, &mut next)?;
    }
    Ok(next)
}

fn apply_op(op: &TransformOp, ctx: &mut Context) -> Result<(), StepError> {
    match op {
        TransformOp::Default { path, value } => {
            let path = non_empty(path.as_deref()).ok_or_else(|| {
                StepError::Validation(r#"Transform operation "default" requires a path"#.into())
            })?;
            if is_empty_value(get_value(ctx, path)) {
                assign_value(ctx, path, value.clone());
            }
        }
        TransformOp::Template { to, template } => {
            let (Some(to), Some(template)) =
                (non_empty(to.as_deref()), non_empty(template.as_deref()))
            else {
                return Err(StepError::Validation(
                    r#"Transform operation "template" requires "to" and "template""#.into(),
                ));
            };
            let rendered = render(template, ctx);
            set_value(ctx, to, Value::String(rendered));
        }
        TransformOp::Pick { paths } => {
            let paths = paths.as_deref().filter(|p| !p.is_empty()).ok_or_else(|| {
                StepError::Validation(r#"Transform operation "pick" requires "paths" array"#.into())
            })?;
            let mut picked = Context::new();
            for path in paths {
                let value = get_value(ctx, path);
                if !value.is_null() {
                    set_value(&mut picked, path, value.clone());
                }
            }
            *ctx = picked;
        }
    }
    Ok(())
}

fn non_empty(field: Option<&str>) -> Option<&str> {
    field.filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// filter
// ---------------------------------------------------------------------------

/// True when every condition holds. Stops at the first failing one.
pub fn evaluate_filter(conditions: &[FilterCondition], ctx: &Context) -> bool {
    conditions.iter().all(|cond| {
        let equal = json_equals(get_value(ctx, &cond.path), &cond.value);
        match cond.op {
            FilterOp::Eq => equal,
            FilterOp::Neq => !equal,
        }
    })
}

/// Equality used by filter conditions: numbers by value, everything else
/// structurally.
pub fn json_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equals(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(k, x)| ym.get(k).is_some_and(|y| json_equals(x, y)))
        }
        _ => a == b,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
