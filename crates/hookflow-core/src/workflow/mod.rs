//! Workflow execution engine.
//!
//! - `context` -- Context copies and dotted-path get/set
//! - `template` -- `{{path}}` placeholder rendering
//! - `definition` -- Definition parsing and structural validation
//! - `retry` -- Attempt classification and backoff policy
//! - `dispatcher` -- Outbound HTTP request building and the retry loop
//! - `step_runner` -- transform / filter / http_request interpreters
//! - `executor` -- Sequential runner producing a `RunOutcome`

pub mod context;
pub mod definition;
pub mod dispatcher;
pub mod executor;
pub mod retry;
pub mod step_runner;
pub mod template;
