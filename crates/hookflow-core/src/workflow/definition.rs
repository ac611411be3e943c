//! Workflow definition parsing and validation.
//!
//! Step and op kinds, HTTP methods and body modes are closed enums, so serde
//! already rejects unknown kinds while parsing. `validate_steps` checks the
//! remaining structural constraints before a definition is stored or run.

use std::path::Path;

use hookflow_types::workflow::{CreateWorkflowInput, Step, MAX_RETRIES};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating a workflow definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// JSON/YAML parse failure (including unknown step or op kinds).
    #[error("parse error: {0}")]
    Parse(String),

    /// Structural validation failure.
    #[error("validation error: {0}")]
    Validation(String),

    /// Filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a JSON definition (`{ name, enabled?, steps }`) and validate it.
pub fn parse_definition_json(json: &str) -> Result<CreateWorkflowInput, DefinitionError> {
    let input: CreateWorkflowInput =
        serde_json::from_str(json).map_err(|e| DefinitionError::Parse(e.to_string()))?;
    validate_definition(&input)?;
    Ok(input)
}

/// Parse a YAML definition and validate it.
pub fn parse_definition_yaml(yaml: &str) -> Result<CreateWorkflowInput, DefinitionError> {
    let input: CreateWorkflowInput =
        serde_yaml_ng::from_str(yaml).map_err(|e| DefinitionError::Parse(e.to_string()))?;
    validate_definition(&input)?;
    Ok(input)
}

/// Load a definition file. `.yaml` / `.yml` files are parsed as YAML,
/// everything else as JSON.
pub fn load_definition_file(path: &Path) -> Result<CreateWorkflowInput, DefinitionError> {
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => parse_definition_yaml(&content),
        _ => parse_definition_json(&content),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a create payload: non-empty name plus `validate_steps`.
pub fn validate_definition(input: &CreateWorkflowInput) -> Result<(), DefinitionError> {
    validate_name(&input.name)?;
    validate_steps(&input.steps)
}

/// Workflow names must not be empty.
pub fn validate_name(name: &str) -> Result<(), DefinitionError> {
    if name.is_empty() {
        return Err(DefinitionError::Validation(
            "workflow name must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validate a step list.
///
/// Checks:
/// - At least one step exists
/// - Filter steps have at least one condition
/// - `http_request` URLs parse as absolute URLs
/// - `timeoutMs` > 0 and `retries` <= 10
///
/// Required op fields (`path`, `to`/`template`, `paths`) are checked when
/// the op runs, not here.
pub fn validate_steps(steps: &[Step]) -> Result<(), DefinitionError> {
    if steps.is_empty() {
        return Err(DefinitionError::Validation(
            "workflow must have at least one step".to_string(),
        ));
    }

    for (index, step) in steps.iter().enumerate() {
        match step {
            Step::Transform { .. } => {}
            Step::Filter { conditions } => {
                if conditions.is_empty() {
                    return Err(DefinitionError::Validation(format!(
                        "step {index} (filter) must have at least one condition"
                    )));
                }
            }
            Step::HttpRequest(http) => {
                if let Err(e) = url::Url::parse(&http.url) {
                    return Err(DefinitionError::Validation(format!(
                        "step {index} (http_request) has invalid url '{}': {e}",
                        http.url
                    )));
                }
                if http.timeout_ms == 0 {
                    return Err(DefinitionError::Validation(format!(
                        "step {index} (http_request) timeoutMs must be positive"
                    )));
                }
                if http.retries > MAX_RETRIES {
                    return Err(DefinitionError::Validation(format!(
                        "step {index} (http_request) retries must be at most {MAX_RETRIES}, got {}",
                        http.retries
                    )));
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
