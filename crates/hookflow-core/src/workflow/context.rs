//! Execution context model and dotted-path accessor.
//!
//! The context is a JSON mapping (`Context`) owned by a single run. Steps
//! read it through `get_value` and write it through `set_value`, using plain
//! dot-joined keys (`user.address.city`). There is no list indexing and no
//! escaping of dots.
//!
//! # Copy semantics
//!
//! A run starts from a deep copy of the trigger payload, and every transform
//! step works on a fresh deep copy of the incoming context. `serde_json`
//! values are plain trees, so a structural clone is a full copy. The only
//! values that cannot survive a JSON round-trip are "undefined" assignments:
//! a `default` op without a `value` creates the intermediate mappings of its
//! path but leaves the terminal key absent (see `assign_value`). Non-finite
//! numbers cannot be represented at all and are rejected when the trigger
//! body is parsed.

use hookflow_types::workflow::Context;
use serde_json::Value;
use thiserror::Error;

static NULL: Value = Value::Null;

/// Errors raised when turning an inbound payload into a context.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    /// The payload is valid JSON but not a mapping.
    #[error("trigger payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Build the initial context of a run from a trigger payload.
///
/// An absent payload and JSON `null` both become an empty mapping.
pub fn context_from_payload(payload: Option<Value>) -> Result<Context, ContextError> {
    match payload {
        None | Some(Value::Null) => Ok(Context::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(ContextError::NotAnObject(json_type_name(&other))),
    }
}

/// Deep-copy a context.
pub fn clone_context(ctx: &Context) -> Context {
    ctx.clone()
}

/// Resolve a dotted path.
///
/// Returns `Value::Null` when any intermediate value is missing or not a
/// mapping, or when the terminal key is absent.
pub fn get_value<'a>(ctx: &'a Context, path: &str) -> &'a Value {
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return &NULL;
    };
    let Some(mut current) = ctx.get(first) else {
        return &NULL;
    };

    for segment in segments {
        match current {
            Value::Object(map) => match map.get(segment) {
                Some(next) => current = next,
                None => return &NULL,
            },
            _ => return &NULL,
        }
    }
    current
}

/// Write `value` at a dotted path.
///
/// Missing or non-mapping intermediate nodes are replaced with empty mappings.
pub fn set_value(ctx: &mut Context, path: &str, value: Value) {
    let (parent, key) = descend(ctx, path);
    parent.insert(key.to_string(), value);
}

/// Write `value` at a dotted path, treating `None` as an undefined value.
///
/// Intermediate mappings are created either way; with `None` the terminal key
/// is removed, which is what a JSON round-trip does to an undefined value.
pub fn assign_value(ctx: &mut Context, path: &str, value: Option<Value>) {
    match value {
        Some(value) => set_value(ctx, path, value),
        None => {
            let (parent, key) = descend(ctx, path);
            parent.shift_remove(key);
        }
    }
}

/// True for null, the empty string and the empty list.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Walk to the mapping that owns the last segment of `path`, creating
/// mappings along the way. Returns that mapping and the last segment.
fn descend<'a, 'p>(ctx: &'a mut Context, path: &'p str) -> (&'a mut Context, &'p str) {
    let (parents, key) = match path.rsplit_once('.') {
        Some((parents, key)) => (Some(parents), key),
        None => (None, path),
    };

    let mut current = ctx;
    if let Some(parents) = parents {
        for segment in parents.split('.') {
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Context::new()));
            current = ensure_object(slot);
        }
    }
    (current, key)
}

fn ensure_object(slot: &mut Value) -> &mut Context {
    if !slot.is_object() {
        *slot = Value::Object(Context::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced with an object"),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
