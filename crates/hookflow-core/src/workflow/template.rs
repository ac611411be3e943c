//! `{{path}}` placeholder rendering.
//!
//! Placeholders are a dotted path of identifiers made of ASCII alphanumerics
//! and underscores, e.g. `{{user.first_name}}`. Anything else between braces
//! (spaces, dashes, filters) is left as literal text. Rendering never fails:
//! a missing path renders as the empty string.

use std::borrow::Cow;
use std::sync::LazyLock;

use hookflow_types::workflow::Context;
use regex::{Captures, Regex};
use serde_json::Value;

use super::context::get_value;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\}\}")
        .unwrap_or_else(|e| panic!("placeholder pattern must compile: {e}"))
});

/// Substitute every placeholder in `template` with its value from `ctx`.
///
/// Substituted text is not scanned again, so a value containing `{{x}}` is
/// inserted literally.
pub fn render(template: &str, ctx: &Context) -> String {
    match PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        value_to_string(get_value(ctx, &caps[1])).into_owned()
    }) {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}

/// Render every string leaf of `value`, keeping its shape.
pub fn render_value(value: &Value, ctx: &Context) -> Value {
    match value {
        Value::String(s) => Value::String(render(s, ctx)),
        Value::Array(items) => Value::Array(items.iter().map(|v| render_value(v, ctx)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), render_value(v, ctx)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// String form of a context value as inserted into a template.
///
/// - Integral floats drop their fractional part (`3.0` renders as `3`).
/// - Floats at or above `1e21`, or below `1e-6`, use exponent form (`1e+21`, `1e-7`).
/// - Lists render their elements comma-joined, flattening nested lists; null
///   elements render empty.
/// - Mappings render as compact JSON.
pub fn value_to_string(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cow::Owned(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Cow::Owned(u.to_string())
            } else {
                Cow::Owned(n.as_f64().map(format_float).unwrap_or_default())
            }
        }
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(value_to_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

fn format_float(f: f64) -> String {
    let magnitude = f.abs();
    if magnitude >= 1e21 || (magnitude != 0.0 && magnitude < 1e-6) {
        // `{:e}` yields `1e21` / `1.5e-7`; positive exponents carry an explicit sign.
        let formatted = format!("{f:e}");
        match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => formatted,
        }
    } else {
        f.to_string()
    }
}
