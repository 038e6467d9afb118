//! Named input fields as received from callers.
//!
//! Both the yield and the fertilizer paths accept an open mapping of field
//! name to JSON value. These helpers apply the coercion rules shared by the
//! feature encoder and the prompt renderer.

/// A single caller-supplied value.
pub type FieldValue = serde_json::Value;

/// Caller-supplied mapping of field name to value.
pub type FieldMap = serde_json::Map<String, FieldValue>;

/// Read a value as a real number.
///
/// Numbers convert directly, strings are trimmed and parsed, booleans map to
/// 1.0/0.0. Everything else (including `null`) is not convertible.
pub fn numeric_value(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(n) => n.as_f64(),
        FieldValue::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Render a value as the string a categorical encoder is keyed on.
///
/// Strings are used verbatim; other values use their JSON text.
pub fn text_value(value: &FieldValue) -> String {
    match value {
        FieldValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
