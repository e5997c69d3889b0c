//! Canonical views over dynamic JSON values.
//!
//! Records are schema-less, so every comparison in the query engine goes
//! through one of two projections of a [`serde_json::Value`]: its canonical
//! string form, or its numeric form when it has one.

use serde_json::Value;

/// Render a value as the string that filters, sorting and id lookups compare
/// against.
///
/// - strings render as themselves (no quotes)
/// - integers render in decimal, floats with a zero fraction render without
///   one (`3.0` becomes `"3"`)
/// - booleans render as `true` / `false`
/// - arrays and objects render as compact JSON
/// - null renders as the empty string
pub fn canonical_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                // f64 Display already drops a zero fraction
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Numeric view of a value. Numbers convert directly, strings are parsed,
/// everything else has no numeric form.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_f64(s),
        _ => None,
    }
}

/// Parse a query-string literal as a 64-bit float.
pub fn parse_f64(s: &str) -> Option<f64> {
    s.parse::<f64>().ok()
}

/// Integer view of a record id, used for id generation. Ids whose canonical
/// form is not an integer (`"x"`, `"5.5"`) have none.
pub fn as_integer_id(value: &Value) -> Option<i64> {
    canonical_string(value).parse::<i64>().ok()
}
