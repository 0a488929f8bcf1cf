//! Tolerant field lookup over loosely shaped JSON payloads.
//!
//! The request API is not consistent about where it places session, slot
//! and resource fields: the same datum may arrive flat (`newDate`) or nested
//! (`newSession.date`, `rescheduleInfo.newDate`). Callers describe the
//! plausible locations as an ordered list of dotted paths and take the first
//! one that yields a usable value.
//!
//! Path segments are object keys; a segment made of digits indexes into an
//! array (`slots.0.id`).

use serde_json::Value;

/// Follow one dotted path from `root`.
#[must_use]
pub fn at_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    })
}

/// `true` for values a lookup should skip: `null`, blank strings, and empty
/// arrays or objects.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// First non-blank value found along `paths`, probed in order.
#[must_use]
pub fn first_match<'a>(root: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| at_path(root, path))
        .find(|value| !is_blank(value))
}

/// First value along `paths` that renders as a non-empty string.
///
/// Numbers and booleans are rendered with their JSON text so that an id
/// sent as `7` and one sent as `"7"` resolve identically.
#[must_use]
pub fn first_string(root: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| match at_path(root, path)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// First value along `paths` that is an integer or an integer-valued string.
#[must_use]
pub fn first_i64(root: &Value, paths: &[&str]) -> Option<i64> {
    paths.iter().find_map(|path| match at_path(root, path)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// First value along `paths` that is numeric (or a numeric string).
#[must_use]
pub fn first_f64(root: &Value, paths: &[&str]) -> Option<f64> {
    paths.iter().find_map(|path| match at_path(root, path)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
