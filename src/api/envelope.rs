//! Response envelope normalization.
//!
//! List endpoints answer with a bare array, `{ "data": [...] }`, a paged
//! `{ "data": { "content": [...] } }`, or `{ "data": null }` for nothing.
//! Object endpoints answer bare or as `{ "data": {...} }`. Everything past
//! this module sees one canonical shape.

use serde_json::{Map, Value};

use crate::errors::ApiFailure;
use crate::lookup::first_string;
use crate::{AppError, Result};

const MESSAGE: &[&str] = &["message", "error", "detail"];
const CODE: &[&str] = &["errorCode", "code"];

/// Unwrap a list-style response into its items.
///
/// # Errors
///
/// Returns `AppError::Api` for a `success: false` envelope and
/// `AppError::Decode` when no list can be found.
pub fn into_list(body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            check_success(&map)?;
            match map.remove("data") {
                Some(Value::Array(items)) => Ok(items),
                Some(Value::Null) => Ok(Vec::new()),
                Some(Value::Object(mut page)) => match page.remove("content") {
                    Some(Value::Array(items)) => Ok(items),
                    _ => Err(AppError::Decode(
                        "list envelope data is an object without content".into(),
                    )),
                },
                Some(_) => Err(AppError::Decode("list envelope data is not a list".into())),
                None => Err(AppError::Decode("list response has no data".into())),
            }
        }
        Value::Null => Ok(Vec::new()),
        _ => Err(AppError::Decode("list response is not an array or object".into())),
    }
}

/// Unwrap an object-style response.
///
/// # Errors
///
/// Returns `AppError::Api` for a `success: false` envelope and
/// `AppError::Decode` when no object can be found.
pub fn into_object(body: Value) -> Result<Value> {
    let Value::Object(mut map) = body else {
        return Err(AppError::Decode("object response is not an object".into()));
    };
    check_success(&map)?;
    match map.remove("data") {
        Some(data @ Value::Object(_)) => Ok(data),
        Some(Value::Null) => Err(AppError::Decode("object envelope data is null".into())),
        Some(_) => Err(AppError::Decode("object envelope data is not an object".into())),
        None => Ok(Value::Object(map)),
    }
}

/// Reject `{ "success": false, ... }` envelopes delivered with a 2xx status.
fn check_success(map: &Map<String, Value>) -> Result<()> {
    if map.get("success").and_then(Value::as_bool) == Some(false) {
        let body = Value::Object(map.clone());
        return Err(AppError::Api(failure_from_body(None, &body)));
    }
    Ok(())
}

/// Build an [`ApiFailure`] from an error body of any accepted shape.
#[must_use]
pub fn failure_from_body(status: Option<u16>, body: &Value) -> ApiFailure {
    ApiFailure {
        status,
        code: first_string(body, CODE),
        message: first_string(body, MESSAGE).unwrap_or_else(|| "request failed".to_owned()),
    }
}
