//! JSON helpers shared by the dialects.

use serde::Serialize;
use serde_json::Value;

use crate::error::{A1Error, A1Result};

const OUTPUT: &str = "output";
const POLICY_SCHEMA: &str = "policySchema";

/// Parse a JSON array into strings. Non-string elements keep their JSON
/// text. A blank input is an empty list.
pub fn parse_string_array(text: &str) -> A1Result<Vec<String>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(text).map_err(A1Error::invalid_response)?;
    let Value::Array(items) = value else {
        return Err(A1Error::invalid_response(format!("expected a JSON array, got {text}")));
    };
    let ids = items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect::<Vec<_>>();
    tracing::trace!(?ids, "received list");
    Ok(ids)
}

/// Return the body unchanged if it is a JSON object.
pub fn validate_json_object(text: &str) -> A1Result<String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(_)) => Ok(text.to_string()),
        Ok(_) => Err(A1Error::invalid_response("expected a JSON object")),
        Err(e) => Err(A1Error::invalid_response(e)),
    }
}

/// Parse a JSON object.
pub fn parse_object(text: &str) -> A1Result<serde_json::Map<String, Value>> {
    match serde_json::from_str::<Value>(text).map_err(A1Error::invalid_response)? {
        Value::Object(map) => Ok(map),
        _ => Err(A1Error::invalid_response("expected a JSON object")),
    }
}

/// Take the `policySchema` object out of a policy type document.
pub fn extract_policy_schema(text: &str) -> A1Result<String> {
    let mut document = parse_object(text)?;
    match document.remove(POLICY_SCHEMA) {
        Some(schema @ Value::Object(_)) => Ok(schema.to_string()),
        _ => Err(A1Error::parse(POLICY_SCHEMA)),
    }
}

/// Wrap controller request fields as `{"input": {...}}`.
pub fn input_envelope<T: Serialize>(fields: &T) -> A1Result<String> {
    #[derive(Serialize)]
    struct Envelope<'a, T> {
        input: &'a T,
    }
    serde_json::to_string(&Envelope { input: fields }).map_err(|e| A1Error::InvalidRequest {
        reason: e.to_string(),
    })
}

/// Read `output.<key>` from a controller response. A missing key yields an
/// empty string; a string value is returned as is and anything else as JSON
/// text.
pub fn value_from_output(response: &str, key: &str) -> A1Result<String> {
    Ok(output_value(response, key)?.map(value_text).unwrap_or_default())
}

/// Like [`value_from_output`], but a missing key is a parse error.
pub fn require_output_value(response: &str, key: &str) -> A1Result<String> {
    output_value(response, key)?
        .map(value_text)
        .ok_or_else(|| A1Error::parse(key))
}

fn output_value(response: &str, key: &str) -> A1Result<Option<Value>> {
    let mut document = parse_object(response)?;
    let Some(Value::Object(mut output)) = document.remove(OUTPUT) else {
        return Err(A1Error::parse(OUTPUT));
    };
    Ok(output.remove(key))
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
