//! Result coercion for tool payloads.
//!
//! Tool results arrive either as JSON-encoded text or as an already
//! structured value. Everything funnels through here and comes out as
//! `Parsed::Ok(T)` or `Parsed::Empty`; decode failures never escape.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Outcome of coercing a raw tool result.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Ok(T),
    Empty,
}

impl<T> Parsed<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Parsed::Empty)
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Parsed::Ok(v) => Some(v),
            Parsed::Empty => None,
        }
    }
}

impl<T> Parsed<Vec<T>> {
    /// Collapse an empty list into `Empty` so callers have one branch.
    pub fn non_empty(self) -> Self {
        match self {
            Parsed::Ok(v) if v.is_empty() => Parsed::Empty,
            other => other,
        }
    }
}

/// Decode text payloads; pass structured payloads through unchanged.
pub fn decode(raw: Option<&Value>) -> Option<Value> {
    match raw? {
        Value::Null => None,
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(error = %e, len = text.len(), "Tool result is not valid JSON");
                None
            }
        },
        other => Some(other.clone()),
    }
}

/// Coerce a result expected to be a JSON array of `T`.
///
/// Elements that do not decode as `T` are skipped. Any other container
/// shape yields `Empty`.
pub fn parse_list<T: DeserializeOwned>(raw: Option<&Value>) -> Parsed<Vec<T>> {
    match decode(raw) {
        Some(Value::Array(items)) => Parsed::Ok(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        Some(other) => {
            debug!(kind = value_kind(&other), "Expected a list result");
            Parsed::Empty
        }
        None => Parsed::Empty,
    }
}

/// Coerce a result expected to be a JSON object decoding as `T`.
pub fn parse_object<T: DeserializeOwned>(raw: Option<&Value>) -> Parsed<T> {
    match decode(raw) {
        Some(v @ Value::Object(_)) => match serde_json::from_value(v) {
            Ok(parsed) => Parsed::Ok(parsed),
            Err(e) => {
                debug!(error = %e, "Object result did not match expected shape");
                Parsed::Empty
            }
        },
        Some(other) => {
            debug!(kind = value_kind(&other), "Expected an object result");
            Parsed::Empty
        }
        None => Parsed::Empty,
    }
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
