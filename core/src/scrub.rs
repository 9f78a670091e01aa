//! Scrubbing of aggregated results.
//!
//! # Design
//! A call either yields a full value or an error, never partial data. After
//! aggregation the entries are flattened one level (some endpoints wrap a
//! single entry in an array), falsy entries are dropped, and an empty
//! remainder is turned into a "no results" `ClientError`: the API sometimes
//! answers a missing resource with an empty success instead of an error.

use serde_json::Value;

use crate::error::ApiError;

/// Produce the caller-facing value from an aggregate.
///
/// `expected_count` enables strict mode: the aggregate must hold exactly one
/// entry per submitted identifier. A mismatch means a collaborator dropped
/// entries and panics.
pub fn scrub(
    aggregate: Result<Vec<Value>, ApiError>,
    want_array: bool,
    expected_count: Option<usize>,
) -> Result<Value, ApiError> {
    let entries = aggregate?;
    if let Some(expected) = expected_count {
        assert_eq!(
            entries.len(),
            expected,
            "expected {expected} results, got {}",
            entries.len()
        );
    }

    let mut entries: Vec<Value> = entries
        .into_iter()
        .flat_map(|entry| match entry {
            Value::Array(nested) => nested,
            other => vec![other],
        })
        .filter(|entry| !is_falsy(entry))
        .collect();

    if entries.is_empty() {
        tracing::warn!("API returned success with no usable entries");
        return Err(ApiError::no_results());
    }
    if want_array {
        Ok(Value::Array(entries))
    } else {
        Ok(entries.swap_remove(0))
    }
}

/// Split a single (possibly batched) payload into scrubber input.
pub fn entries(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
