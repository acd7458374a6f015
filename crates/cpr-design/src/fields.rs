//! Field extraction helpers for tagged JSON objects.
//!
//! Missing fields map to [`RequestError::MalformedNode`]; present fields with
//! the wrong JSON shape map to [`RequestError::InvalidField`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use cpr_core::{ErrorInfo, RequestError};

/// JSON object as held by `serde_json`.
pub type Object = Map<String, JsonValue>;

/// Returns the string stored under `key` when `node` is an object.
pub fn tag_of<'v>(node: &'v JsonValue, key: &str) -> Option<&'v str> {
    node.as_object()?.get(key)?.as_str()
}

/// Short human readable description of a JSON node for diagnostics.
pub fn describe(node: &JsonValue) -> String {
    match node {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(_) => "boolean".to_string(),
        JsonValue::Number(_) => "number".to_string(),
        JsonValue::String(_) => "string".to_string(),
        JsonValue::Array(_) => "array".to_string(),
        JsonValue::Object(map) => {
            let tag = map
                .get(crate::tags::BLOCK_TYPE)
                .or_else(|| map.get(crate::tags::OBJECT_TYPE))
                .and_then(JsonValue::as_str);
            match tag {
                Some(tag) => format!("`{tag}`"),
                None => "untagged object".to_string(),
            }
        }
    }
}

/// Returns the required field `field` of a `node_type` node.
pub fn required<'v>(
    map: &'v Object,
    node_type: &str,
    field: &str,
) -> Result<&'v JsonValue, RequestError> {
    map.get(field)
        .ok_or_else(|| RequestError::malformed(node_type, field))
}

/// Returns the required string field `field`.
pub fn string<'v>(map: &'v Object, node_type: &str, field: &str) -> Result<&'v str, RequestError> {
    required(map, node_type, field)?
        .as_str()
        .ok_or_else(|| RequestError::invalid_field(node_type, field, "a string"))
}

/// Returns the optional string field `field`. An explicit `null` counts as absent.
pub fn optional_string<'v>(
    map: &'v Object,
    node_type: &str,
    field: &str,
) -> Result<Option<&'v str>, RequestError> {
    match map.get(field) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(text)) => Ok(Some(text.as_str())),
        Some(_) => Err(RequestError::invalid_field(node_type, field, "a string")),
    }
}

/// Returns the required array field `field`.
pub fn array<'v>(
    map: &'v Object,
    node_type: &str,
    field: &str,
) -> Result<&'v [JsonValue], RequestError> {
    required(map, node_type, field)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| RequestError::invalid_field(node_type, field, "an array"))
}

/// Returns the array field `field`, treating absence as empty.
pub fn optional_array<'v>(
    map: &'v Object,
    node_type: &str,
    field: &str,
) -> Result<&'v [JsonValue], RequestError> {
    match map.get(field) {
        None | Some(JsonValue::Null) => Ok(&[][..]),
        Some(JsonValue::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(RequestError::invalid_field(node_type, field, "an array")),
    }
}

/// Returns the required unsigned integer field `field`.
pub fn count(map: &Object, node_type: &str, field: &str) -> Result<u32, RequestError> {
    required(map, node_type, field)?
        .as_u64()
        .and_then(|count| u32::try_from(count).ok())
        .ok_or_else(|| RequestError::invalid_field(node_type, field, "a non-negative integer"))
}

/// Deserializes a leaf record (value, entity, treatment, ...) found in `field`.
pub fn record<T: DeserializeOwned>(
    node: &JsonValue,
    node_type: &str,
    field: &str,
) -> Result<T, RequestError> {
    T::deserialize(node).map_err(|err| {
        RequestError::Serde(
            ErrorInfo::new("decode-record", err.to_string())
                .with_context("node_type", node_type)
                .with_context("field", field),
        )
    })
}
