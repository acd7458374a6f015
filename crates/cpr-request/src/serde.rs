//! Canonical JSON used for hashing.

use std::collections::BTreeMap;
use std::iter::FromIterator;

use cpr_core::{ErrorInfo, RequestError};
use serde::Serialize;
use serde_json::{Map, Number, Value};

fn serde_error(code: &str, err: impl ToString) -> RequestError {
    RequestError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        Value::Number(number) => Value::Number(canonical_number(number)),
        other => other,
    }
}

/// Integral reals such as `25.0` hash like the integer `25`, matching
/// magnitude equality.
fn canonical_number(number: Number) -> Number {
    match number.as_f64() {
        Some(real)
            if number.is_f64()
                && real.fract() == 0.0
                && real >= i64::MIN as f64
                && real < i64::MAX as f64 =>
        {
            Number::from(real as i64)
        }
        _ => number,
    }
}

/// Serializes a value into JSON bytes with object keys in sorted order.
pub fn to_canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, RequestError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json-encode", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical).map_err(|err| serde_error("json-write", err))?;
    Ok(bytes)
}
