use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::unit::Unit;

/// Numeric magnitude that remembers whether it was written as an integer.
///
/// Equality is numeric, so `Integer(0)` equals `Real(0.0)`, but each form
/// re-encodes the way it was read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Magnitude {
    /// Integral magnitude such as `25`.
    Integer(i64),
    /// Real magnitude such as `0.25`.
    Real(f64),
}

impl Magnitude {
    /// Returns the magnitude as a floating point number.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Magnitude::Integer(value) => value as f64,
            Magnitude::Real(value) => value,
        }
    }
}

impl PartialEq for Magnitude {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Magnitude::Integer(a), Magnitude::Integer(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl From<i64> for Magnitude {
    fn from(value: i64) -> Self {
        Magnitude::Integer(value)
    }
}

impl From<i32> for Magnitude {
    fn from(value: i32) -> Self {
        Magnitude::Integer(value.into())
    }
}

impl From<u32> for Magnitude {
    fn from(value: u32) -> Self {
        Magnitude::Integer(value.into())
    }
}

impl From<f64> for Magnitude {
    fn from(value: f64) -> Self {
        Magnitude::Real(value)
    }
}

impl Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Magnitude::Integer(value) => write!(f, "{value}"),
            Magnitude::Real(value) => write!(f, "{value}"),
        }
    }
}

/// A magnitude paired with its unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ValueRecord", into = "ValueRecord")]
pub struct Value {
    value: Magnitude,
    unit: Unit,
}

impl Value {
    /// Creates a value from a magnitude and unit.
    pub fn new(value: impl Into<Magnitude>, unit: Unit) -> Self {
        Self {
            value: value.into(),
            unit,
        }
    }

    /// Returns the magnitude.
    pub fn value(&self) -> Magnitude {
        self.value
    }

    /// Returns the unit.
    pub fn unit(&self) -> &Unit {
        &self.unit
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "object_type", rename_all = "snake_case")]
enum ValueRecord {
    Value { value: Magnitude, unit: Unit },
}

impl From<ValueRecord> for Value {
    fn from(record: ValueRecord) -> Self {
        let ValueRecord::Value { value, unit } = record;
        Value { value, unit }
    }
}

impl From<Value> for ValueRecord {
    fn from(value: Value) -> Self {
        ValueRecord::Value {
            value: value.value,
            unit: value.unit,
        }
    }
}
