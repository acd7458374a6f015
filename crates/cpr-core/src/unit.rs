use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Unit of measurement identified by an ontology URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "UnitRecord", into = "UnitRecord")]
pub struct Unit {
    reference: String,
}

impl Unit {
    /// Creates a unit from its URI reference.
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }

    /// Returns the URI reference of the unit.
    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "object_type", rename_all = "snake_case")]
enum UnitRecord {
    Unit { reference: String },
}

impl From<UnitRecord> for Unit {
    fn from(record: UnitRecord) -> Self {
        let UnitRecord::Unit { reference } = record;
        Unit { reference }
    }
}

impl From<Unit> for UnitRecord {
    fn from(unit: Unit) -> Self {
        UnitRecord::Unit {
            reference: unit.reference,
        }
    }
}
