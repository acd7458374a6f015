use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, RequestError};
use crate::unit::Unit;
use crate::value::Value;

/// Named property of an entity or treatment.
///
/// A bound attribute carries a concrete [`Value`]; an unbound attribute only
/// declares the [`Unit`] of a slot to be filled later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attribute_type")]
pub enum Attribute {
    /// Attribute fixed to a concrete value.
    #[serde(rename = "bound_attribute")]
    Bound {
        /// Attribute name.
        name: String,
        /// Assigned value.
        value: Value,
    },
    /// Attribute slot described only by its unit.
    #[serde(rename = "unbound_attribute")]
    Unbound {
        /// Attribute name.
        name: String,
        /// Unit of the eventual value.
        unit: Unit,
    },
}

impl Attribute {
    /// Builds an attribute from the supplied arguments.
    ///
    /// A unit selects [`Attribute::Unbound`] and takes precedence over a value,
    /// a value alone selects [`Attribute::Bound`]. An empty name or the absence
    /// of both is rejected.
    pub fn create_from(
        name: &str,
        unit: Option<Unit>,
        value: Option<Value>,
    ) -> Result<Self, RequestError> {
        if name.is_empty() {
            return Err(RequestError::CannotCreateAttribute(ErrorInfo::new(
                "attribute-name",
                "name must be provided to create an attribute",
            )));
        }
        match (unit, value) {
            (Some(unit), _) => Ok(Attribute::unbound(name, unit)),
            (None, Some(value)) => Ok(Attribute::bound(name, value)),
            (None, None) => Err(RequestError::CannotCreateAttribute(
                ErrorInfo::new(
                    "attribute-arguments",
                    "either a unit or a value must be provided",
                )
                .with_context("name", name),
            )),
        }
    }

    /// Creates an attribute bound to `value`.
    pub fn bound(name: impl Into<String>, value: Value) -> Self {
        Attribute::Bound {
            name: name.into(),
            value,
        }
    }

    /// Creates an unbound attribute slot measured in `unit`.
    pub fn unbound(name: impl Into<String>, unit: Unit) -> Self {
        Attribute::Unbound {
            name: name.into(),
            unit,
        }
    }

    /// Returns the attribute name.
    pub fn name(&self) -> &str {
        match self {
            Attribute::Bound { name, .. } | Attribute::Unbound { name, .. } => name,
        }
    }

    /// Indicates whether the attribute is bound to a value.
    pub fn is_bound(&self) -> bool {
        matches!(self, Attribute::Bound { .. })
    }

    /// Returns the bound value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Attribute::Bound { value, .. } => Some(value),
            Attribute::Unbound { .. } => None,
        }
    }

    /// Returns the unit of the attribute, taken from the value when bound.
    pub fn unit(&self) -> &Unit {
        match self {
            Attribute::Bound { value, .. } => value.unit(),
            Attribute::Unbound { unit, .. } => unit,
        }
    }
}
