use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::entity::NamedEntity;
use crate::errors::{ErrorInfo, RequestError};

/// Named experimental factor.
///
/// Attribute treatments describe conditions such as temperature or time
/// points; entity treatments describe reagents such as an inducer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "treatment_type")]
pub enum Treatment {
    /// Treatment defined by an attribute.
    #[serde(rename = "attribute_treatment")]
    Attribute {
        /// Defining attribute; its name is the treatment name.
        attribute: Attribute,
    },
    /// Treatment defined by an entity.
    #[serde(rename = "entity_treatment")]
    Entity {
        /// Defining entity; its name is the treatment name.
        entity: NamedEntity,
    },
}

impl Treatment {
    /// Builds a treatment from whichever argument is supplied, preferring the
    /// attribute.
    pub fn create_from(
        attribute: Option<Attribute>,
        entity: Option<NamedEntity>,
    ) -> Result<Self, RequestError> {
        match (attribute, entity) {
            (Some(attribute), _) => Ok(Treatment::from_attribute(attribute)),
            (None, Some(entity)) => Ok(Treatment::from_entity(entity)),
            (None, None) => Err(RequestError::CannotCreateTreatment(ErrorInfo::new(
                "treatment-arguments",
                "no valid combination of arguments provided",
            ))),
        }
    }

    /// Creates an attribute treatment.
    pub fn from_attribute(attribute: Attribute) -> Self {
        Treatment::Attribute { attribute }
    }

    /// Creates an entity treatment.
    pub fn from_entity(entity: NamedEntity) -> Self {
        Treatment::Entity { entity }
    }

    /// Returns the treatment name.
    pub fn name(&self) -> &str {
        match self {
            Treatment::Attribute { attribute } => attribute.name(),
            Treatment::Entity { entity } => entity.name(),
        }
    }

    /// Indicates whether every attribute of the treatment is bound.
    pub fn is_bound(&self) -> bool {
        match self {
            Treatment::Attribute { attribute } => attribute.is_bound(),
            Treatment::Entity { entity } => entity.is_bound(),
        }
    }
}
