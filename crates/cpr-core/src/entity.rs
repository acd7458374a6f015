use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;

/// A biological or physical subject or reagent identified by name.
///
/// Names are unique within the entity namespace of a request and are the keys
/// used when other nodes refer to the entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EntityRecord", into = "EntityRecord")]
pub struct NamedEntity {
    name: String,
    reference: String,
    attributes: Vec<Attribute>,
}

impl NamedEntity {
    /// Creates an entity without attributes.
    pub fn new(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: reference.into(),
            attributes: Vec::new(),
        }
    }

    /// Attaches attributes describing tunable properties of the entity.
    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns the entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the external reference (usually a URI) for the entity.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns the attached attributes in declaration order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attached attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name() == name)
    }

    /// Indicates whether every attached attribute is bound to a value.
    pub fn is_bound(&self) -> bool {
        self.attributes.iter().all(Attribute::is_bound)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "object_type", rename_all = "snake_case")]
enum EntityRecord {
    NamedEntity {
        name: String,
        reference: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
}

impl From<EntityRecord> for NamedEntity {
    fn from(record: EntityRecord) -> Self {
        let EntityRecord::NamedEntity {
            name,
            reference,
            attributes,
        } = record;
        NamedEntity {
            name,
            reference,
            attributes,
        }
    }
}

impl From<NamedEntity> for EntityRecord {
    fn from(entity: NamedEntity) -> Self {
        EntityRecord::NamedEntity {
            name: entity.name,
            reference: entity.reference,
            attributes: entity.attributes,
        }
    }
}
