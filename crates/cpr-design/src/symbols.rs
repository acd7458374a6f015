//! Name resolution for the three reference namespaces.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use cpr_core::{NamedEntity, RequestError, SymbolKind, Treatment};

use crate::block::{BlockDefinition, DesignBlock, TreatmentReference};

/// Name-indexed lookup of entities, treatments and design blocks.
///
/// Each namespace is independent: an entity and a design block may share a
/// name. Within one namespace a name maps to exactly one object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    entities: BTreeMap<String, NamedEntity>,
    treatments: BTreeMap<String, Treatment>,
    designs: BTreeMap<String, Arc<DesignBlock>>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a table with entities and treatments.
    pub fn from_parts(
        entities: impl IntoIterator<Item = NamedEntity>,
        treatments: impl IntoIterator<Item = Treatment>,
    ) -> Result<Self, RequestError> {
        let mut table = Self::new();
        for entity in entities {
            table.insert_entity(entity)?;
        }
        for treatment in treatments {
            table.insert_treatment(treatment)?;
        }
        Ok(table)
    }

    /// Registers an entity under its name.
    ///
    /// Re-registering an equal entity is a no-op; a different entity with the
    /// same name is rejected.
    pub fn insert_entity(&mut self, entity: NamedEntity) -> Result<(), RequestError> {
        let name = entity.name().to_string();
        insert_unique(&mut self.entities, SymbolKind::Entity, name, entity).map(|_| ())
    }

    /// Registers a treatment under its name.
    pub fn insert_treatment(&mut self, treatment: Treatment) -> Result<(), RequestError> {
        let name = treatment.name().to_string();
        insert_unique(&mut self.treatments, SymbolKind::Treatment, name, treatment).map(|_| ())
    }

    /// Registers a design block under its label and returns the shared handle
    /// stored in the table.
    pub fn insert_design(&mut self, design: DesignBlock) -> Result<Arc<DesignBlock>, RequestError> {
        self.insert_shared_design(Arc::new(design))
    }

    /// Registers an already shared design block.
    pub fn insert_shared_design(
        &mut self,
        design: Arc<DesignBlock>,
    ) -> Result<Arc<DesignBlock>, RequestError> {
        let label = design.label().to_string();
        insert_unique(&mut self.designs, SymbolKind::Design, label, design).map(Arc::clone)
    }

    /// Looks up an entity by name.
    pub fn entity(&self, name: &str) -> Result<&NamedEntity, RequestError> {
        self.entities
            .get(name)
            .ok_or_else(|| RequestError::unresolved(SymbolKind::Entity, name))
    }

    /// Looks up a treatment by name.
    pub fn treatment(&self, name: &str) -> Result<&Treatment, RequestError> {
        self.treatments
            .get(name)
            .ok_or_else(|| RequestError::unresolved(SymbolKind::Treatment, name))
    }

    /// Looks up a design block by label.
    pub fn design(&self, label: &str) -> Result<Arc<DesignBlock>, RequestError> {
        self.designs
            .get(label)
            .cloned()
            .ok_or_else(|| RequestError::unresolved(SymbolKind::Design, label))
    }

    /// Reports whether `name` is registered in the given namespace.
    pub fn contains(&self, kind: SymbolKind, name: &str) -> bool {
        match kind {
            SymbolKind::Entity => self.entities.contains_key(name),
            SymbolKind::Treatment => self.treatments.contains_key(name),
            SymbolKind::Design => self.designs.contains_key(name),
        }
    }

    /// Returns the registered names of one namespace in sorted order.
    pub fn names(&self, kind: SymbolKind) -> Vec<&str> {
        match kind {
            SymbolKind::Entity => self.entities.keys().map(String::as_str).collect(),
            SymbolKind::Treatment => self.treatments.keys().map(String::as_str).collect(),
            SymbolKind::Design => self.designs.keys().map(String::as_str).collect(),
        }
    }

    /// Total number of registered symbols across all namespaces.
    pub fn len(&self) -> usize {
        self.entities.len() + self.treatments.len() + self.designs.len()
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verifies that every name in `usage` is registered.
    pub fn check_usage(&self, usage: &SymbolUsage) -> Result<(), RequestError> {
        let namespaces = [
            (SymbolKind::Entity, &usage.entities),
            (SymbolKind::Treatment, &usage.treatments),
            (SymbolKind::Design, &usage.designs),
        ];
        for (kind, names) in namespaces {
            if let Some(missing) = names.iter().find(|name| !self.contains(kind, name)) {
                return Err(RequestError::unresolved(kind, missing.as_str()));
            }
        }
        Ok(())
    }
}

fn insert_unique<'m, T: PartialEq>(
    map: &'m mut BTreeMap<String, T>,
    kind: SymbolKind,
    name: String,
    item: T,
) -> Result<&'m T, RequestError> {
    if let Some(existing) = map.get(&name) {
        if *existing != item {
            return Err(RequestError::DuplicateSymbol { kind, name });
        }
    }
    Ok(map.entry(name).or_insert(item))
}

/// Names a block tree refers to, grouped by namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolUsage {
    /// Labels of referenced design blocks.
    pub designs: BTreeSet<String>,
    /// Names of referenced entities.
    pub entities: BTreeSet<String>,
    /// Names of referenced treatments.
    pub treatments: BTreeSet<String>,
}

impl SymbolUsage {
    /// Records the names a single node refers to; sub-blocks are not visited.
    pub fn record(&mut self, node: &BlockDefinition) {
        match node {
            BlockDefinition::BlockReference(reference) => {
                self.designs.insert(reference.label().to_string());
            }
            BlockDefinition::SubjectReference(subject) => {
                self.entities.insert(subject.entity().name().to_string());
            }
            BlockDefinition::TreatmentReference(reference) => {
                self.record_treatment(reference);
            }
            BlockDefinition::Generate(block) => {
                self.treatments.insert(block.treatment().name().to_string());
            }
            BlockDefinition::Product(_)
            | BlockDefinition::Sum(_)
            | BlockDefinition::Tuple(_)
            | BlockDefinition::Replicate(_) => {}
        }
    }

    fn record_treatment(&mut self, reference: &TreatmentReference) {
        self.treatments.insert(reference.treatment_name().to_string());
    }

    /// Merges another usage set into this one.
    pub fn extend(&mut self, other: SymbolUsage) {
        self.designs.extend(other.designs);
        self.entities.extend(other.entities);
        self.treatments.extend(other.treatments);
    }

    /// Returns `true` when no names were recorded.
    pub fn is_empty(&self) -> bool {
        self.designs.is_empty() && self.entities.is_empty() && self.treatments.is_empty()
    }
}
