use std::fmt;
use std::sync::Arc;

use cpr_core::{NamedEntity, Treatment, Value};

use crate::symbols::SymbolUsage;
use crate::tags;

/// A labeled block definition. Labels are the keys used by
/// [`BlockReference`] and by the design namespace of a symbol table.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignBlock {
    label: String,
    definition: BlockDefinition,
}

impl DesignBlock {
    /// Creates a design block.
    pub fn new(label: impl Into<String>, definition: impl Into<BlockDefinition>) -> Self {
        Self {
            label: label.into(),
            definition: definition.into(),
        }
    }

    /// Returns the label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the definition.
    pub fn definition(&self) -> &BlockDefinition {
        &self.definition
    }
}

/// Pointer to another design block.
///
/// The referenced block is shared, never owned, so trees built from immutable
/// parts cannot form ownership cycles. Equality, `Debug` and encoding only look
/// at the label and never descend into the referenced definition.
#[derive(Clone)]
pub struct BlockReference {
    block: Arc<DesignBlock>,
}

impl BlockReference {
    /// Creates a reference to a shared design block.
    pub fn new(block: Arc<DesignBlock>) -> Self {
        Self { block }
    }

    /// Returns the label of the referenced block.
    pub fn label(&self) -> &str {
        self.block.label()
    }

    /// Returns the referenced block.
    pub fn block(&self) -> &Arc<DesignBlock> {
        &self.block
    }
}

impl PartialEq for BlockReference {
    fn eq(&self, other: &Self) -> bool {
        self.label() == other.label()
    }
}

impl fmt::Debug for BlockReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockReference")
            .field("label", &self.label())
            .finish()
    }
}

impl From<Arc<DesignBlock>> for BlockReference {
    fn from(block: Arc<DesignBlock>) -> Self {
        Self::new(block)
    }
}

impl From<DesignBlock> for BlockReference {
    fn from(block: DesignBlock) -> Self {
        Self::new(Arc::new(block))
    }
}

/// A block consisting of a single entity.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectReference {
    entity: NamedEntity,
}

impl SubjectReference {
    /// Creates a subject block.
    pub fn new(entity: NamedEntity) -> Self {
        Self { entity }
    }

    /// Returns the referenced entity.
    pub fn entity(&self) -> &NamedEntity {
        &self.entity
    }
}

/// Reference to a treatment, optionally pinned to a concrete value.
///
/// The two forms are distinct variants: a plain reference never equals a
/// valued reference, even when both wrap the same treatment.
#[derive(Debug, Clone, PartialEq)]
pub enum TreatmentReference {
    /// Reference to the treatment as a whole.
    Plain {
        /// Referenced treatment.
        treatment: Treatment,
    },
    /// Reference to the treatment with an assigned value.
    Valued {
        /// Referenced treatment.
        treatment: Treatment,
        /// Value assigned to the treatment.
        value: Value,
    },
}

impl TreatmentReference {
    /// Canonical constructor: selects [`TreatmentReference::Valued`] when a
    /// value is supplied and [`TreatmentReference::Plain`] otherwise.
    pub fn create_from(treatment: Treatment, value: Option<Value>) -> Self {
        match value {
            Some(value) => TreatmentReference::Valued { treatment, value },
            None => TreatmentReference::Plain { treatment },
        }
    }

    /// Returns the referenced treatment.
    pub fn treatment(&self) -> &Treatment {
        match self {
            TreatmentReference::Plain { treatment } | TreatmentReference::Valued { treatment, .. } => {
                treatment
            }
        }
    }

    /// Returns the name of the referenced treatment.
    pub fn treatment_name(&self) -> &str {
        self.treatment().name()
    }

    /// Returns the pinned value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            TreatmentReference::Plain { .. } => None,
            TreatmentReference::Valued { value, .. } => Some(value),
        }
    }

    /// Returns the wire discriminator of this form.
    pub fn block_type(&self) -> &'static str {
        match self {
            TreatmentReference::Plain { .. } => tags::TREATMENT_REFERENCE,
            TreatmentReference::Valued { .. } => tags::VALUE_TREATMENT_REFERENCE,
        }
    }
}

/// Shorthand for a sum over each value assigned to a treatment.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateBlock {
    treatment: Treatment,
    attribute_name: Option<String>,
    values: Vec<Value>,
}

impl GenerateBlock {
    /// Creates a generate block over `values` in the given order.
    pub fn new(treatment: Treatment, values: Vec<Value>) -> Self {
        Self {
            treatment,
            attribute_name: None,
            values,
        }
    }

    /// Names the attribute of the treatment that receives the values.
    pub fn with_attribute_name(mut self, attribute_name: impl Into<String>) -> Self {
        self.attribute_name = Some(attribute_name.into());
        self
    }

    /// Returns the treatment.
    pub fn treatment(&self) -> &Treatment {
        &self.treatment
    }

    /// Returns the targeted attribute name, if one was given.
    pub fn attribute_name(&self) -> Option<&str> {
        self.attribute_name.as_deref()
    }

    /// Returns the values in order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Builds the equivalent explicit sum of value-pinned treatment references.
    pub fn to_sum_block(&self) -> SumBlock {
        SumBlock::new(
            self.values
                .iter()
                .map(|value| {
                    TreatmentReference::create_from(self.treatment.clone(), Some(value.clone()))
                        .into()
                })
                .collect(),
        )
    }
}

/// Cartesian combination: every combination of the sub-blocks co-occurs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductBlock {
    block_list: Vec<BlockDefinition>,
}

impl ProductBlock {
    /// Creates a product over `block_list`.
    pub fn new(block_list: Vec<BlockDefinition>) -> Self {
        Self { block_list }
    }

    /// Returns the sub-blocks in order.
    pub fn block_list(&self) -> &[BlockDefinition] {
        &self.block_list
    }
}

/// Disjoint union: each sub-block is an alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct SumBlock {
    block_list: Vec<BlockDefinition>,
}

impl SumBlock {
    /// Creates a sum over `block_list`.
    pub fn new(block_list: Vec<BlockDefinition>) -> Self {
        Self { block_list }
    }

    /// Returns the sub-blocks in order.
    pub fn block_list(&self) -> &[BlockDefinition] {
        &self.block_list
    }
}

/// Fixed-order group of sub-blocks that always occur together as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleBlock {
    block_list: Vec<BlockDefinition>,
}

impl TupleBlock {
    /// Creates a tuple over `block_list`.
    pub fn new(block_list: Vec<BlockDefinition>) -> Self {
        Self { block_list }
    }

    /// Returns the sub-blocks in order.
    pub fn block_list(&self) -> &[BlockDefinition] {
        &self.block_list
    }
}

/// Repeats a block definition as independent replicates.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicateBlock {
    count: u32,
    block: Box<BlockDefinition>,
}

impl ReplicateBlock {
    /// Creates a replicate block.
    pub fn new(count: u32, block: impl Into<BlockDefinition>) -> Self {
        Self {
            count,
            block: Box::new(block.into()),
        }
    }

    /// Returns the number of replicates.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Returns the replicated definition.
    pub fn block(&self) -> &BlockDefinition {
        &self.block
    }
}

/// Node of the design-block expression tree.
///
/// Equality is variant-tagged and then structural; list fields compare
/// element-wise in order.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockDefinition {
    /// See [`BlockReference`].
    BlockReference(BlockReference),
    /// See [`SubjectReference`].
    SubjectReference(SubjectReference),
    /// See [`TreatmentReference`].
    TreatmentReference(TreatmentReference),
    /// See [`GenerateBlock`].
    Generate(GenerateBlock),
    /// See [`ProductBlock`].
    Product(ProductBlock),
    /// See [`SumBlock`].
    Sum(SumBlock),
    /// See [`TupleBlock`].
    Tuple(TupleBlock),
    /// See [`ReplicateBlock`].
    Replicate(ReplicateBlock),
}

impl BlockDefinition {
    /// Returns the wire discriminator of the node.
    pub fn block_type(&self) -> &'static str {
        match self {
            BlockDefinition::BlockReference(_) => tags::BLOCK_REFERENCE,
            BlockDefinition::SubjectReference(_) => tags::SUBJECT_REFERENCE,
            BlockDefinition::TreatmentReference(reference) => reference.block_type(),
            BlockDefinition::Generate(_) => tags::GENERATE_BLOCK,
            BlockDefinition::Product(_) => tags::PRODUCT_BLOCK,
            BlockDefinition::Sum(_) => tags::SUM_BLOCK,
            BlockDefinition::Tuple(_) => tags::TUPLE_BLOCK,
            BlockDefinition::Replicate(_) => tags::REPLICATE_BLOCK,
        }
    }

    /// Returns the direct sub-blocks held in place by this node.
    pub fn children(&self) -> &[BlockDefinition] {
        match self {
            BlockDefinition::Product(block) => block.block_list(),
            BlockDefinition::Sum(block) => block.block_list(),
            BlockDefinition::Tuple(block) => block.block_list(),
            BlockDefinition::Replicate(block) => std::slice::from_ref(block.block()),
            BlockDefinition::BlockReference(_)
            | BlockDefinition::SubjectReference(_)
            | BlockDefinition::TreatmentReference(_)
            | BlockDefinition::Generate(_) => &[],
        }
    }

    /// Visits this node and every node held in place below it, pre-order.
    /// Referenced design blocks are not entered.
    pub fn walk<F: FnMut(&BlockDefinition)>(&self, visit: &mut F) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Collects the names this tree refers to, per namespace.
    pub fn references(&self) -> SymbolUsage {
        let mut usage = SymbolUsage::default();
        self.walk(&mut |node| usage.record(node));
        usage
    }
}

impl From<BlockReference> for BlockDefinition {
    fn from(reference: BlockReference) -> Self {
        BlockDefinition::BlockReference(reference)
    }
}

impl From<SubjectReference> for BlockDefinition {
    fn from(reference: SubjectReference) -> Self {
        BlockDefinition::SubjectReference(reference)
    }
}

impl From<TreatmentReference> for BlockDefinition {
    fn from(reference: TreatmentReference) -> Self {
        BlockDefinition::TreatmentReference(reference)
    }
}

impl From<GenerateBlock> for BlockDefinition {
    fn from(block: GenerateBlock) -> Self {
        BlockDefinition::Generate(block)
    }
}

impl From<ProductBlock> for BlockDefinition {
    fn from(block: ProductBlock) -> Self {
        BlockDefinition::Product(block)
    }
}

impl From<SumBlock> for BlockDefinition {
    fn from(block: SumBlock) -> Self {
        BlockDefinition::Sum(block)
    }
}

impl From<TupleBlock> for BlockDefinition {
    fn from(block: TupleBlock) -> Self {
        BlockDefinition::Tuple(block)
    }
}

impl From<ReplicateBlock> for BlockDefinition {
    fn from(block: ReplicateBlock) -> Self {
        BlockDefinition::Replicate(block)
    }
}
