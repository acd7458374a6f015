//! Discriminator keys and values of the JSON wire format.
//!
//! Block definitions are tagged under `block_type`; design blocks and the
//! request-level records are tagged under `object_type`.

/// Discriminator key carried by every block definition.
pub const BLOCK_TYPE: &str = "block_type";
/// Discriminator key carried by design blocks and request records.
pub const OBJECT_TYPE: &str = "object_type";

/// `block_type` of a reference to a labeled design block.
pub const BLOCK_REFERENCE: &str = "block_reference";
/// `block_type` of a single-entity block.
pub const SUBJECT_REFERENCE: &str = "subject_reference";
/// `block_type` of a reference to a treatment.
pub const TREATMENT_REFERENCE: &str = "treatment_reference";
/// `block_type` of a reference to a treatment pinned to a value.
pub const VALUE_TREATMENT_REFERENCE: &str = "value_treatment_reference";
/// `block_type` of a generate block.
pub const GENERATE_BLOCK: &str = "generate_block";
/// `block_type` of a product block.
pub const PRODUCT_BLOCK: &str = "product_block";
/// `block_type` of a sum block.
pub const SUM_BLOCK: &str = "sum_block";
/// `block_type` of a tuple block.
pub const TUPLE_BLOCK: &str = "tuple_block";
/// `block_type` of a replicate block.
pub const REPLICATE_BLOCK: &str = "replicate_block";
/// `object_type` of a labeled design block.
pub const DESIGN_BLOCK: &str = "design_block";
