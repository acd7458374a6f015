//! JSON encoding of design blocks.
//!
//! Every node is written as an object whose first key is its discriminator.
//! References are written by name only, so encoding a reference is constant
//! size regardless of how large the referenced block is.

use cpr_core::{RequestError, Value};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::block::{
    BlockDefinition, BlockReference, DesignBlock, GenerateBlock, ProductBlock, ReplicateBlock,
    SubjectReference, SumBlock, TreatmentReference, TupleBlock,
};

/// Borrowed wire form of a block definition, tagged under `block_type`.
#[derive(Serialize)]
#[serde(tag = "block_type", rename_all = "snake_case")]
enum BlockRecord<'a> {
    BlockReference {
        reference: &'a str,
    },
    SubjectReference {
        reference: &'a str,
    },
    TreatmentReference {
        reference: &'a str,
    },
    ValueTreatmentReference {
        reference: &'a str,
        value: &'a Value,
    },
    GenerateBlock {
        treatment: Box<BlockRecord<'a>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attribute_name: Option<&'a str>,
        values: &'a [Value],
    },
    ProductBlock {
        block_list: &'a [BlockDefinition],
    },
    SumBlock {
        block_list: &'a [BlockDefinition],
    },
    TupleBlock {
        block_list: &'a [BlockDefinition],
    },
    ReplicateBlock {
        count: u32,
        block: &'a BlockDefinition,
    },
}

/// Borrowed wire form of a design block, tagged under `object_type`.
#[derive(Serialize)]
#[serde(tag = "object_type", rename_all = "snake_case")]
enum DesignRecord<'a> {
    DesignBlock {
        label: &'a str,
        definition: &'a BlockDefinition,
    },
}

impl<'a> From<&'a BlockReference> for BlockRecord<'a> {
    fn from(node: &'a BlockReference) -> Self {
        BlockRecord::BlockReference {
            reference: node.label(),
        }
    }
}

impl<'a> From<&'a SubjectReference> for BlockRecord<'a> {
    fn from(node: &'a SubjectReference) -> Self {
        BlockRecord::SubjectReference {
            reference: node.entity().name(),
        }
    }
}

impl<'a> From<&'a TreatmentReference> for BlockRecord<'a> {
    fn from(node: &'a TreatmentReference) -> Self {
        let reference = node.treatment_name();
        match node.value() {
            None => BlockRecord::TreatmentReference { reference },
            Some(value) => BlockRecord::ValueTreatmentReference { reference, value },
        }
    }
}

impl<'a> From<&'a GenerateBlock> for BlockRecord<'a> {
    fn from(node: &'a GenerateBlock) -> Self {
        BlockRecord::GenerateBlock {
            treatment: Box::new(BlockRecord::TreatmentReference {
                reference: node.treatment().name(),
            }),
            attribute_name: node.attribute_name(),
            values: node.values(),
        }
    }
}

impl<'a> From<&'a ProductBlock> for BlockRecord<'a> {
    fn from(node: &'a ProductBlock) -> Self {
        BlockRecord::ProductBlock {
            block_list: node.block_list(),
        }
    }
}

impl<'a> From<&'a SumBlock> for BlockRecord<'a> {
    fn from(node: &'a SumBlock) -> Self {
        BlockRecord::SumBlock {
            block_list: node.block_list(),
        }
    }
}

impl<'a> From<&'a TupleBlock> for BlockRecord<'a> {
    fn from(node: &'a TupleBlock) -> Self {
        BlockRecord::TupleBlock {
            block_list: node.block_list(),
        }
    }
}

impl<'a> From<&'a ReplicateBlock> for BlockRecord<'a> {
    fn from(node: &'a ReplicateBlock) -> Self {
        BlockRecord::ReplicateBlock {
            count: node.count(),
            block: node.block(),
        }
    }
}

impl<'a> From<&'a BlockDefinition> for BlockRecord<'a> {
    fn from(node: &'a BlockDefinition) -> Self {
        match node {
            BlockDefinition::BlockReference(node) => node.into(),
            BlockDefinition::SubjectReference(node) => node.into(),
            BlockDefinition::TreatmentReference(node) => node.into(),
            BlockDefinition::Generate(node) => node.into(),
            BlockDefinition::Product(node) => node.into(),
            BlockDefinition::Sum(node) => node.into(),
            BlockDefinition::Tuple(node) => node.into(),
            BlockDefinition::Replicate(node) => node.into(),
        }
    }
}

macro_rules! serialize_as_record {
    ($($node:ty),* $(,)?) => {
        $(
            impl Serialize for $node {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    BlockRecord::from(self).serialize(serializer)
                }
            }
        )*
    };
}

serialize_as_record!(
    BlockReference,
    SubjectReference,
    TreatmentReference,
    GenerateBlock,
    ProductBlock,
    SumBlock,
    TupleBlock,
    ReplicateBlock,
    BlockDefinition,
);

impl Serialize for DesignBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DesignRecord::DesignBlock {
            label: self.label(),
            definition: self.definition(),
        }
        .serialize(serializer)
    }
}

/// Encodes any design node into a JSON value.
pub fn encode<T: Serialize + ?Sized>(node: &T) -> Result<JsonValue, RequestError> {
    serde_json::to_value(node).map_err(|err| RequestError::serde("encode-json", err))
}

/// Serializes a design node into a compact JSON string.
pub fn to_json_string<T: Serialize + ?Sized>(node: &T) -> Result<String, RequestError> {
    serde_json::to_string(node).map_err(|err| RequestError::serde("encode-json", err))
}

/// Serializes a design node into an indented JSON string.
pub fn to_json_string_pretty<T: Serialize + ?Sized>(node: &T) -> Result<String, RequestError> {
    serde_json::to_string_pretty(node).map_err(|err| RequestError::serde("encode-json", err))
}
