#![deny(missing_docs)]
#![doc = "Design block algebra, symbol tables and the JSON codec that resolves references by name."]

mod block;
pub mod decode;
pub mod encode;
pub mod fields;
mod symbols;
pub mod tags;
pub mod transform;

pub use block::{
    BlockDefinition, BlockReference, DesignBlock, GenerateBlock, ProductBlock, ReplicateBlock,
    SubjectReference, SumBlock, TreatmentReference, TupleBlock,
};
pub use decode::{
    decode, decode_design_sequence, from_json_str, parse_document, BlockDefinitionDecoder,
    Decoded, DesignBlockDecoder, DesignNode,
};
pub use encode::{encode, to_json_string, to_json_string_pretty};
pub use symbols::{SymbolTable, SymbolUsage};
pub use transform::{normalize, BlockFolder, Normalizer};
