//! Symbol-table-driven decoding of design blocks.
//!
//! Decoding is a single pass over an already parsed JSON tree. A top-level
//! call that meets a node it does not recognize hands the node back untouched
//! as [`Decoded::PassThrough`]; inside a recognized node every child position
//! is strict and must decode to the typed node it requires.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

use cpr_core::{CodecConfig, RequestError};

use crate::block::{
    BlockDefinition, BlockReference, DesignBlock, GenerateBlock, ProductBlock, ReplicateBlock,
    SubjectReference, SumBlock, TreatmentReference, TupleBlock,
};
use crate::fields::{self, Object};
use crate::symbols::SymbolTable;
use crate::tags;

/// Result of a top-level decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// The node was recognized and decoded.
    Typed(T),
    /// The node was not recognized and is returned as-is.
    PassThrough(JsonValue),
}

impl<T> Decoded<T> {
    /// Returns `true` for [`Decoded::Typed`].
    pub fn is_typed(&self) -> bool {
        matches!(self, Decoded::Typed(_))
    }

    /// Returns the typed node, discarding a pass-through.
    pub fn typed(self) -> Option<T> {
        match self {
            Decoded::Typed(node) => Some(node),
            Decoded::PassThrough(_) => None,
        }
    }

    /// Maps the typed node.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Decoded::Typed(node) => Decoded::Typed(f(node)),
            Decoded::PassThrough(raw) => Decoded::PassThrough(raw),
        }
    }

    /// Returns the typed node or fails with [`RequestError::UnexpectedNode`].
    pub fn require(self, expected: &str) -> Result<T, RequestError> {
        match self {
            Decoded::Typed(node) => Ok(node),
            Decoded::PassThrough(raw) => {
                Err(RequestError::unexpected(expected, fields::describe(&raw)))
            }
        }
    }
}

/// Decodes block definitions against a symbol table.
#[derive(Debug, Clone)]
pub struct BlockDefinitionDecoder<'a> {
    symbols: &'a SymbolTable,
    config: CodecConfig,
}

impl<'a> BlockDefinitionDecoder<'a> {
    /// Creates a decoder with default settings.
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self::with_config(symbols, CodecConfig::default())
    }

    /// Creates a decoder with explicit settings.
    pub fn with_config(symbols: &'a SymbolTable, config: CodecConfig) -> Self {
        Self { symbols, config }
    }

    /// Returns the symbol table names are resolved against.
    pub fn symbols(&self) -> &'a SymbolTable {
        self.symbols
    }

    /// Returns the active settings.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decodes `node` if it carries a known `block_type`, otherwise passes it through.
    pub fn convert(&self, node: &JsonValue) -> Result<Decoded<BlockDefinition>, RequestError> {
        self.convert_at(node, 0)
    }

    /// Decodes `node`, rejecting anything that is not a block definition.
    pub fn decode(&self, node: &JsonValue) -> Result<BlockDefinition, RequestError> {
        self.convert(node)?.require("block definition")
    }

    /// Decodes `node`, rejecting anything other than a block reference.
    pub fn decode_block_reference(&self, node: &JsonValue) -> Result<BlockReference, RequestError> {
        match self.decode(node)? {
            BlockDefinition::BlockReference(reference) => Ok(reference),
            other => Err(RequestError::unexpected(
                tags::BLOCK_REFERENCE,
                format!("`{}`", other.block_type()),
            )),
        }
    }

    /// Decodes `node`, rejecting anything other than a plain or valued treatment reference.
    pub fn decode_treatment_reference(
        &self,
        node: &JsonValue,
    ) -> Result<TreatmentReference, RequestError> {
        match self.decode(node)? {
            BlockDefinition::TreatmentReference(reference) => Ok(reference),
            other => Err(RequestError::unexpected(
                tags::TREATMENT_REFERENCE,
                format!("`{}`", other.block_type()),
            )),
        }
    }

    fn convert_at(
        &self,
        node: &JsonValue,
        depth: usize,
    ) -> Result<Decoded<BlockDefinition>, RequestError> {
        self.config.check_depth(depth)?;
        let Some(map) = node.as_object() else {
            return self.pass_through(node);
        };
        let Some(tag) = map.get(tags::BLOCK_TYPE).and_then(JsonValue::as_str) else {
            return self.pass_through(node);
        };
        trace!(block_type = tag, depth, "decoding block definition");

        let block: BlockDefinition = match tag {
            tags::BLOCK_REFERENCE => self.block_reference(map)?.into(),
            tags::SUBJECT_REFERENCE => self.subject_reference(map)?.into(),
            tags::TREATMENT_REFERENCE | tags::VALUE_TREATMENT_REFERENCE => {
                self.treatment_reference(map, tag)?.into()
            }
            tags::GENERATE_BLOCK => self.generate_block(map, depth)?.into(),
            tags::PRODUCT_BLOCK => ProductBlock::new(self.block_list(map, tag, depth)?).into(),
            tags::SUM_BLOCK => SumBlock::new(self.block_list(map, tag, depth)?).into(),
            tags::TUPLE_BLOCK => TupleBlock::new(self.block_list(map, tag, depth)?).into(),
            tags::REPLICATE_BLOCK => self.replicate_block(map, depth)?.into(),
            _ => return self.pass_through(node),
        };
        Ok(Decoded::Typed(block))
    }

    fn pass_through(&self, node: &JsonValue) -> Result<Decoded<BlockDefinition>, RequestError> {
        pass_through(&self.config, node, "block definition")
    }

    fn child(&self, node: &JsonValue, depth: usize) -> Result<BlockDefinition, RequestError> {
        match self.convert_at(node, depth + 1)? {
            Decoded::Typed(block) => Ok(block),
            Decoded::PassThrough(raw) => Err(RequestError::unexpected(
                "block definition",
                fields::describe(&raw),
            )),
        }
    }

    fn block_reference(&self, map: &Object) -> Result<BlockReference, RequestError> {
        let label = fields::string(map, tags::BLOCK_REFERENCE, "reference")?;
        Ok(BlockReference::new(self.symbols.design(label)?))
    }

    fn subject_reference(&self, map: &Object) -> Result<SubjectReference, RequestError> {
        let name = fields::string(map, tags::SUBJECT_REFERENCE, "reference")?;
        Ok(SubjectReference::new(self.symbols.entity(name)?.clone()))
    }

    fn treatment_reference(
        &self,
        map: &Object,
        tag: &str,
    ) -> Result<TreatmentReference, RequestError> {
        let name = fields::string(map, tag, "reference")?;
        let treatment = self.symbols.treatment(name)?.clone();
        let value = if tag == tags::VALUE_TREATMENT_REFERENCE {
            let node = fields::required(map, tag, "value")?;
            Some(fields::record(node, tag, "value")?)
        } else {
            None
        };
        Ok(TreatmentReference::create_from(treatment, value))
    }

    fn generate_block(&self, map: &Object, depth: usize) -> Result<GenerateBlock, RequestError> {
        let node = fields::required(map, tags::GENERATE_BLOCK, "treatment")?;
        let treatment = match self.child(node, depth)? {
            BlockDefinition::TreatmentReference(TreatmentReference::Plain { treatment }) => {
                treatment
            }
            other => {
                return Err(RequestError::unexpected(
                    tags::TREATMENT_REFERENCE,
                    format!("`{}`", other.block_type()),
                ))
            }
        };
        let values = fields::array(map, tags::GENERATE_BLOCK, "values")?
            .iter()
            .map(|value| fields::record(value, tags::GENERATE_BLOCK, "values"))
            .collect::<Result<Vec<_>, _>>()?;
        let block = GenerateBlock::new(treatment, values);
        Ok(
            match fields::optional_string(map, tags::GENERATE_BLOCK, "attribute_name")? {
                Some(attribute_name) => block.with_attribute_name(attribute_name),
                None => block,
            },
        )
    }

    fn block_list(
        &self,
        map: &Object,
        tag: &str,
        depth: usize,
    ) -> Result<Vec<BlockDefinition>, RequestError> {
        fields::array(map, tag, "block_list")?
            .iter()
            .map(|node| self.child(node, depth))
            .collect()
    }

    fn replicate_block(&self, map: &Object, depth: usize) -> Result<ReplicateBlock, RequestError> {
        let count = fields::count(map, tags::REPLICATE_BLOCK, "count")?;
        let node = fields::required(map, tags::REPLICATE_BLOCK, "block")?;
        Ok(ReplicateBlock::new(count, self.child(node, depth)?))
    }
}

/// Decodes labeled design blocks against a symbol table.
#[derive(Debug, Clone)]
pub struct DesignBlockDecoder<'a> {
    blocks: BlockDefinitionDecoder<'a>,
}

impl<'a> DesignBlockDecoder<'a> {
    /// Creates a decoder with default settings.
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self::with_config(symbols, CodecConfig::default())
    }

    /// Creates a decoder with explicit settings.
    pub fn with_config(symbols: &'a SymbolTable, config: CodecConfig) -> Self {
        Self {
            blocks: BlockDefinitionDecoder::with_config(symbols, config),
        }
    }

    /// Decodes `node` if its `object_type` is `design_block`, otherwise passes it through.
    pub fn convert(&self, node: &JsonValue) -> Result<Decoded<DesignBlock>, RequestError> {
        let map = match node.as_object() {
            Some(map) if fields::tag_of(node, tags::OBJECT_TYPE) == Some(tags::DESIGN_BLOCK) => map,
            _ => return pass_through(self.blocks.config(), node, tags::DESIGN_BLOCK),
        };
        let label = fields::string(map, tags::DESIGN_BLOCK, "label")?;
        let definition = fields::required(map, tags::DESIGN_BLOCK, "definition")?;
        let definition = self.blocks.child(definition, 0)?;
        Ok(Decoded::Typed(DesignBlock::new(label, definition)))
    }

    /// Decodes `node`, rejecting anything that is not a design block.
    pub fn decode(&self, node: &JsonValue) -> Result<DesignBlock, RequestError> {
        self.convert(node)?.require(tags::DESIGN_BLOCK)
    }
}

fn pass_through<T>(
    config: &CodecConfig,
    node: &JsonValue,
    expected: &str,
) -> Result<Decoded<T>, RequestError> {
    let found = fields::describe(node);
    if !config.allow_foreign_nodes {
        return Err(RequestError::unexpected(expected, found));
    }
    debug!(%found, "passing through unrecognized node");
    Ok(Decoded::PassThrough(node.clone()))
}

/// Either kind of node the design codec produces.
#[derive(Debug, Clone, PartialEq)]
pub enum DesignNode {
    /// An unlabeled block definition.
    Definition(BlockDefinition),
    /// A labeled design block.
    Design(DesignBlock),
}

impl Serialize for DesignNode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DesignNode::Definition(definition) => definition.serialize(serializer),
            DesignNode::Design(design) => design.serialize(serializer),
        }
    }
}

/// Decodes a design block or block definition with default settings.
pub fn decode(node: &JsonValue, symbols: &SymbolTable) -> Result<Decoded<DesignNode>, RequestError> {
    decode_with_config(node, symbols, &CodecConfig::default())
}

/// Decodes a design block or block definition.
pub fn decode_with_config(
    node: &JsonValue,
    symbols: &SymbolTable,
    config: &CodecConfig,
) -> Result<Decoded<DesignNode>, RequestError> {
    if fields::tag_of(node, tags::OBJECT_TYPE) == Some(tags::DESIGN_BLOCK) {
        return Ok(DesignBlockDecoder::with_config(symbols, config.clone())
            .convert(node)?
            .map(DesignNode::Design));
    }
    Ok(BlockDefinitionDecoder::with_config(symbols, config.clone())
        .convert(node)?
        .map(DesignNode::Definition))
}

/// Parses and decodes a JSON document holding a single design node.
pub fn from_json_str(json: &str, symbols: &SymbolTable) -> Result<Decoded<DesignNode>, RequestError> {
    let config = CodecConfig::default();
    let node = parse_document(json, &config)?;
    decode_with_config(&node, symbols, &config)
}

/// JSON levels one block level may occupy: the node object and its `block_list`.
const LEVELS_PER_BLOCK: usize = 2;
/// JSON levels around and below the block tree (request, record lists, values, units).
const ENVELOPE_LEVELS: usize = 16;

/// Parses JSON text with nesting bounded by `config.max_depth` rather than
/// the parser's fixed recursion limit.
///
/// Text nested deeper than any document within `max_depth` could be is
/// rejected with [`RequestError::DepthExceeded`] before it is parsed.
pub fn parse_document(json: &str, config: &CodecConfig) -> Result<JsonValue, RequestError> {
    let limit = config
        .max_depth
        .saturating_mul(LEVELS_PER_BLOCK)
        .saturating_add(ENVELOPE_LEVELS);
    if nesting_depth(json) > limit {
        return Err(RequestError::DepthExceeded {
            limit: config.max_depth,
        });
    }
    let mut deserializer = serde_json::Deserializer::from_str(json);
    deserializer.disable_recursion_limit();
    let node = JsonValue::deserialize(&mut deserializer)
        .map_err(|err| RequestError::serde("decode-json", err))?;
    deserializer
        .end()
        .map_err(|err| RequestError::serde("decode-json", err))?;
    Ok(node)
}

/// Deepest bracket nesting of `json`, ignoring brackets inside strings.
fn nesting_depth(json: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for byte in json.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Decodes design blocks in order, registering each one in `symbols` before
/// the next is decoded. A design may therefore refer to any earlier design,
/// but not to itself or to a later one.
pub fn decode_design_sequence(
    nodes: &[JsonValue],
    symbols: &mut SymbolTable,
    config: &CodecConfig,
) -> Result<Vec<Arc<DesignBlock>>, RequestError> {
    let mut designs = Vec::with_capacity(nodes.len());
    for node in nodes {
        let design = DesignBlockDecoder::with_config(symbols, config.clone()).decode(node)?;
        let design = symbols.insert_design(design)?;
        debug!(label = design.label(), "registered design block");
        designs.push(design);
    }
    Ok(designs)
}
