//! Structural rewrites over block definitions.

use cpr_core::{CodecConfig, RequestError};

use crate::block::{
    BlockDefinition, BlockReference, DesignBlock, GenerateBlock, ProductBlock, ReplicateBlock,
    SubjectReference, SumBlock, TreatmentReference, TupleBlock,
};

/// Rebuilds a block tree node by node.
///
/// Every hook defaults to an identity rebuild, so an implementation only
/// overrides the nodes it rewrites. Composite hooks recurse through
/// [`BlockFolder::fold_definition`].
pub trait BlockFolder {
    /// Folds a labeled design block, keeping its label.
    fn fold_design(&mut self, design: &DesignBlock) -> Result<DesignBlock, RequestError> {
        Ok(DesignBlock::new(
            design.label(),
            self.fold_definition(design.definition())?,
        ))
    }

    /// Dispatches on the node variant.
    fn fold_definition(
        &mut self,
        definition: &BlockDefinition,
    ) -> Result<BlockDefinition, RequestError> {
        walk_definition(self, definition)
    }

    /// Folds a block reference; the referenced block is left alone.
    fn fold_block_reference(
        &mut self,
        reference: &BlockReference,
    ) -> Result<BlockDefinition, RequestError> {
        Ok(reference.clone().into())
    }

    /// Folds a subject block.
    fn fold_subject_reference(
        &mut self,
        reference: &SubjectReference,
    ) -> Result<BlockDefinition, RequestError> {
        Ok(reference.clone().into())
    }

    /// Folds a plain or valued treatment reference.
    fn fold_treatment_reference(
        &mut self,
        reference: &TreatmentReference,
    ) -> Result<BlockDefinition, RequestError> {
        Ok(reference.clone().into())
    }

    /// Folds a generate block.
    fn fold_generate(&mut self, block: &GenerateBlock) -> Result<BlockDefinition, RequestError> {
        Ok(block.clone().into())
    }

    /// Folds a product block.
    fn fold_product(&mut self, block: &ProductBlock) -> Result<BlockDefinition, RequestError> {
        Ok(ProductBlock::new(self.fold_list(block.block_list())?).into())
    }

    /// Folds a sum block.
    fn fold_sum(&mut self, block: &SumBlock) -> Result<BlockDefinition, RequestError> {
        Ok(SumBlock::new(self.fold_list(block.block_list())?).into())
    }

    /// Folds a tuple block.
    fn fold_tuple(&mut self, block: &TupleBlock) -> Result<BlockDefinition, RequestError> {
        Ok(TupleBlock::new(self.fold_list(block.block_list())?).into())
    }

    /// Folds a replicate block.
    fn fold_replicate(&mut self, block: &ReplicateBlock) -> Result<BlockDefinition, RequestError> {
        Ok(ReplicateBlock::new(block.count(), self.fold_definition(block.block())?).into())
    }

    /// Folds a list of sub-blocks in order.
    fn fold_list(
        &mut self,
        blocks: &[BlockDefinition],
    ) -> Result<Vec<BlockDefinition>, RequestError> {
        blocks
            .iter()
            .map(|block| self.fold_definition(block))
            .collect()
    }
}

/// Routes `definition` to the matching hook of `folder`.
pub fn walk_definition<F: BlockFolder + ?Sized>(
    folder: &mut F,
    definition: &BlockDefinition,
) -> Result<BlockDefinition, RequestError> {
    match definition {
        BlockDefinition::BlockReference(reference) => folder.fold_block_reference(reference),
        BlockDefinition::SubjectReference(reference) => folder.fold_subject_reference(reference),
        BlockDefinition::TreatmentReference(reference) => {
            folder.fold_treatment_reference(reference)
        }
        BlockDefinition::Generate(block) => folder.fold_generate(block),
        BlockDefinition::Product(block) => folder.fold_product(block),
        BlockDefinition::Sum(block) => folder.fold_sum(block),
        BlockDefinition::Tuple(block) => folder.fold_tuple(block),
        BlockDefinition::Replicate(block) => folder.fold_replicate(block),
    }
}

/// Rewrites shorthand into explicit structure.
///
/// Generate blocks become sums of value-pinned treatment references, and
/// block references are replaced by the definitions they point at. Inlining
/// tracks the labels being expanded and fails with
/// [`RequestError::ReferenceCycle`] when one is reached again.
#[derive(Debug, Clone)]
pub struct Normalizer {
    expand_generate: bool,
    inline_references: bool,
    max_depth: usize,
    labels: Vec<String>,
    depth: usize,
}

impl Normalizer {
    /// Creates a normalizer that expands generate blocks and inlines references.
    pub fn new() -> Self {
        Self::with_config(&CodecConfig::default())
    }

    /// Creates a normalizer bounded by `config.max_depth`.
    pub fn with_config(config: &CodecConfig) -> Self {
        Self {
            expand_generate: true,
            inline_references: true,
            max_depth: config.max_depth,
            labels: Vec::new(),
            depth: 0,
        }
    }

    /// Toggles expansion of generate blocks.
    pub fn expand_generate(mut self, enabled: bool) -> Self {
        self.expand_generate = enabled;
        self
    }

    /// Toggles inlining of block references.
    pub fn inline_references(mut self, enabled: bool) -> Self {
        self.inline_references = enabled;
        self
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockFolder for Normalizer {
    fn fold_design(&mut self, design: &DesignBlock) -> Result<DesignBlock, RequestError> {
        self.labels.push(design.label().to_string());
        let definition = self.fold_definition(design.definition());
        self.labels.pop();
        Ok(DesignBlock::new(design.label(), definition?))
    }

    fn fold_definition(
        &mut self,
        definition: &BlockDefinition,
    ) -> Result<BlockDefinition, RequestError> {
        if self.depth > self.max_depth {
            return Err(RequestError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let folded = walk_definition(self, definition);
        self.depth -= 1;
        folded
    }

    fn fold_block_reference(
        &mut self,
        reference: &BlockReference,
    ) -> Result<BlockDefinition, RequestError> {
        if !self.inline_references {
            return Ok(reference.clone().into());
        }
        let label = reference.label();
        if self.labels.iter().any(|seen| seen == label) {
            let mut path = self.labels.clone();
            path.push(label.to_string());
            return Err(RequestError::ReferenceCycle { path });
        }
        self.labels.push(label.to_string());
        let inlined = self.fold_definition(reference.block().definition());
        self.labels.pop();
        inlined
    }

    fn fold_generate(&mut self, block: &GenerateBlock) -> Result<BlockDefinition, RequestError> {
        if self.expand_generate {
            Ok(block.to_sum_block().into())
        } else {
            Ok(block.clone().into())
        }
    }
}

/// Normalizes a design block with default settings.
pub fn normalize(design: &DesignBlock) -> Result<DesignBlock, RequestError> {
    Normalizer::new().fold_design(design)
}
