mod common;

use std::sync::Arc;

use cpr_core::{CodecConfig, RequestError};
use cpr_design::{
    normalize, BlockDefinition, BlockFolder, BlockReference, DesignBlock, GenerateBlock,
    Normalizer, ProductBlock, ReplicateBlock, SubjectReference, SumBlock, TreatmentReference,
    TupleBlock,
};

use common::{empty_strain, micromolar, nand_strain, reagent, reference, symbols_with_designs};

#[test]
fn generate_expands_to_sum_of_valued_references() {
    let design = DesignBlock::new(
        "conditions",
        GenerateBlock::new(reagent("IPTG"), vec![micromolar(0.0), micromolar(2.5)]),
    );
    let normalized = normalize(&design).unwrap();
    let expected = DesignBlock::new(
        "conditions",
        SumBlock::new(vec![
            TreatmentReference::create_from(reagent("IPTG"), Some(micromolar(0.0))).into(),
            TreatmentReference::create_from(reagent("IPTG"), Some(micromolar(2.5))).into(),
        ]),
    );
    assert_eq!(normalized, expected);
}

#[test]
fn references_are_inlined() {
    let (_, strains, conditions) = symbols_with_designs();
    let design = DesignBlock::new(
        "experiment",
        ReplicateBlock::new(
            4,
            ProductBlock::new(vec![reference(&strains).into(), reference(&conditions).into()]),
        ),
    );
    let normalized = normalize(&design).unwrap();
    let expected = DesignBlock::new(
        "experiment",
        ReplicateBlock::new(
            4,
            ProductBlock::new(vec![
                strains.definition().clone(),
                conditions.definition().clone(),
            ]),
        ),
    );
    assert_eq!(normalized, expected);
    assert!(normalized.definition().references().designs.is_empty());
}

#[test]
fn inlining_can_be_disabled() {
    let (_, strains, _) = symbols_with_designs();
    let design = DesignBlock::new(
        "experiment",
        TupleBlock::new(vec![
            reference(&strains).into(),
            GenerateBlock::new(reagent("Kan"), vec![micromolar(1.0)]).into(),
        ]),
    );
    let mut normalizer = Normalizer::new().inline_references(false);
    let normalized = normalizer.fold_design(&design).unwrap();
    let BlockDefinition::Tuple(tuple) = normalized.definition() else {
        panic!("expected tuple, got {:?}", normalized.definition());
    };
    assert!(matches!(tuple.block_list()[0], BlockDefinition::BlockReference(_)));
    assert!(matches!(tuple.block_list()[1], BlockDefinition::Sum(_)));

    let mut untouched = Normalizer::new()
        .inline_references(false)
        .expand_generate(false);
    assert_eq!(untouched.fold_design(&design).unwrap(), design);
}

#[test]
fn relabeled_cycle_is_reported() {
    let earlier = Arc::new(DesignBlock::new("a", SubjectReference::new(nand_strain())));
    let b = Arc::new(DesignBlock::new("b", BlockReference::new(earlier)));
    let a = DesignBlock::new(
        "a",
        SumBlock::new(vec![
            SubjectReference::new(empty_strain()).into(),
            BlockReference::new(b).into(),
        ]),
    );
    let err = normalize(&a).unwrap_err();
    assert_eq!(
        err,
        RequestError::ReferenceCycle {
            path: vec!["a".into(), "b".into(), "a".into()]
        }
    );
    assert_eq!(err.to_string(), "reference cycle: a -> b -> a");
}

#[test]
fn shared_references_are_not_cycles() {
    let (_, strains, _) = symbols_with_designs();
    let design = DesignBlock::new(
        "twice",
        ProductBlock::new(vec![reference(&strains).into(), reference(&strains).into()]),
    );
    assert!(normalize(&design).is_ok());
}

#[test]
fn depth_limit_applies() {
    let mut definition: BlockDefinition = SubjectReference::new(nand_strain()).into();
    for _ in 0..8 {
        definition = TupleBlock::new(vec![definition]).into();
    }
    let design = DesignBlock::new("deep", definition);
    let config = CodecConfig {
        max_depth: 3,
        ..CodecConfig::default()
    };
    assert_eq!(
        Normalizer::with_config(&config).fold_design(&design).unwrap_err(),
        RequestError::DepthExceeded { limit: 3 }
    );
}

struct CountSubjects(usize);

impl BlockFolder for CountSubjects {
    fn fold_subject_reference(
        &mut self,
        reference: &SubjectReference,
    ) -> Result<BlockDefinition, RequestError> {
        self.0 += 1;
        Ok(reference.clone().into())
    }
}

#[test]
fn default_hooks_rebuild_identically() {
    let (_, strains, _) = symbols_with_designs();
    let mut counter = CountSubjects(0);
    let folded = counter.fold_design(&strains).unwrap();
    assert_eq!(&folded, strains.as_ref());
    assert_eq!(counter.0, 2);
}
