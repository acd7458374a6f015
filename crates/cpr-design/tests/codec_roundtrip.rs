mod common;

use std::sync::Arc;

use cpr_core::CodecConfig;
use cpr_design::{
    decode, decode_design_sequence, encode, from_json_str, to_json_string, BlockDefinition,
    BlockDefinitionDecoder, Decoded, DesignBlock, DesignBlockDecoder, DesignNode, GenerateBlock,
    ProductBlock, ReplicateBlock, SubjectReference, SumBlock, TreatmentReference, TupleBlock,
};
use serde_json::json;

use common::{
    base_symbols, micromolar, nand_strain, reagent, reference, symbols_with_designs, MICROMOLAR,
};

#[test]
fn sum_of_references_matches_wire_text() {
    let (symbols, strains, conditions) = symbols_with_designs();
    let sum = SumBlock::new(vec![
        reference(&strains).into(),
        reference(&conditions).into(),
    ]);

    let text = to_json_string(&sum).unwrap();
    assert_eq!(
        text,
        r#"{"block_type":"sum_block","block_list":[{"block_type":"block_reference","reference":"strains"},{"block_type":"block_reference","reference":"conditions"}]}"#
    );

    let decoded = from_json_str(&text, &symbols).unwrap();
    assert_eq!(
        decoded,
        Decoded::Typed(DesignNode::Definition(sum.into()))
    );
}

#[test]
fn replicate_of_reference_round_trips() {
    let (symbols, _, conditions) = symbols_with_designs();
    let replicate: BlockDefinition = ReplicateBlock::new(4, reference(&conditions)).into();
    let encoded = encode(&replicate).unwrap();
    assert_eq!(
        encoded,
        json!({
            "block_type": "replicate_block",
            "count": 4,
            "block": {"block_type": "block_reference", "reference": "conditions"}
        })
    );
    let decoded = BlockDefinitionDecoder::new(&symbols).decode(&encoded).unwrap();
    assert_eq!(decoded, replicate);
}

#[test]
fn generate_block_keeps_values_in_order() {
    let symbols = base_symbols();
    let concentrations = [0.0, 0.25, 2.5, 25.0, 250.0];
    let block = GenerateBlock::new(
        reagent("IPTG"),
        concentrations.iter().map(|c| micromolar(*c)).collect(),
    );
    let encoded = encode(&block).unwrap();

    assert_eq!(encoded["block_type"], "generate_block");
    assert_eq!(
        encoded["treatment"],
        json!({"block_type": "treatment_reference", "reference": "IPTG"})
    );
    assert!(encoded.get("attribute_name").is_none());
    let values = encoded["values"].as_array().unwrap();
    assert_eq!(values.len(), 5);
    for (value, expected) in values.iter().zip(concentrations) {
        assert_eq!(value["object_type"], "value");
        assert_eq!(value["value"], json!(expected));
        assert_eq!(value["unit"]["reference"], MICROMOLAR);
    }

    let decoded = BlockDefinitionDecoder::new(&symbols).decode(&encoded).unwrap();
    assert_eq!(decoded, BlockDefinition::from(block));
}

#[test]
fn generate_block_attribute_name_round_trips() {
    let symbols = base_symbols();
    let block = GenerateBlock::new(reagent("IPTG"), vec![micromolar(5.0)])
        .with_attribute_name("concentration");
    let encoded = encode(&block).unwrap();
    assert_eq!(encoded["attribute_name"], "concentration");
    let decoded = BlockDefinitionDecoder::new(&symbols).decode(&encoded).unwrap();
    assert_eq!(decoded, BlockDefinition::from(block));
}

#[test]
fn keys_follow_wire_order() {
    let valued = TreatmentReference::create_from(reagent("IPTG"), Some(micromolar(2.5)));
    let text = to_json_string(&valued).unwrap();
    assert!(text.starts_with(
        r#"{"block_type":"value_treatment_reference","reference":"IPTG","value":{"object_type":"value""#
    ));

    let design = DesignBlock::new("strains", SubjectReference::new(nand_strain()));
    assert_eq!(
        to_json_string(&design).unwrap(),
        r#"{"object_type":"design_block","label":"strains","definition":{"block_type":"subject_reference","reference":"MG1655_NAND_Circuit"}}"#
    );
}

#[test]
fn references_encode_in_constant_size() {
    let mut symbols = base_symbols();
    let mut definition: BlockDefinition = SubjectReference::new(nand_strain()).into();
    for _ in 0..64 {
        definition = ProductBlock::new(vec![
            definition,
            TreatmentReference::create_from(reagent("Kan"), None).into(),
        ])
        .into();
    }
    let deep = symbols
        .insert_design(DesignBlock::new("deep", definition))
        .unwrap();
    let text = to_json_string(&reference(&deep)).unwrap();
    assert_eq!(text, r#"{"block_type":"block_reference","reference":"deep"}"#);

    let decoded = BlockDefinitionDecoder::new(&symbols)
        .decode_block_reference(&serde_json::from_str(&text).unwrap())
        .unwrap();
    assert!(Arc::ptr_eq(decoded.block(), &deep));
}

#[test]
fn every_variant_round_trips() {
    let (symbols, strains, conditions) = symbols_with_designs();
    let tree: BlockDefinition = TupleBlock::new(vec![
        reference(&strains).into(),
        SubjectReference::new(nand_strain()).into(),
        TreatmentReference::create_from(reagent("Kan"), None).into(),
        TreatmentReference::create_from(reagent("IPTG"), Some(micromolar(25.0))).into(),
        GenerateBlock::new(reagent("L-arabinose"), vec![micromolar(0.0), micromolar(5.0)]).into(),
        ProductBlock::new(vec![reference(&conditions).into()]).into(),
        SumBlock::new(vec![]).into(),
        ReplicateBlock::new(2, SubjectReference::new(nand_strain())).into(),
    ])
    .into();
    let encoded = encode(&tree).unwrap();
    let decoded = BlockDefinitionDecoder::new(&symbols).decode(&encoded).unwrap();
    assert_eq!(decoded, tree);
}

#[test]
fn design_block_round_trips_through_top_level_decode() {
    let (symbols, strains, _) = symbols_with_designs();
    let encoded = encode(strains.as_ref()).unwrap();
    match decode(&encoded, &symbols).unwrap() {
        Decoded::Typed(DesignNode::Design(design)) => assert_eq!(&design, strains.as_ref()),
        other => panic!("unexpected decode result: {other:?}"),
    }
    let design = DesignBlockDecoder::new(&symbols).decode(&encoded).unwrap();
    assert_eq!(design.label(), "strains");
}

#[test]
fn design_sequence_resolves_earlier_labels() {
    let mut symbols = base_symbols();
    let nodes = vec![
        json!({
            "object_type": "design_block",
            "label": "strains",
            "definition": {"block_type": "subject_reference", "reference": "MG1655_NAND_Circuit"}
        }),
        json!({
            "object_type": "design_block",
            "label": "experiment",
            "definition": {
                "block_type": "replicate_block",
                "count": 4,
                "block": {"block_type": "block_reference", "reference": "strains"}
            }
        }),
    ];
    let designs = decode_design_sequence(&nodes, &mut symbols, &CodecConfig::default()).unwrap();
    assert_eq!(designs.len(), 2);
    assert_eq!(designs[1].label(), "experiment");
    assert!(Arc::ptr_eq(&symbols.design("strains").unwrap(), &designs[0]));

    let re_encoded: Vec<_> = designs.iter().map(|d| encode(d.as_ref()).unwrap()).collect();
    assert_eq!(re_encoded, nodes);
}

#[test]
fn deep_text_documents_decode_like_parsed_values() {
    let symbols = base_symbols();
    let mut definition: BlockDefinition = SubjectReference::new(nand_strain()).into();
    for _ in 0..100 {
        definition = ProductBlock::new(vec![definition]).into();
    }

    let text = to_json_string(&definition).unwrap();
    let from_text = from_json_str(&text, &symbols).unwrap();
    let from_value = decode(&encode(&definition).unwrap(), &symbols).unwrap();
    assert_eq!(from_text, from_value);
    assert_eq!(from_text, Decoded::Typed(DesignNode::Definition(definition)));
}
