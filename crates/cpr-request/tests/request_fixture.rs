use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use cpr_core::{CodecConfig, SymbolKind, Version};
use cpr_design::{encode, normalize, BlockDefinition};
use cpr_request::{
    load_request, stable_hash_string, write_document, write_request, ExperimentalRequest,
};
use serde_json::Value as JsonValue;
use tempfile::tempdir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("nc_titration.json")
}

fn fixture_json() -> JsonValue {
    serde_json::from_slice(&fs::read(fixture_path()).unwrap()).unwrap()
}

#[test]
fn titration_request_decodes() {
    let request = load_request(fixture_path(), &CodecConfig::default()).unwrap();

    assert_eq!(request.challenge_problem, "NOVEL_CHASSIS");
    assert_eq!(request.experiment_reference, "NovelChassis-NAND-Ecoli-Titration");
    assert_eq!(request.experiment_version, Version::new(1, 0, 0));
    assert_eq!(request.derived_from, None);
    assert_eq!(request.subjects.len(), 2);
    assert_eq!(request.treatments.len(), 6);

    let labels: Vec<_> = request.designs.iter().map(|d| d.label()).collect();
    assert_eq!(
        labels,
        vec!["strains", "temperature-media", "conditions", "experiment"]
    );

    let types: Vec<_> = request
        .measurements
        .iter()
        .map(|m| m.measurement_type())
        .collect();
    assert_eq!(types, vec!["FLOW", "PLATE_READER", "RNA_SEQ", "PROTEOMICS"]);
    for measurement in &request.measurements {
        assert_eq!(measurement.block().label(), "experiment");
        assert_eq!(measurement.performers(), ["Ginkgo".to_string()]);
    }

    let flow = &request.measurements[0];
    assert_eq!(flow.controls().len(), 2);
    let positive = &flow.controls()[0];
    assert_eq!(positive.name(), "positive_gfp");
    assert_eq!(positive.sample().subject().name(), "MG1655_NAND_Circuit");
    let pinned: Vec<_> = positive
        .sample()
        .treatments()
        .iter()
        .map(|t| (t.treatment_name(), t.value().map(|v| v.to_string())))
        .collect();
    assert_eq!(
        pinned,
        vec![
            ("timepoint", Some("18 http://purl.obolibrary.org/obo/UO_0000032".to_string())),
            ("IPTG", Some("0 http://purl.obolibrary.org/obo/UO_0000064".to_string())),
        ]
    );
    assert!(flow.controls()[1].sample().treatments().is_empty());
}

#[test]
fn design_references_share_registered_blocks() {
    let request = load_request(fixture_path(), &CodecConfig::default()).unwrap();
    let experiment = request.design("experiment").unwrap();

    let mut referenced = Vec::new();
    experiment.definition().walk(&mut |node| {
        if let BlockDefinition::BlockReference(reference) = node {
            referenced.push(Arc::clone(reference.block()));
        }
    });
    assert_eq!(referenced.len(), 3);
    for (shared, registered) in referenced.iter().zip(&request.designs[..3]) {
        assert!(Arc::ptr_eq(shared, registered));
    }
    assert!(Arc::ptr_eq(
        request.measurements[0].block().block(),
        experiment
    ));

    let symbols = request.symbol_table().unwrap();
    assert_eq!(symbols.names(SymbolKind::Design).len(), 4);
    assert!(symbols.contains(SymbolKind::Treatment, "M9 Glucose CAA"));
    assert!(!symbols.contains(SymbolKind::Design, "MG1655_NAND_Circuit"));
    symbols
        .check_usage(&experiment.definition().references())
        .unwrap();
}

#[test]
fn titration_request_re_encodes_to_source() {
    let request = load_request(fixture_path(), &CodecConfig::default()).unwrap();
    assert_eq!(encode(&request).unwrap(), fixture_json());
}

#[test]
fn fingerprint_is_stable_across_write_and_load() {
    let config = CodecConfig::default();
    let request = load_request(fixture_path(), &config).unwrap();
    let fingerprint = request.fingerprint().unwrap();
    assert_eq!(fingerprint.len(), 64);
    assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(fingerprint, stable_hash_string(&fixture_json()).unwrap());

    let dir = tempdir().unwrap();
    let compact = CodecConfig {
        pretty: false,
        ..CodecConfig::default()
    };
    let path = dir.path().join("nested").join("request.json");
    write_request(&path, &request, &compact).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), 1);

    let restored = load_request(&path, &config).unwrap();
    assert_eq!(restored, request);
    assert_eq!(restored.fingerprint().unwrap(), fingerprint);
}

#[test]
fn fingerprint_tracks_content() {
    let config = CodecConfig::default();
    let request = load_request(fixture_path(), &config).unwrap();
    let mut revised: ExperimentalRequest = request.clone();
    revised.experiment_version = Version::new(1, 0, 1);
    revised.derived_from = Some("NovelChassis-NAND-Ecoli-Titration".into());
    assert_ne!(request.fingerprint().unwrap(), revised.fingerprint().unwrap());

    let encoded = encode(&revised).unwrap();
    assert_eq!(encoded["derived_from"], "NovelChassis-NAND-Ecoli-Titration");
    assert!(encode(&request).unwrap().get("derived_from").is_none());
}

#[test]
fn design_documents_write_into_missing_directories() {
    let request = load_request(fixture_path(), &CodecConfig::default()).unwrap();
    let design = request.design("conditions").unwrap();
    let normalized = normalize(design).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("out").join("designs").join("conditions.json");
    write_document(&path, &normalized, &CodecConfig::default()).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.ends_with('\n'));
    let parsed: JsonValue = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed, encode(&normalized).unwrap());

    let blocked = dir.path().join("file");
    fs::write(&blocked, "occupied").unwrap();
    let err = write_document(blocked.join("design.json"), &normalized, &CodecConfig::default())
        .unwrap_err();
    assert_eq!(err.code(), "document-create");
}
