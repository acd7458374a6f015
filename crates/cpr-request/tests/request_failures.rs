use cpr_core::{CodecConfig, RequestError, SymbolKind};
use cpr_request::{load_request, ExperimentalRequest};
use serde_json::{json, Value as JsonValue};
use tempfile::tempdir;

fn minimal_request() -> JsonValue {
    json!({
        "object_type": "experimental_request",
        "challenge_problem": "NOVEL_CHASSIS",
        "experiment_reference": "Minimal",
        "experiment_reference_url": "https://example.org/minimal",
        "experiment_version": {"major": 0, "minor": 1, "patch": 0},
        "subjects": [
            {"object_type": "named_entity", "name": "strain", "reference": "https://example.org/strain"}
        ],
        "treatments": [],
        "designs": [
            {
                "object_type": "design_block",
                "label": "only",
                "definition": {"block_type": "subject_reference", "reference": "strain"}
            }
        ],
        "measurements": [
            {
                "object_type": "measurement",
                "type": "FLOW",
                "block": {"block_type": "block_reference", "reference": "only"},
                "performers": []
            }
        ]
    })
}

fn decode(node: &JsonValue) -> Result<ExperimentalRequest, RequestError> {
    ExperimentalRequest::decode(node, &CodecConfig::default())
}

#[test]
fn minimal_request_decodes() {
    let request = decode(&minimal_request()).unwrap();
    assert_eq!(request.designs.len(), 1);
    assert!(request.measurements[0].controls().is_empty());
    assert!(request.measurements[0].performers().is_empty());
}

#[test]
fn measurement_on_unknown_design_fails() {
    let mut node = minimal_request();
    node["measurements"][0]["block"]["reference"] = json!("absent");
    assert_eq!(
        decode(&node).unwrap_err(),
        RequestError::unresolved(SymbolKind::Design, "absent")
    );
}

#[test]
fn measurement_block_must_be_a_reference() {
    let mut node = minimal_request();
    node["measurements"][0]["block"] =
        json!({"block_type": "subject_reference", "reference": "strain"});
    assert!(matches!(
        decode(&node),
        Err(RequestError::UnexpectedNode { ref expected, .. }) if expected == "block_reference"
    ));
}

#[test]
fn control_subject_resolves_in_entity_namespace() {
    let mut node = minimal_request();
    node["measurements"][0]["controls"] = json!([
        {
            "object_type": "control",
            "name": "negative",
            "sample": {"object_type": "sample", "subject": "only"}
        }
    ]);
    assert_eq!(
        decode(&node).unwrap_err(),
        RequestError::unresolved(SymbolKind::Entity, "only")
    );
}

#[test]
fn missing_header_field_is_malformed() {
    let mut node = minimal_request();
    node.as_object_mut().unwrap().remove("experiment_reference_url");
    assert_eq!(
        decode(&node).unwrap_err(),
        RequestError::malformed("experimental_request", "experiment_reference_url")
    );

    let mut node = minimal_request();
    node["measurements"][0].as_object_mut().unwrap().remove("performers");
    assert_eq!(
        decode(&node).unwrap_err(),
        RequestError::malformed("measurement", "performers")
    );
}

#[test]
fn performers_must_be_strings() {
    let mut node = minimal_request();
    node["measurements"][0]["performers"] = json!(["Ginkgo", 7]);
    assert!(matches!(
        decode(&node),
        Err(RequestError::InvalidField { ref field, .. }) if field == "performers"
    ));
}

#[test]
fn conflicting_subjects_are_duplicates() {
    let mut node = minimal_request();
    node["subjects"].as_array_mut().unwrap().push(
        json!({"object_type": "named_entity", "name": "strain", "reference": "https://example.org/other"}),
    );
    assert_eq!(decode(&node).unwrap_err().code(), "duplicate-symbol");
}

#[test]
fn wrong_document_kind_is_rejected() {
    let node = json!({"object_type": "design_block", "label": "x"});
    assert!(matches!(
        decode(&node),
        Err(RequestError::UnexpectedNode { ref expected, .. }) if expected == "experimental_request"
    ));
}

#[test]
fn unreadable_and_unparsable_files_report_codes() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let err = load_request(&missing, &CodecConfig::default()).unwrap_err();
    assert_eq!(err.code(), "request-read");
    assert!(err.info().unwrap().context.contains_key("path"));

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "{ not json").unwrap();
    let err = load_request(&garbage, &CodecConfig::default()).unwrap_err();
    assert_eq!(err.code(), "decode-json");
}
