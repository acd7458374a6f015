use cpr_core::errors::{ErrorInfo, RequestError, SymbolKind};

#[test]
fn unresolved_reference_surface() {
    let err = RequestError::unresolved(SymbolKind::Design, "missing");
    assert_eq!(err.code(), "unresolved-reference");
    assert_eq!(err.to_string(), "unresolved design reference `missing`");
    assert!(err.info().is_none());
}

#[test]
fn malformed_node_surface() {
    let err = RequestError::malformed("replicate_block", "count");
    assert_eq!(err.code(), "malformed-node");
    assert_eq!(
        err.to_string(),
        "malformed `replicate_block` node: missing field `count`"
    );
}

#[test]
fn reference_cycle_lists_path() {
    let err = RequestError::ReferenceCycle {
        path: vec!["a".into(), "b".into(), "a".into()],
    };
    assert_eq!(err.to_string(), "reference cycle: a -> b -> a");
}

#[test]
fn serde_error_carries_info() {
    let err = RequestError::Serde(
        ErrorInfo::new("S001", "schema mismatch")
            .with_context("field", "value")
            .with_hint("check the value object"),
    );
    assert_eq!(err.code(), "S001");
    let info = err.info().expect("info");
    assert!(info.context.contains_key("field"));
    assert!(err.to_string().contains("hint: check the value object"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = RequestError::unresolved(SymbolKind::Treatment, "IPTG");
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "UnresolvedReference");
    assert_eq!(json["detail"]["kind"], "treatment");
    let restored: RequestError = serde_json::from_value(json).expect("deserialize");
    assert_eq!(restored, err);
}
