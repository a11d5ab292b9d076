use beam_core::errors::{BeamError, ErrorInfo};

#[test]
fn unknown_element_carries_its_label() {
    let err = BeamError::Lattice(
        ErrorInfo::new("unknown-element", "element type is not supported")
            .with_context("element", "sb1")
            .with_context("type", "rbend"),
    );
    assert_eq!(err.info().code, "unknown-element");
    assert_eq!(err.info().context.get("element").map(String::as_str), Some("sb1"));
}

#[test]
fn display_renders_code_context_and_hint() {
    let err = BeamError::Parse(
        ErrorInfo::new("ragged-row", "row has the wrong number of fields")
            .with_context("path", "diags/beam_final.0")
            .with_context("line", "7")
            .with_hint("check the header"),
    );
    assert_eq!(
        err.to_string(),
        "parse error: [ragged-row] row has the wrong number of fields \
         (line=7, path=diags/beam_final.0); hint: check the header"
    );
}

#[test]
fn display_without_context_is_compact() {
    let err = BeamError::Physics(ErrorInfo::new("mass-unset", "reference mass is zero"));
    assert_eq!(err.to_string(), "physics error: [mass-unset] reference mass is zero");
}

#[test]
fn io_helper_records_path() {
    let source = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err = BeamError::io("config-read", "run.yaml", source);
    assert!(matches!(err, BeamError::Io(_)));
    assert_eq!(err.info().context.get("path").map(String::as_str), Some("run.yaml"));
}

#[test]
fn errors_survive_json() {
    let err = BeamError::Check(
        ErrorInfo::new("count-mismatch", "particle count differs").with_context("expected", "10000"),
    );
    let json = serde_json::to_string(&err).unwrap();
    assert!(json.contains("\"family\":\"Check\""));
    let back: BeamError = serde_json::from_str(&json).unwrap();
    assert_eq!(err, back);
}
