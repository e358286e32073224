use super::*;

#[test]
fn parses_a_well_formed_frame() {
    let text = r#"{"type":"user:explain","payload":{"question":"why?"},"id":"abc","timestamp":1}"#;
    let frame = parse_inbound(text).expect("parses");
    assert_eq!(frame.type_name, "user:explain");
    assert_eq!(frame.payload["question"], "why?");
    assert_eq!(frame.id.as_deref(), Some("abc"));
}

#[test]
fn unknown_type_is_a_validation_error() {
    let text = r#"{"type":"bogus:type","payload":{},"timestamp":1}"#;
    let err = parse_inbound(text).unwrap_err();
    assert!(matches!(err, PaigeError::Validation { .. }));
}

#[test]
fn malformed_json_is_a_validation_error() {
    let err = parse_inbound("not json").unwrap_err();
    assert!(matches!(err, PaigeError::Validation { .. }));
}

#[test]
fn schema_mismatch_payload_is_a_validation_error() {
    // `buffer:update` requires `path` and `content` strings.
    let text = r#"{"type":"buffer:update","payload":{"path":123},"timestamp":1}"#;
    let err = parse_inbound(text).unwrap_err();
    assert!(matches!(err, PaigeError::Validation { .. }));
}
