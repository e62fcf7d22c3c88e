use chatbridge_core::ChatbridgeError;

#[test]
fn error_display_for_connection() {
    let err = ChatbridgeError::connection("Ollama", "connection refused");
    assert_eq!(format!("{err}"), "Ollama connection failed: connection refused");
    assert!(err.is_transport());
}

#[test]
fn error_display_for_http_status() {
    let err = ChatbridgeError::Http {
        provider: "Ollama".to_string(),
        status: 404,
        body: "model not found".to_string(),
    };
    assert_eq!(format!("{err}"), "Ollama API error: 404 - model not found");
}

#[test]
fn error_display_for_missing_body() {
    let err = ChatbridgeError::MissingBody("Ollama".to_string());
    assert_eq!(format!("{err}"), "No response body from Ollama");
}

#[test]
fn error_display_for_line_too_long() {
    let err = ChatbridgeError::LineTooLong { limit: 16 };
    assert_eq!(format!("{err}"), "Stream line exceeded 16 bytes");
    assert!(!err.is_transport());
}

#[test]
fn serde_errors_convert() {
    let parse_error = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
    let err: ChatbridgeError = parse_error.into();
    assert!(format!("{err}").starts_with("Serialization/deserialization error: "));
}
