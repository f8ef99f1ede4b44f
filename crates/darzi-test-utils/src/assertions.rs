use serde_json::Value;

/// Assert a 2xx status and the `{"status":"success"}` envelope, returning
/// the body for further checks.
pub fn assert_api_ok<'a>(status: u16, body: &'a Value) -> &'a Value {
    assert!(
        (200..300).contains(&status),
        "Expected success status, got {status}: {body}"
    );
    if !body.is_null() {
        assert_eq!(
            body["status"], "success",
            "Expected success envelope, got: {body}"
        );
    }
    body
}

/// Assert the failure envelope with the expected status code, optionally
/// checking the message.
pub fn assert_api_fail(status: u16, body: &Value, expected_status: u16, message_contains: &str) {
    assert_eq!(
        status, expected_status,
        "Expected status {expected_status}, got {status}: {body}"
    );
    assert_eq!(body["status"], "fail", "Expected fail envelope, got: {body}");
    if !message_contains.is_empty() {
        let message = body["message"].as_str().unwrap_or_default();
        assert!(
            message.contains(message_contains),
            "Expected message containing '{message_contains}', got '{message}'"
        );
    }
}
