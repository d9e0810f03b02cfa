use super::*;
use serde_json::json;

fn http(status: u16, payload: Option<Value>) -> ApiError {
    ApiError::Http(HttpError::from_response(status, payload))
}

// =============================================================
// HttpError
// =============================================================

#[test]
fn http_error_display_includes_status() {
    let err = HttpError::from_response(401, None);
    assert_eq!(err.to_string(), "request failed (status 401)");
}

#[test]
fn detail_reads_string_field() {
    let err = HttpError::from_response(400, Some(json!({ "detail": "Username already registered" })));
    assert_eq!(err.detail(), Some("Username already registered"));
}

#[test]
fn detail_ignores_blank_and_non_string_values() {
    assert_eq!(HttpError::from_response(400, Some(json!({ "detail": "  " }))).detail(), None);
    assert_eq!(
        HttpError::from_response(422, Some(json!({ "detail": [{ "msg": "field required" }] }))).detail(),
        None
    );
    assert_eq!(HttpError::from_response(500, Some(json!("Internal Server Error"))).detail(), None);
    assert_eq!(HttpError::from_response(500, None).detail(), None);
}

// =============================================================
// ApiError accessors
// =============================================================

#[test]
fn api_error_exposes_status_and_payload_for_http_only() {
    let err = http(404, Some(json!({ "detail": "Prompt not found" })));
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.payload(), Some(&json!({ "detail": "Prompt not found" })));

    let transport = ApiError::Transport(TransportError::new("connection refused"));
    assert_eq!(transport.status(), None);
    assert_eq!(transport.payload(), None);
    assert_eq!(transport.to_string(), "transport failure: connection refused");
}

// =============================================================
// user_message
// =============================================================

#[test]
fn user_message_prefers_detail() {
    let err = http(400, Some(json!({ "detail": "Incorrect username or password" })));
    assert_eq!(user_message(&err, true, "fallback"), "Incorrect username or password");
}

#[test]
fn user_message_falls_back_to_error_message() {
    let err = ApiError::Transport(TransportError::new("offline"));
    assert_eq!(user_message(&err, true, "fallback"), "transport failure: offline");
}

#[test]
fn user_message_uses_fallback_when_error_message_disabled() {
    let err = http(500, Some(json!("oops")));
    assert_eq!(user_message(&err, false, "Sign-up failed"), "Sign-up failed");
}

#[test]
fn auth_failure_displays_message_and_keeps_source() {
    let failure = AuthFailure { message: "nope".to_owned(), source: http(400, None) };
    assert_eq!(failure.to_string(), "nope");
    assert_eq!(failure.source.status(), Some(400));
    assert!(std::error::Error::source(&failure).is_some());
}
