//! Tests for the error payload constructors and serialisation contract.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::validation("bad"), ErrorCode::Validation)]
#[case(Error::wrong_role("no"), ErrorCode::WrongRole)]
#[case(Error::not_owner("no"), ErrorCode::NotOwner)]
#[case(Error::already_resolved("late"), ErrorCode::AlreadyResolved)]
#[case(
    Error::duplicate_pending_application("again"),
    ErrorCode::DuplicatePendingApplication
)]
#[case(Error::payload_too_large(10), ErrorCode::PayloadTooLarge)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::Validation, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn new_substitutes_blank_messages() {
    let error = Error::new(ErrorCode::NotFound, "");
    assert!(!error.message().trim().is_empty());
}

#[rstest]
fn try_with_trace_id_rejects_empty_values() {
    let result = Error::validation("bad").try_with_trace_id("   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn unauthenticated_carries_login_prompt() {
    let error = Error::unauthenticated("sign in to follow clubs");
    let details = error.details().expect("login prompt details");
    assert_eq!(details["prompt"], "login");
    assert_eq!(details["loginUrl"], LOGIN_PATH);
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::internal("boom") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_camel_case_payload(expected_trace_id: String) {
    let error = Error::validation("bad")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({ "field": "name" }));

    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(value["code"], "validation");
    assert_eq!(value["traceId"], expected_trace_id);
    assert_eq!(value["details"]["field"], "name");
}

#[rstest]
#[tokio::test]
async fn deserialising_ignores_ambient_trace(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let payload = json!({ "code": "not_found", "message": "missing" });

    let error = TraceId::scope(trace_id, async move {
        serde_json::from_value::<Error>(payload).expect("valid payload")
    })
    .await;

    assert!(error.trace_id().is_none());
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
fn deserialising_rejects_blank_message() {
    let payload = json!({ "code": "validation", "message": " " });
    assert!(serde_json::from_value::<Error>(payload).is_err());
}
