//! Tests for response normalisation in the API client.

use std::sync::Arc;

use rstest::rstest;
use serde_json::json;

use super::*;
use crate::domain::ports::{
    HttpMethod, InMemoryKeyValueStore, KeyValueStore, MockHttpTransport, NoticeLevel,
    RecordingNavigator, RecordingNotifier,
};
use crate::domain::session::{TOKEN_KEY, USER_INFO_KEY};
use crate::domain::{ApiErrorKind, Credential, Role, UserRecord};

struct Harness {
    client: ApiClient<MockHttpTransport>,
    storage: Arc<InMemoryKeyValueStore>,
    session: Arc<SessionContext>,
    notifier: Arc<RecordingNotifier>,
    navigator: Arc<RecordingNavigator>,
}

fn harness(transport: MockHttpTransport) -> Harness {
    let storage = Arc::new(InMemoryKeyValueStore::new());
    let session = Arc::new(SessionContext::new(storage.clone()));
    let notifier = Arc::new(RecordingNotifier::new());
    let navigator = Arc::new(RecordingNavigator::new());
    let client = ApiClient::new(
        Arc::new(transport),
        session.clone(),
        notifier.clone(),
        navigator.clone(),
    );
    Harness {
        client,
        storage,
        session,
        notifier,
        navigator,
    }
}

fn responding(status: u16, body: serde_json::Value) -> MockHttpTransport {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_execute()
        .times(1)
        .returning(move |_, _| Ok(RawResponse::new(status, Some(body.clone()))));
    transport
}

fn failing(failure: TransportFailure) -> MockHttpTransport {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_execute()
        .times(1)
        .returning(move |_, _| Err(failure.clone()));
    transport
}

#[tokio::test]
async fn attaches_stored_credential_as_bearer() {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_execute()
        .withf(|request: &ApiRequest, bearer: &Option<String>| {
            request.method == HttpMethod::Get
                && request.path == "/courses"
                && bearer.as_deref() == Some("stored-token")
        })
        .times(1)
        .returning(|_, _| Ok(RawResponse::new(200, Some(json!({ "success": true, "data": [] })))));
    let h = harness(transport);
    h.storage.set(TOKEN_KEY, "stored-token").expect("seed token");

    let envelope = h.client.send(ApiRequest::get("/courses")).await.expect("success");
    assert!(envelope.success);
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn anonymous_requests_carry_no_bearer() {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_execute()
        .withf(|_: &ApiRequest, bearer: &Option<String>| bearer.is_none())
        .times(1)
        .returning(|_, _| Ok(RawResponse::new(200, Some(json!({ "success": true })))));
    let h = harness(transport);

    h.client.send(ApiRequest::get("/test/health")).await.expect("success");
}

#[tokio::test]
async fn unsuccessful_envelope_is_rejected_with_server_message() {
    let h = harness(responding(
        200,
        json!({ "success": false, "message": "class is full" }),
    ));

    let err = h
        .client
        .send(ApiRequest::post("/student/enroll"))
        .await
        .expect_err("rejected");

    assert_eq!(err.kind(), ApiErrorKind::Rejected);
    assert_eq!(err.message(), "class is full");
    assert_eq!(h.notifier.notices(), vec![Notice::error("class is full")]);
}

#[tokio::test]
async fn unsuccessful_envelope_without_message_uses_fallback() {
    let h = harness(responding(200, json!({ "success": false })));

    let err = h.client.send(ApiRequest::get("/courses")).await.expect_err("rejected");
    assert_eq!(err.message(), MSG_OPERATION_FAILED);
}

#[tokio::test]
async fn unauthorized_clears_session_and_redirects_to_login() {
    let h = harness(responding(401, json!({ "message": "expired" })));
    h.session
        .establish(UserRecord::new("Ada", Role::Student, "B1"), Credential::new("t"))
        .expect("establish");

    let err = h
        .client
        .send(ApiRequest::get("/student/enrollments/B1"))
        .await
        .expect_err("401");

    assert!(err.is_unauthorized());
    assert!(!h.session.is_authenticated());
    assert_eq!(h.storage.get(TOKEN_KEY).expect("get"), None);
    assert_eq!(h.storage.get(USER_INFO_KEY).expect("get"), None);
    assert_eq!(h.navigator.pushed(), vec![LOGIN_PATH.to_owned()]);
    assert_eq!(h.notifier.messages(), vec![MSG_LOGIN_REQUIRED.to_owned()]);
}

#[rstest]
#[case(403, json!({ "message": "ignored" }), ApiErrorKind::Forbidden, MSG_FORBIDDEN)]
#[case(404, json!({}), ApiErrorKind::NotFound, MSG_NOT_FOUND)]
#[case(500, json!({ "message": "stack trace" }), ApiErrorKind::Server, MSG_SERVER_ERROR)]
#[case(409, json!({ "message": "time conflict" }), ApiErrorKind::Status, "time conflict")]
#[case(422, json!({ "success": false }), ApiErrorKind::Status, MSG_REQUEST_FAILED)]
#[tokio::test]
async fn http_statuses_map_to_messages(
    #[case] status: u16,
    #[case] body: serde_json::Value,
    #[case] kind: ApiErrorKind,
    #[case] message: &str,
) {
    let h = harness(responding(status, body));
    h.session
        .establish(UserRecord::new("Ada", Role::Student, "B1"), Credential::new("t"))
        .expect("establish");

    let err = h.client.send(ApiRequest::get("/courses")).await.expect_err("fails");

    assert_eq!(err.kind(), kind);
    assert_eq!(err.status(), Some(status));
    assert_eq!(err.message(), message);
    assert!(h.session.is_authenticated(), "only 401 touches the session");
    assert!(h.navigator.pushed().is_empty());
    let notices = h.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices.first().map(|n| n.level), Some(NoticeLevel::Error));
}

#[rstest]
#[case(TransportFailure::connection("connection refused"))]
#[case(TransportFailure::timeout("10s elapsed"))]
#[tokio::test]
async fn missing_response_is_a_network_error(#[case] failure: TransportFailure) {
    let h = harness(failing(failure));

    let err = h.client.send(ApiRequest::get("/courses")).await.expect_err("fails");

    assert_eq!(err.kind(), ApiErrorKind::Network);
    assert_eq!(h.notifier.messages(), vec![MSG_NETWORK_ERROR.to_owned()]);
}

#[tokio::test]
async fn unbuildable_request_notifies_plain_message() {
    let failure = TransportFailure::invalid_request("path segment `..` cannot be sent");
    let h = harness(failing(failure));

    let err = h.client.get_enrollments("..").await.expect_err("refused");

    assert_eq!(err.kind(), ApiErrorKind::InvalidRequest);
    assert_eq!(err.message(), MSG_REQUEST_NOT_SENT);
    assert_eq!(h.notifier.messages(), vec![MSG_REQUEST_NOT_SENT.to_owned()]);
    assert!(h.navigator.pushed().is_empty());
}

#[tokio::test]
async fn payload_shape_mismatch_is_notified_decode_error() {
    let h = harness(responding(200, json!({ "success": true, "data": { "not": "a list" } })));

    let err = h.client.get_all_courses().await.expect_err("decode");

    assert_eq!(err.kind(), ApiErrorKind::Decode);
    assert_eq!(h.notifier.notices().len(), 1);
}

#[tokio::test]
async fn term_queries_use_server_semester_names() {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_execute()
        .withf(|request: &ApiRequest, _: &Option<String>| {
            request.path == "/courses/available"
                && request.query
                    == vec![
                        ("academicYear".to_owned(), "2024".to_owned()),
                        ("semester".to_owned(), "上學期".to_owned()),
                    ]
        })
        .times(1)
        .returning(|_, _| Ok(RawResponse::new(200, Some(json!({ "success": true, "data": [] })))));
    let h = harness(transport);

    let classes = h
        .client
        .get_available_classes(&crate::domain::AcademicTerm::default())
        .await
        .expect("success");
    assert!(classes.is_empty());
}

#[tokio::test]
async fn drop_sends_ids_as_query_parameters() {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_execute()
        .withf(|request: &ApiRequest, _: &Option<String>| {
            request.method == HttpMethod::Delete
                && request.path == "/student/drop"
                && request.query
                    == vec![
                        ("studentId".to_owned(), "B1".to_owned()),
                        ("classId".to_owned(), "42".to_owned()),
                    ]
                && request.body.is_none()
        })
        .times(1)
        .returning(|_, _| {
            let body = json!({ "success": true, "data": "dropped" });
            Ok(RawResponse::new(200, Some(body)))
        });
    let h = harness(transport);

    h.client.drop_course("B1", 42).await.expect("dropped");
}

#[tokio::test]
async fn probes_return_message_and_detail() {
    let h = harness(responding(
        200,
        json!({ "success": true, "message": "ok", "data": { "db": "up" } }),
    ));

    let report = h.client.database_check().await.expect("probe");
    assert_eq!(report.message.as_deref(), Some("ok"));
    assert_eq!(report.detail, json!({ "db": "up" }));
}
