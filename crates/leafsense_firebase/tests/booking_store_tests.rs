use leafsense_common::models::{BookingStatus, MeetingLink};
use leafsense_common::services::{
    AccessTokenProvider, BookingStore, BoxFuture, BoxedError, RecordOutcome,
};
use leafsense_config::FirestoreConfig;
use leafsense_firebase::{FirestoreBookingStore, FirestoreClient, FirestoreError};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOCS: &str = "/v1/projects/leafsense-test/databases/(default)/documents";

struct StaticToken;

impl AccessTokenProvider for StaticToken {
    fn access_token(&self, _scopes: &[&str]) -> BoxFuture<'_, String, BoxedError> {
        Box::pin(async { Ok("test-token".to_string()) })
    }
}

fn store_for(server: &MockServer) -> FirestoreBookingStore {
    let config = FirestoreConfig {
        project_id: Some("leafsense-test".to_string()),
        base_url: Some(server.uri()),
        ..Default::default()
    };
    let client = FirestoreClient::new(&config, reqwest::Client::new(), Arc::new(StaticToken))
        .expect("client should build");
    FirestoreBookingStore::new(Arc::new(client), &config)
}

#[tokio::test]
async fn test_fetch_booking_decodes_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/bookings/b1", DOCS)))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/leafsense-test/databases/(default)/documents/bookings/b1",
            "fields": {
                "status": { "stringValue": "confirmed" },
                "topic": { "stringValue": "Leaf rust" },
                "meetLink": { "stringValue": "https://meet.example/xyz" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let booking = store_for(&server)
        .fetch_booking("b1")
        .await
        .expect("fetch should succeed")
        .expect("booking exists");

    assert_eq!(booking.id.as_deref(), Some("b1"));
    assert_eq!(booking.status, Some(BookingStatus::Confirmed));
    assert!(booking.is_linked());
}

#[tokio::test]
async fn test_fetch_missing_booking_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/bookings/nope", DOCS)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;

    let booking = store_for(&server)
        .fetch_booking("nope")
        .await
        .expect("404 is not an error");
    assert!(booking.is_none());
}

#[tokio::test]
async fn test_record_meeting_patches_only_link_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/bookings/b1", DOCS)))
        .and(query_param("currentDocument.exists", "true"))
        .and(query_param("updateMask.fieldPaths", "meetLink"))
        .and(body_json(json!({
            "fields": {
                "meetLink": { "stringValue": "https://meet.example/xyz" },
                "calendarEventId": { "stringValue": "evt_1" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/leafsense-test/databases/(default)/documents/bookings/b1",
            "fields": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = store_for(&server)
        .record_meeting(
            "b1",
            MeetingLink {
                meet_link: "https://meet.example/xyz".to_string(),
                calendar_event_id: "evt_1".to_string(),
            },
            None,
        )
        .await
        .expect("patch should succeed");
    assert_eq!(outcome, RecordOutcome::Written);

    let requests = server.received_requests().await.expect("recording enabled");
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(query.contains("updateMask.fieldPaths=calendarEventId"), "{}", query);
}

#[tokio::test]
async fn test_record_meeting_on_missing_document_fails() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .record_meeting(
            "gone",
            MeetingLink {
                meet_link: "https://meet.example/xyz".to_string(),
                calendar_event_id: "evt_1".to_string(),
            },
            None,
        )
        .await
        .expect_err("missing document must fail");
    assert!(matches!(err, FirestoreError::NotFound(_)));
}

fn link() -> MeetingLink {
    MeetingLink {
        meet_link: "https://meet.example/xyz".to_string(),
        calendar_event_id: "evt_1".to_string(),
    }
}

#[tokio::test]
async fn test_record_meeting_with_revision_sends_update_time_precondition() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/bookings/b1", DOCS)))
        .and(query_param("currentDocument.updateTime", "2025-05-31T10:00:00.000000Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/leafsense-test/databases/(default)/documents/bookings/b1",
            "fields": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = store_for(&server)
        .record_meeting("b1", link(), Some("2025-05-31T10:00:00.000000Z".to_string()))
        .await
        .expect("patch should succeed");
    assert_eq!(outcome, RecordOutcome::Written);

    let requests = server.received_requests().await.expect("recording enabled");
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(!query.contains("currentDocument.exists"), "{}", query);
}

#[tokio::test]
async fn test_record_meeting_on_stale_revision_is_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "the stored version does not match the required base version",
                "status": "FAILED_PRECONDITION"
            }
        })))
        .mount(&server)
        .await;

    let outcome = store_for(&server)
        .record_meeting("b1", link(), Some("2025-05-31T10:00:00.000000Z".to_string()))
        .await
        .expect("a lost race is not an error");
    assert_eq!(outcome, RecordOutcome::Conflict);
}

#[tokio::test]
async fn test_record_meeting_on_409_is_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(409).set_body_string("ABORTED"))
        .mount(&server)
        .await;

    let outcome = store_for(&server)
        .record_meeting("b1", link(), Some("2025-05-31T10:00:00.000000Z".to_string()))
        .await
        .expect("a lost race is not an error");
    assert_eq!(outcome, RecordOutcome::Conflict);
}

#[tokio::test]
async fn test_record_meeting_other_400_stays_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(400).set_body_string("INVALID_ARGUMENT"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .record_meeting("b1", link(), None)
        .await
        .expect_err("a malformed write must fail");
    assert!(matches!(err, FirestoreError::ApiError { status: 400, .. }));
}

#[tokio::test]
async fn test_list_unlinked_confirmed_filters_linked() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}:runQuery", DOCS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "document": {
                    "name": "projects/leafsense-test/databases/(default)/documents/bookings/b1",
                    "fields": { "status": { "stringValue": "confirmed" } }
                },
                "readTime": "2025-06-01T00:00:00Z"
            },
            {
                "document": {
                    "name": "projects/leafsense-test/databases/(default)/documents/bookings/b2",
                    "fields": {
                        "status": { "stringValue": "confirmed" },
                        "meetLink": { "stringValue": "https://meet.example/abc" }
                    }
                },
                "readTime": "2025-06-01T00:00:00Z"
            },
            { "readTime": "2025-06-01T00:00:00Z" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let bookings = store_for(&server)
        .list_unlinked_confirmed()
        .await
        .expect("query should succeed");

    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].id.as_deref(), Some("b1"));
}

#[tokio::test]
async fn test_api_error_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .list_unlinked_confirmed()
        .await
        .expect_err("403 must fail");
    match err {
        FirestoreError::ApiError { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "PERMISSION_DENIED");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_project_id_is_config_error() {
    let result = FirestoreClient::new(
        &FirestoreConfig::default(),
        reqwest::Client::new(),
        Arc::new(StaticToken),
    );
    assert!(matches!(result, Err(FirestoreError::ConfigError(_))));
}
