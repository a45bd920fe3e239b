//! Google Calendar client against a mock server.

use calnote_core::{AccessToken, CalNoteError, RemoteCalendar, RemoteEvent, RemoteTime, SyncWindow};
use calnote_provider_google::GoogleCalendar;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token() -> AccessToken {
    AccessToken::new("test-token")
}

fn window() -> SyncWindow {
    SyncWindow::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap(),
    )
    .unwrap()
}

fn vacation() -> RemoteEvent {
    RemoteEvent {
        id: None,
        summary: "Vacation".into(),
        description: String::new(),
        color_id: Some("5".into()),
        start: RemoteTime::Date {
            date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        },
        end: RemoteTime::Date {
            date: NaiveDate::from_ymd_opt(2024, 7, 4).unwrap(),
        },
        status: None,
    }
}

async fn calendar(server: &MockServer) -> GoogleCalendar {
    GoogleCalendar::new("primary").with_base_url(server.uri())
}

#[tokio::test]
async fn list_follows_pages_and_sends_window() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(header("Authorization", "Bearer test-token"))
        .and(query_param("singleEvents", "true"))
        .and(query_param("timeMin", "2024-05-01T00:00:00+00:00"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "b",
                "summary": "Dentist",
                "start": { "dateTime": "2024-05-10T10:00:00Z" },
                "end": { "dateTime": "2024-05-10T11:00:00Z" }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "a",
                    "summary": "Offsite",
                    "status": "confirmed",
                    "start": { "date": "2024-06-03" },
                    "end": { "date": "2024-06-05" }
                },
                { "id": "broken", "summary": "no times" }
            ],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let events = calendar(&server)
        .await
        .list_events(&token(), &window())
        .await
        .unwrap();

    let ids: Vec<_> = events.iter().filter_map(|e| e.id.as_deref()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn create_returns_assigned_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "summary": "Vacation",
            "colorId": "5",
            "start": { "date": "2024-07-01" },
            "end": { "date": "2024-07-04" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "evt-123",
            "summary": "Vacation",
            "start": { "date": "2024-07-01" },
            "end": { "date": "2024-07-04" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = calendar(&server)
        .await
        .create_event(&token(), &vacation())
        .await
        .unwrap();
    assert_eq!(id, "evt-123");
}

#[tokio::test]
async fn update_puts_to_event_path() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/evt-123"))
        .and(body_partial_json(json!({ "summary": "Vacation" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "evt-123",
            "start": { "date": "2024-07-01" },
            "end": { "date": "2024-07-04" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    calendar(&server)
        .await
        .update_event(&token(), "evt-123", &vacation())
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_of_missing_event_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/calendars/primary/events/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    calendar(&server)
        .await
        .delete_event(&token(), "gone")
        .await
        .unwrap();
}

#[tokio::test]
async fn server_errors_are_sync_failures() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("rateLimitExceeded"))
        .mount(&server)
        .await;

    let calendar = calendar(&server).await;

    match calendar.delete_event(&token(), "evt-1").await {
        Err(CalNoteError::SyncFailed(msg)) => assert!(msg.contains("backend error")),
        other => panic!("expected SyncFailed, got {other:?}"),
    }
    assert!(matches!(
        calendar.create_event(&token(), &vacation()).await,
        Err(CalNoteError::SyncFailed(_))
    ));
}

#[tokio::test]
async fn unreachable_server_is_a_sync_failure() {
    let calendar = GoogleCalendar::new("primary").with_base_url("http://127.0.0.1:1");
    assert!(matches!(
        calendar.list_events(&token(), &window()).await,
        Err(CalNoteError::SyncFailed(_))
    ));
}
