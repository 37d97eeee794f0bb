//! Regression tests for the realtime event feed.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use patrika::api::NotificationEvent;
use patrika::config::Config;
use std::sync::Arc;
use tower::ServiceExt;

const DEFAULT_API_KEY: &str = "patrika_default_api_key_please_regenerate";

async fn spawn_app(event_bus_buffer: usize) -> (Arc<patrika::api::AppState>, Router) {
    let db_path =
        std::env::temp_dir().join(format!("patrika-events-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.general.event_bus_buffer_size = event_bus_buffer;

    let state = patrika::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");

    let router = patrika::api::router(state.clone()).await;
    (state, router)
}

async fn next_frame_text(body: &mut Body) -> String {
    let frame = body
        .frame()
        .await
        .expect("stream ended unexpectedly")
        .expect("stream errored");
    let data = frame.into_data().expect("expected a data frame");
    String::from_utf8(data.to_vec()).expect("frame was not utf-8")
}

#[tokio::test]
async fn recording_a_visit_notifies_subscribers() {
    let (state, app) = spawn_app(100).await;
    let mut rx = state.event_bus().subscribe();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/visits")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"device":"Mobile","platform":"Android","path":"/archive"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let event = rx.recv().await.expect("no event published");
    assert!(
        matches!(
            event,
            NotificationEvent::VisitRecorded { ref device, ref path, .. }
                if device == "Mobile" && path == "/archive"
        ),
        "unexpected event: {event:?}"
    );
}

#[tokio::test]
async fn publishing_an_issue_notifies_subscribers() {
    let (state, app) = spawn_app(100).await;
    let mut rx = state.event_bus().subscribe();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/publications")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{
                        "title": "Festival Issue",
                        "cover_url": "https://example.com/cover.png",
                        "flipbook_url": "https://example.com/flip"
                    }"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let event = rx.recv().await.expect("no event published");
    assert!(
        matches!(
            event,
            NotificationEvent::PublicationCreated { ref title, .. } if title == "Festival Issue"
        ),
        "unexpected event: {event:?}"
    );
}

#[tokio::test]
async fn sse_stream_delivers_published_events() {
    let (state, app) = spawn_app(100).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/events")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = response.into_body();

    state
        .event_bus()
        .send(NotificationEvent::SettingsChanged)
        .expect("no subscribers");

    let text = next_frame_text(&mut body).await;
    assert!(
        text.contains("SettingsChanged"),
        "unexpected frame: {text}"
    );
}

#[tokio::test]
async fn lagged_client_gets_a_warning_then_retained_events() {
    // Buffer of one: a subscriber that has not polled yet drops all but the
    // newest event and observes the lag on its next read.
    let (state, app) = spawn_app(1).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/events")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = response.into_body();

    for id in 1..=3 {
        state
            .event_bus()
            .send(NotificationEvent::NoticeDeleted { id })
            .expect("no subscribers");
    }

    // Dropped events are not replayed; the client is told it missed some
    let text = next_frame_text(&mut body).await;
    assert!(text.contains("event: warning"), "unexpected frame: {text}");
    assert!(text.contains("Missed some events"), "unexpected frame: {text}");

    // The stream then resumes with the newest retained event
    let text = next_frame_text(&mut body).await;
    assert!(text.contains("NoticeDeleted"), "unexpected frame: {text}");
    assert!(text.contains("\"id\":3"), "unexpected frame: {text}");
}
