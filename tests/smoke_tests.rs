//! Smoke tests for the core publish/read flows used by the frontend.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use patrika::config::Config;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app() -> (Arc<patrika::api::AppState>, Router, String) {
    let db_path =
        std::env::temp_dir().join(format!("patrika-smoke-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let state = patrika::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");

    let api_key = state
        .store()
        .get_user_by_username("admin")
        .await
        .expect("failed to fetch admin user")
        .expect("missing bootstrap admin user")
        .api_key;

    let router = patrika::api::router(state.clone()).await;
    (state, router, api_key)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn smoke_publication_lifecycle() {
    let (_, app, api_key) = spawn_app().await;

    // Create with a pasted Drive share link; it should come back normalized.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/publications")
                .header("X-Api-Key", &api_key)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{
                        "title": "January Issue",
                        "description": "New year special",
                        "cover_url": "https://drive.google.com/file/d/cov123/view?usp=sharing",
                        "flipbook_url": "https://example.com/flip/january",
                        "category": "Special Issue"
                    }"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(
        body["data"]["cover_url"],
        "https://lh3.googleusercontent.com/d/cov123"
    );
    // Publish-form defaults
    assert_eq!(body["data"]["is_latest"], true);
    assert_eq!(
        body["data"]["year"],
        chrono::Utc::now().format("%Y").to_string()
    );

    // Public list sees it without auth
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/publications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Category filter
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/publications?category=Monthly")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // Title search
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/publications?search=January")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Full update clears the latest badge
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/publications/{id}"))
                .header("X-Api-Key", &api_key)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{
                        "title": "January Issue (revised)",
                        "description": null,
                        "cover_url": "https://lh3.googleusercontent.com/d/cov123",
                        "flipbook_url": "https://example.com/flip/january",
                        "category": "Monthly",
                        "year": "2024",
                        "is_latest": false
                    }"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["title"], "January Issue (revised)");
    assert_eq!(body["data"]["is_latest"], false);

    // Delete, then the list is empty again
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/publications/{id}"))
                .header("X-Api-Key", &api_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/publications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // Deleting again is a 404
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/publications/{id}"))
                .header("X-Api-Key", &api_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn smoke_settings_roundtrip() {
    let (_, app, api_key) = spawn_app().await;

    // Save a map with an image-valued key pasted as a Drive link
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/settings")
                .header("X-Api-Key", &api_key)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{
                        "values": {
                            "headline": "The Weekly Patrika",
                            "logo_url": "https://drive.google.com/open?id=logo42"
                        },
                        "categories": ["Monthly", "Festival"]
                    }"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/settings")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["values"]["headline"], "The Weekly Patrika");
    assert_eq!(
        body["data"]["values"]["logo_url"],
        "https://lh3.googleusercontent.com/d/logo42"
    );
    assert_eq!(
        body["data"]["categories"],
        serde_json::json!(["Monthly", "Festival"])
    );

    // Footer endpoint only accepts its own keys
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/settings/footer")
                .header("X-Api-Key", &api_key)
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"values":{"headline":"nope"}}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/settings/footer")
                .header("X-Api-Key", &api_key)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"values":{"footer_email":"desk@example.com"}}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Important links round trip
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/settings/links")
                .header("X-Api-Key", &api_key)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"links":[{"title":"Archive","url":"https://example.com/archive"}]}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/settings/links")
                .header("X-Api-Key", &api_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"][0]["title"], "Archive");
}

#[tokio::test]
async fn smoke_notices_and_media() {
    let (_, app, api_key) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/notices")
                .header("X-Api-Key", &api_key)
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"content":"Office closed on Friday"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let notice_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["active"], true);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/notices")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/notices/{notice_id}"))
                .header("X-Api-Key", &api_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Media library
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/media")
                .header("X-Api-Key", &api_key)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{
                        "url": "https://drive.google.com/file/d/img9/view",
                        "title": "Divine background",
                        "file_name": "divine.png"
                    }"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body["data"]["url"],
        "https://lh3.googleusercontent.com/d/img9"
    );
    let media_id = body["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/media")
                .header("X-Api-Key", &api_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/media/{media_id}"))
                .header("X-Api-Key", &api_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn smoke_visits_and_analytics() {
    let (_, app, api_key) = spawn_app().await;

    // Client-provided device
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/visits")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"device":"Mobile","platform":"Android","path":"/"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Device derived from the User-Agent
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/visits")
                .header("Content-Type", "application/json")
                .header(
                    "User-Agent",
                    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0",
                )
                .body(Body::from(r#"{"path":"/publications"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/analytics/summary")
                .header("X-Api-Key", &api_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["total_visits"], 2);
    assert_eq!(body["data"]["visits_today"], 2);
    assert_eq!(body["data"]["publication_count"], 0);

    let devices = body["data"]["device_distribution"].as_array().unwrap();
    assert_eq!(devices.len(), 2);

    // Newest first, capped by limit
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/analytics/logs?limit=1")
                .header("X-Api-Key", &api_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Clear everything
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/analytics/logs")
                .header("X-Api-Key", &api_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"], 2);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/analytics/summary")
                .header("X-Api-Key", &api_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["total_visits"], 0);
}
