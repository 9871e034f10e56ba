mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::TestApp;
use research_assistant::config::Settings;
use research_assistant::services::{providers, ResearchService};
use research_assistant::startup::build_router;
use research_assistant::AppState;
use tower::util::ServiceExt;

#[tokio::test]
async fn health_check_reports_provider_mode() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "research-assistant");
    assert_eq!(body["provider"], "mock");
}

#[tokio::test]
async fn mock_provider_is_always_ready() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/ready"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["provider"], "mock");
}

#[tokio::test]
async fn index_renders_with_security_headers() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("x-request-id"));

    let html = response.text().await.unwrap();
    assert!(html.contains("Smart Research Assistant"));
    assert!(html.contains("Credits Remaining:</b> 100.00"));
    assert!(html.contains("No live updates yet."));
}

#[tokio::test]
async fn stylesheet_is_served() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/static/app.css"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn metrics_expose_http_requests() {
    research_assistant::services::metrics::init_metrics().unwrap();
    let app = TestApp::spawn().await;

    app.client.get(app.url("/")).send().await.unwrap();
    let body = app
        .client
        .get(app.url("/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("http_requests_total"));
}

/// Router-level check without binding a socket.
#[tokio::test]
async fn fresh_workspace_snapshot_via_router() {
    let settings = Settings::for_testing();
    let provider = providers::from_settings(&settings.llm).unwrap();
    let research = ResearchService::new(provider, &settings.llm);
    let router = build_router(AppState::new(settings, research));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/workspace")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-security-policy"],
        "default-src 'none'; frame-ancestors 'none'"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["credits"]["remaining"], 100.0);
    assert_eq!(body["reports"], 0);
}
