mod common;

use common::TestApp;
use reqwest::StatusCode;
use research_assistant::config::Settings;
use secrecy::Secret;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::for_testing();
    settings.llm.api_key = Secret::new("sk-test".to_string());
    settings.llm.base_url = format!("{}/v1", server.uri());
    settings
}

#[tokio::test]
async fn report_text_comes_from_the_chat_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content":
                "# Indexing\n\n## Key Takeaways\n- B-trees keep keys sorted [1]\n\n## Sources\n[1] notes.txt (uploaded file)"}}],
            "usage": {"prompt_tokens": 100, "completion_tokens": 20}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::spawn_with(settings_for(&server).await).await;

    let health: serde_json::Value = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["provider"], "openai");

    let response = app
        .research("how do indexes work", vec![("notes.txt", "text/plain", b"btree".to_vec())])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("B-trees keep keys sorted"));

    let ws = app.workspace().await;
    assert_eq!(ws["last_report"]["mocked"], false);
    assert_eq!(
        ws["last_report"]["sources"],
        json!(["[1] notes.txt (uploaded file)"])
    );
    assert_eq!(ws["credits"]["remaining"], 99.0);
}

#[tokio::test]
async fn rate_limits_surface_as_429_without_charge() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let app = TestApp::spawn_with(settings_for(&server).await).await;

    let response = app.research("q", vec![]).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["retry-after"], "7");

    let ws = app.workspace().await;
    assert_eq!(ws["credits"]["remaining"], 100.0);
    assert!(ws["last_report"].is_null());
}

#[tokio::test]
async fn auth_failures_are_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let app = TestApp::spawn_with(settings_for(&server).await).await;

    let response = app.research("q", vec![]).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn fallback_serves_mock_report_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut settings = settings_for(&server).await;
    settings.llm.fallback_to_mock = true;
    let app = TestApp::spawn_with(settings).await;

    let response = app.research("q", vec![]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("(LLM error:"));

    let ws = app.workspace().await;
    assert_eq!(ws["last_report"]["mocked"], true);
}

#[tokio::test]
async fn readiness_follows_the_model_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided"}
        })))
        .mount(&server)
        .await;

    let app = TestApp::spawn_with(settings_for(&server).await).await;

    let ready = app.client.get(app.url("/ready")).send().await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
    let body: serde_json::Value = ready.json().await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["provider"], "openai");

    let unready = app.client.get(app.url("/ready")).send().await.unwrap();
    assert_eq!(unready.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = unready.json().await.unwrap();
    assert_eq!(body["status"], "unavailable");
}
