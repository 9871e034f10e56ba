#![allow(dead_code)]

use reqwest::multipart::{Form, Part};
use research_assistant::config::Settings;
use research_assistant::startup::Application;
use serde_json::Value;
use std::time::Duration;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    /// Keeps the session cookie between requests.
    pub client: reqwest::Client,
}

impl TestApp {
    /// Mock provider, default credits.
    pub async fn spawn() -> Self {
        Self::spawn_with(Settings::for_testing()).await
    }

    pub async fn spawn_with(settings: Settings) -> Self {
        let app = Application::build(settings)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build client");

        // Wait for the server by polling the health endpoint
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        Self {
            address,
            port,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Submit the research form the way htmx does.
    pub async fn research(&self, question: &str, files: Vec<(&str, &str, Vec<u8>)>) -> reqwest::Response {
        let mut form = Form::new().text("question", question.to_string());
        for (name, mime, bytes) in files {
            let part = Part::bytes(bytes)
                .file_name(name.to_string())
                .mime_str(mime)
                .expect("valid mime type");
            form = form.part("files", part);
        }

        self.client
            .post(self.url("/research"))
            .header("HX-Request", "true")
            .multipart(form)
            .send()
            .await
            .expect("Failed to send research request")
    }

    pub async fn ingest(&self, title: &str, source: &str, content: &str) -> reqwest::Response {
        self.client
            .post(self.url("/live-feed"))
            .header("HX-Request", "true")
            .form(&[("title", title), ("source", source), ("content", content)])
            .send()
            .await
            .expect("Failed to send live feed request")
    }

    pub async fn workspace(&self) -> Value {
        self.client
            .get(self.url("/api/workspace"))
            .send()
            .await
            .expect("Failed to fetch workspace")
            .json()
            .await
            .expect("Workspace is JSON")
    }
}
