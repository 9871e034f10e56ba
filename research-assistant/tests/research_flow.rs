mod common;

use common::TestApp;
use reqwest::StatusCode;
use research_assistant::config::Settings;
use research_assistant::services::export::{to_docx, to_pdf};
use std::io::Cursor;

const TXT: &str = "text/plain";
const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const PDF: &str = "application/pdf";

#[tokio::test]
async fn txt_upload_produces_a_cited_report() {
    let app = TestApp::spawn().await;

    let response = app
        .research(
            "components of DBMS",
            vec![("notes.txt", TXT, b"Query processor, storage manager.".to_vec())],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Final Report"));
    assert!(html.contains("Research Report: components of DBMS"));
    assert!(html.contains("[1] Uploaded Files combined (user files)"));
    assert!(html.contains("hx-swap-oob"));

    let ws = app.workspace().await;
    assert_eq!(ws["credits"]["used"], 1.0);
    assert_eq!(ws["credits"]["remaining"], 99.0);
    assert_eq!(ws["questions"], 1);
    assert_eq!(ws["reports"], 1);
    assert_eq!(ws["sources"], serde_json::json!(["notes.txt"]));
    assert_eq!(ws["credits"]["billing_log"][0]["question"], "components of DBMS");
}

#[tokio::test]
async fn generated_docx_and_pdf_uploads_are_extracted() {
    let app = TestApp::spawn().await;

    let docx = to_docx("Buffer pool management", "Notes").unwrap();
    let pdf = to_pdf("Transaction manager overview", "Notes").unwrap();

    let response = app
        .research(
            "storage internals",
            vec![("a.docx", DOCX, docx), ("b.pdf", PDF, pdf)],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let ws = app.workspace().await;
    assert_eq!(ws["sources"], serde_json::json!(["a.docx", "b.pdf"]));
}

#[tokio::test]
async fn plain_form_posts_redirect_home() {
    let app = TestApp::spawn().await;

    let form = reqwest::multipart::Form::new().text("question", "what is a B-tree");
    let response = app
        .client
        .post(app.url("/research"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()["location"], "/");

    let page = app.client.get(app.url("/")).send().await.unwrap().text().await.unwrap();
    assert!(page.contains("Research Report: what is a B-tree"));
}

#[tokio::test]
async fn unsupported_upload_is_rejected_without_charge() {
    let app = TestApp::spawn().await;

    let response = app
        .research("q", vec![("diagram.png", "image/png", vec![0x89, b'P', b'N', b'G'])])
        .await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(response.headers()["hx-retarget"], "#alerts");
    assert!(response.text().await.unwrap().contains("diagram.png"));

    let ws = app.workspace().await;
    assert_eq!(ws["credits"]["remaining"], 100.0);
    assert_eq!(ws["reports"], 0);
}

#[tokio::test]
async fn oversized_upload_is_rejected_with_the_limit() {
    let mut settings = Settings::for_testing();
    settings.http.max_upload_bytes = 1024;
    let app = TestApp::spawn_with(settings).await;

    let response = app
        .research("q", vec![("big.txt", TXT, vec![b'a'; 4 * 1024])])
        .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.headers()["hx-retarget"], "#alerts");
    assert!(response.text().await.unwrap().contains("1 KB"));

    let ws = app.workspace().await;
    assert_eq!(ws["reports"], 0);
}

#[tokio::test]
async fn empty_question_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app.research("   ", vec![]).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Please enter a research question."));
}

#[tokio::test]
async fn zero_credits_refuse_generation() {
    let mut settings = Settings::for_testing();
    settings.credits.initial = 0.0;
    let app = TestApp::spawn_with(settings).await;

    let response = app.research("q", vec![]).await;

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let ws = app.workspace().await;
    assert_eq!(ws["reports"], 0);
    assert!(ws["last_report"].is_null());
}

#[tokio::test]
async fn credits_run_out_after_the_last_report() {
    let mut settings = Settings::for_testing();
    settings.credits.initial = 1.0;
    let app = TestApp::spawn_with(settings).await;

    assert_eq!(app.research("first", vec![]).await.status(), StatusCode::OK);
    assert_eq!(
        app.research("second", vec![]).await.status(),
        StatusCode::PAYMENT_REQUIRED
    );

    let ws = app.workspace().await;
    assert_eq!(ws["credits"]["remaining"], 0.0);
    assert_eq!(ws["credits"]["used"], 1.0);
}

#[tokio::test]
async fn live_feed_is_newest_first_and_cited() {
    let app = TestApp::spawn().await;

    assert_eq!(
        app.ingest("First", "blog.example.com", "alpha").await.status(),
        StatusCode::OK
    );
    let fragment = app.ingest("Second", "", "beta").await.text().await.unwrap();
    assert!(fragment.find("Second").unwrap() < fragment.find("First").unwrap());

    let ws = app.workspace().await;
    assert_eq!(ws["live_feed"][0]["title"], "Second");
    assert_eq!(ws["live_feed"][0]["source"], "MockSource");
    assert_eq!(ws["live_feed"][1]["title"], "First");

    let html = app.research("q", vec![]).await.text().await.unwrap();
    assert!(html.contains("[1] Live feed updates (ingested)"));
}

#[tokio::test]
async fn live_feed_requires_title_and_content() {
    let app = TestApp::spawn().await;

    let response = app.ingest("  ", "src", "body").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Please provide a title for the live update."));

    let ws = app.workspace().await;
    assert_eq!(ws["live_feed"], serde_json::json!([]));
}

#[tokio::test]
async fn export_without_report_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/report/export/pdf"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("No report has been generated yet"));
}

#[tokio::test]
async fn unknown_export_format_is_not_found() {
    let app = TestApp::spawn().await;
    app.research("q", vec![]).await;

    let response = app
        .client
        .get(app.url("/report/export/odt"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn exports_are_parseable_documents() {
    let app = TestApp::spawn().await;
    app.research("components of DBMS", vec![]).await;

    let docx = app
        .client
        .get(app.url("/report/export/docx"))
        .send()
        .await
        .unwrap();
    assert_eq!(docx.status(), StatusCode::OK);
    assert_eq!(docx.headers()["content-type"], DOCX);
    assert_eq!(
        docx.headers()["content-disposition"],
        "attachment; filename=\"research_report.docx\""
    );
    let bytes = docx.bytes().await.unwrap();
    assert!(!bytes.is_empty());
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    assert!(archive.by_name("word/document.xml").is_ok());

    let pdf = app
        .client
        .get(app.url("/report/export/pdf"))
        .send()
        .await
        .unwrap();
    assert_eq!(pdf.status(), StatusCode::OK);
    assert_eq!(pdf.headers()["content-type"], PDF);
    let bytes = pdf.bytes().await.unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert!(!doc.get_pages().is_empty());
}

#[tokio::test]
async fn sessions_are_isolated() {
    let app = TestApp::spawn().await;
    app.research("mine", vec![]).await;

    let other = reqwest::Client::new();
    let ws: serde_json::Value = other
        .get(app.url("/api/workspace"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(ws["reports"], 0);
    assert_eq!(ws["credits"]["remaining"], 100.0);
}
