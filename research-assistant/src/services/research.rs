//! The report pipeline: credit check, extraction, prompt, provider call,
//! post-processing and billing.
//!
//! A failed run leaves the workspace untouched; credits are only charged once
//! the report text exists.

use crate::config::LlmSettings;
use crate::models::{ExtractedDocument, Report, ResearchWorkspace};
use crate::services::extraction::extract_document;
use crate::services::metrics;
use crate::services::prompt::{build_prompt, combined_sources};
use crate::services::providers::mock::mock_report;
use crate::services::providers::{
    GenerationParams, ProviderError, ProviderResponse, ReportPrompt, ReportProvider,
};
use crate::services::report::{extract_key_takeaways, resolve_sources};
use chrono::Utc;
use serde::Deserialize;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;
use validator::Validate;

/// The research question as submitted by the form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuestionForm {
    #[validate(length(min = 1, message = "Please enter a research question."))]
    pub question: String,
}

/// A file received with the research request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct ResearchRequest {
    pub question: String,
    pub uploads: Vec<Upload>,
}

pub struct ResearchService {
    provider: Arc<dyn ReportProvider>,
    params: GenerationParams,
    fallback_to_mock: bool,
}

impl ResearchService {
    pub fn new(provider: Arc<dyn ReportProvider>, settings: &LlmSettings) -> Self {
        Self {
            provider,
            params: GenerationParams::from(settings),
            fallback_to_mock: settings.fallback_to_mock,
        }
    }

    pub fn provider(&self) -> &Arc<dyn ReportProvider> {
        &self.provider
    }

    /// Label used in metrics and logs.
    pub fn provider_mode(&self) -> &'static str {
        if self.provider.is_mock() {
            "mock"
        } else {
            "openai"
        }
    }

    /// Generate a report for the question and record it in the workspace.
    pub async fn generate(
        &self,
        workspace: &mut ResearchWorkspace,
        request: ResearchRequest,
    ) -> Result<Report, AppError> {
        let form = QuestionForm {
            question: request.question.trim().to_string(),
        };
        form.validate()?;
        let question = form.question;

        if let Err(e) = workspace.credits.ensure_available() {
            tracing::warn!(
                remaining = workspace.credits.remaining,
                required = workspace.credits.cost_per_report,
                "Report refused: insufficient credits"
            );
            metrics::record_report(self.provider_mode(), "refused");
            return Err(e.into());
        }

        let documents = self.extract_all(request.uploads).await?;

        let prompt = build_prompt(&question, &documents, &workspace.live_feed);
        let sources = combined_sources(&documents, &workspace.live_feed);

        tracing::info!(
            question_len = question.len(),
            documents = documents.len(),
            live_updates = workspace.live_feed.len(),
            provider = self.provider_mode(),
            "Generating report"
        );

        let response = self.call_provider(&prompt).await?;

        let now = Utc::now();
        let report = Report {
            key_takeaways: extract_key_takeaways(&response.text),
            sources: resolve_sources(&response.text, &sources),
            question: question.clone(),
            body: response.text,
            model: response.model,
            mocked: response.mocked,
            generated_at: now,
        };

        let record = workspace.credits.charge(&question, now)?;
        workspace.questions += 1;
        workspace.reports += 1;
        if !documents.is_empty() {
            workspace.sources = documents.into_iter().map(|d| d.name).collect();
        }
        workspace.last_report = Some(report.clone());

        metrics::record_credits_charged(record.cost);
        tracing::info!(
            model = %report.model,
            mocked = report.mocked,
            sources = report.sources.len(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            credits_remaining = workspace.credits.remaining,
            "Report generated"
        );

        Ok(report)
    }

    async fn extract_all(&self, uploads: Vec<Upload>) -> Result<Vec<ExtractedDocument>, AppError> {
        let mut documents = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let size = upload.bytes.len();
            match extract_document(upload.name, upload.content_type, upload.bytes).await {
                Ok(doc) => {
                    tracing::debug!(
                        file_name = %doc.name,
                        kind = doc.kind.as_str(),
                        bytes = size,
                        chars = doc.text.chars().count(),
                        "Extracted document text"
                    );
                    documents.push(doc);
                }
                Err(e) => {
                    tracing::warn!(error = %e, kind = e.kind(), "Document extraction failed");
                    metrics::record_extraction_failure(e.kind());
                    metrics::record_report(self.provider_mode(), "extraction_failed");
                    return Err(e.into());
                }
            }
        }
        Ok(documents)
    }

    async fn call_provider(&self, prompt: &ReportPrompt) -> Result<ProviderResponse, AppError> {
        let mode = self.provider_mode();
        let start = Instant::now();
        let result = self.provider.generate(prompt, &self.params).await;
        let elapsed = start.elapsed().as_secs_f64();

        match result {
            Ok(response) => {
                metrics::record_provider_latency(mode, "success", elapsed);
                metrics::record_report(mode, "success");
                Ok(response)
            }
            Err(e) => {
                metrics::record_provider_latency(mode, e.kind(), elapsed);
                tracing::error!(
                    error = %e,
                    kind = e.kind(),
                    model = %self.provider.model(),
                    "Report provider call failed"
                );

                if self.fallback_to_mock {
                    metrics::record_report(mode, "fallback");
                    return Ok(fallback_response(prompt, &e));
                }

                metrics::record_report(mode, "error");
                Err(e.into())
            }
        }
    }
}

/// Mock report prefixed with the provider error.
fn fallback_response(prompt: &ReportPrompt, error: &ProviderError) -> ProviderResponse {
    let text = format!(
        "(LLM error: {})\n\n{}",
        error,
        mock_report(&prompt.question, &prompt.file_text, &prompt.live_text)
    );

    ProviderResponse {
        text,
        model: crate::services::providers::mock::MOCK_MODEL.to_string(),
        input_tokens: 0,
        output_tokens: 0,
        mocked: true,
    }
}
