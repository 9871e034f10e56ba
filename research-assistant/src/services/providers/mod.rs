//! LLM provider abstractions and implementations.
//!
//! The report pipeline talks to a [`ReportProvider`]; the OpenAI-compatible
//! chat-completions client is used when an API key is configured, the
//! deterministic mock otherwise.

pub mod mock;
pub mod openai;

use crate::config::LlmSettings;
use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use mock::MockProvider;
use openai::{OpenAiConfig, OpenAiProvider};

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Authentication with the model API failed: {0}")]
    Unauthorized(String),

    #[error("Rate limited by the model API")]
    RateLimited { retry_after: Option<u64> },

    #[error("Model API timed out")]
    Timeout,

    #[error("Model API returned no text")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::Unauthorized(_) => "unauthorized",
            ProviderError::RateLimited { .. } => "rate_limited",
            ProviderError::Timeout => "timeout",
            ProviderError::EmptyResponse => "empty_response",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited { retry_after } => AppError::TooManyRequests(
                "The model API is rate limiting requests. Please try again shortly.".to_string(),
                retry_after,
            ),
            ProviderError::Timeout => {
                AppError::GatewayTimeout("the model API did not answer in time".to_string())
            }
            ProviderError::NotConfigured(_) => AppError::ServiceUnavailable,
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

/// System and user messages sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPrompt {
    pub system: String,
    pub user: String,
    /// Inputs kept alongside the rendered prompt so the mock can cite them.
    pub question: String,
    pub file_text: String,
    pub live_text: String,
}

/// Generation parameters for report requests.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 1500,
        }
    }
}

/// Result of a provider call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Set when the text was produced by the mock provider.
    pub mocked: bool,
}

/// Report generation backend.
#[async_trait]
pub trait ReportProvider: Send + Sync {
    /// Generate report text for the prompt.
    async fn generate(
        &self,
        prompt: &ReportPrompt,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Model identifier, for logs and metrics.
    fn model(&self) -> &str;

    /// `true` for the built-in mock.
    fn is_mock(&self) -> bool {
        false
    }

    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// OpenAI client when an API key is configured, the mock otherwise.
pub fn from_settings(settings: &LlmSettings) -> Result<Arc<dyn ReportProvider>, ProviderError> {
    if !settings.has_api_key() {
        tracing::warn!("No LLM API key configured, serving mock reports");
        return Ok(Arc::new(MockProvider::new()));
    }

    let provider = OpenAiProvider::new(OpenAiConfig {
        api_key: settings.api_key.clone(),
        base_url: settings.base_url.clone(),
        model: settings.model.clone(),
        timeout: Duration::from_secs(settings.timeout_seconds),
    })?;

    tracing::info!(
        model = %settings.model,
        base_url = %settings.base_url,
        "Initialized OpenAI-compatible provider"
    );

    Ok(Arc::new(provider))
}

impl From<&LlmSettings> for GenerationParams {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use secrecy::Secret;

    #[test]
    fn missing_api_key_selects_mock() {
        let settings = Settings::for_testing();
        let provider = from_settings(&settings.llm).unwrap();
        assert!(provider.is_mock());
        assert_eq!(provider.model(), mock::MOCK_MODEL);
    }

    #[test]
    fn api_key_selects_openai() {
        let mut settings = Settings::for_testing();
        settings.llm.api_key = Secret::new("sk-live".to_string());
        let provider = from_settings(&settings.llm).unwrap();
        assert!(!provider.is_mock());
        assert_eq!(provider.model(), "gpt-4o-mini");
    }

    #[test]
    fn provider_errors_map_to_http_statuses() {
        use axum::http::StatusCode;

        let cases = [
            (ProviderError::RateLimited { retry_after: None }, StatusCode::TOO_MANY_REQUESTS),
            (ProviderError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (ProviderError::Unauthorized("bad key".into()), StatusCode::BAD_GATEWAY),
            (ProviderError::EmptyResponse, StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }
}
