//! Deterministic mock provider, used when no API key is configured.

use super::{GenerationParams, ProviderError, ProviderResponse, ReportPrompt, ReportProvider};
use async_trait::async_trait;

pub const MOCK_MODEL: &str = "mock";

/// Build the demo report, citing whichever inputs were supplied.
pub fn mock_report(question: &str, file_text: &str, live_text: &str) -> String {
    let mut sources = Vec::new();
    let mut idx = 1;
    if !file_text.trim().is_empty() {
        sources.push(format!("[{}] Uploaded Files combined (user files)", idx));
        idx += 1;
    }
    if !live_text.trim().is_empty() {
        sources.push(format!("[{}] Live feed updates (ingested)", idx));
    }
    if sources.is_empty() {
        sources.push("[1] General knowledge / no sources provided".to_string());
    }

    let mut lines = vec![
        format!("# Research Report: {}\n", question),
        "## Key Takeaways".to_string(),
        "- This is a mock key takeaway generated for demo purposes.".to_string(),
        "- The assistant will use uploaded files and live feed when available.".to_string(),
        "\n## Abstract".to_string(),
        "This mock report demonstrates the Smart Research Assistant functionality.".to_string(),
        "\n## Introduction".to_string(),
        "The system ingests documents and live feeds, then synthesizes answers with citations."
            .to_string(),
        "\n## Detailed Findings".to_string(),
        "Detailed analysis would come from the LLM in production. Example reference: [1]."
            .to_string(),
        "\n## Conclusion".to_string(),
        "Mock conclusion.".to_string(),
        "\n## Sources:".to_string(),
    ];
    lines.extend(sources);
    lines.join("\n\n")
}

#[derive(Debug, Default, Clone)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReportProvider for MockProvider {
    async fn generate(
        &self,
        prompt: &ReportPrompt,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let text = mock_report(&prompt.question, &prompt.file_text, &prompt.live_text);

        Ok(ProviderResponse {
            input_tokens: (prompt.system.len() + prompt.user.len()) as u32 / 4,
            output_tokens: text.len() as u32 / 4,
            text,
            model: MOCK_MODEL.to_string(),
            mocked: true,
        })
    }

    fn model(&self) -> &str {
        MOCK_MODEL
    }

    fn is_mock(&self) -> bool {
        true
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
