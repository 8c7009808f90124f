//! Anthropic-backed ML engine.
//!
//! Calls the Messages API over HTTP. Response parsing degrades inside the
//! parsers; only transport and API failures surface as
//! [`RunbookError::MlEngine`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use runbook_application::ports::ml_engine::MlEngine;
use runbook_domain::incident::entities::{Finding, Incident};
use runbook_domain::incident::value_objects::{
    Classification, DiagnosticResult, RecommendationSet,
};
use runbook_domain::RunbookError;

use super::parsing;
use super::prompts::PromptBuilder;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicEngine {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl AnthropicEngine {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, RunbookError> {
        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "system": system,
            "messages": [{"role": "user", "content": user}],
        });

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| RunbookError::MlEngine(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RunbookError::MlEngine(format!(
                "API returned {status}: {detail}"
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| RunbookError::MlEngine(format!("invalid response body: {e}")))?;

        let text = parsed
            .content
            .first()
            .map(|block| block.text.clone())
            .unwrap_or_default();
        debug!(chars = text.len(), "ml engine response received");
        Ok(text)
    }
}

#[async_trait]
impl MlEngine for AnthropicEngine {
    async fn classify(&self, problem_description: &str) -> Result<Classification, RunbookError> {
        let raw = self
            .complete(
                PromptBuilder::classification_system(),
                &PromptBuilder::classification_user(problem_description),
                1024,
            )
            .await?;
        Ok(parsing::parse_classification(&raw))
    }

    async fn diagnose(
        &self,
        problem_description: &str,
        findings: &[Finding],
    ) -> Result<DiagnosticResult, RunbookError> {
        let raw = self
            .complete(
                PromptBuilder::diagnosis_system(),
                &PromptBuilder::diagnosis_user(problem_description, findings),
                2048,
            )
            .await?;
        Ok(parsing::parse_diagnostic_result(&raw))
    }

    async fn recommend(
        &self,
        problem_description: &str,
        diagnosis: &DiagnosticResult,
        findings: &[Finding],
    ) -> Result<RecommendationSet, RunbookError> {
        let raw = self
            .complete(
                PromptBuilder::resolution_system(),
                &PromptBuilder::resolution_user(problem_description, diagnosis, findings),
                2048,
            )
            .await?;
        Ok(parsing::parse_recommendation_set(&raw))
    }

    async fn summarize(&self, incident: &Incident) -> Result<String, RunbookError> {
        let raw = self
            .complete(
                PromptBuilder::summarization_system(),
                &PromptBuilder::summarization_user(incident),
                2048,
            )
            .await?;
        Ok(parsing::clean_summary(&raw))
    }
}
