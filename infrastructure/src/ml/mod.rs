//! ML engine adapters.
//!
//! - [`prompts`] - prompt builders for each capability
//! - [`parsing`] - LLM response parsing with degraded defaults
//! - [`mock_engine`] - scenario-aware canned engine, no API key needed
//! - [`anthropic`] - Claude-backed engine over HTTP

pub mod anthropic;
pub mod mock_engine;
pub mod parsing;
pub mod prompts;

use std::sync::Arc;

use runbook_application::ports::ml_engine::MlEngine;

use crate::config::Settings;

pub use anthropic::AnthropicEngine;
pub use mock_engine::MockMlEngine;

/// Select the ML engine from configuration: the mock engine when requested
/// or when no API credential is present, otherwise the Anthropic engine.
pub fn build_ml_engine(settings: &Settings) -> Arc<dyn MlEngine> {
    if settings.ml_engine_provider == "mock" || settings.anthropic_api_key.is_empty() {
        Arc::new(MockMlEngine::new(settings))
    } else {
        Arc::new(AnthropicEngine::new(
            settings.anthropic_api_key.clone(),
            settings.ml_model.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_selects_the_mock_engine() {
        let settings = Settings::default();
        assert!(settings.anthropic_api_key.is_empty());
        // Just confirm construction succeeds; behavior is covered in
        // mock_engine tests.
        let _engine = build_ml_engine(&settings);
    }
}
