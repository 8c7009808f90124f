//! Error taxonomy
//!
//! A single root enum covers every named failure the engine can surface.
//! Layers attach context through the variant fields rather than wrapping
//! in layer-specific error types.

use thiserror::Error;

/// Root error type for the incident-response engine.
#[derive(Error, Debug)]
pub enum RunbookError {
    /// No provider is registered for the requested integration category,
    /// or the resolved mode has no constructor.
    #[error("No provider found for category '{category}'{}", .mode.as_deref().map(|m| format!(" (mode={m})")).unwrap_or_default())]
    ProviderNotFound {
        category: String,
        mode: Option<String>,
    },

    /// An integration provider call failed.
    #[error("[{provider}] {message}")]
    Integration { provider: String, message: String },

    /// An action requires human approval before execution.
    #[error("Action '{action_id}' requires approval (risk={risk_level})")]
    ApprovalRequired {
        action_id: String,
        risk_level: String,
    },

    /// A runbook YAML file could not be parsed or validated.
    #[error("Failed to parse runbook '{path}': {reason}")]
    RunbookParse { path: String, reason: String },

    /// The ML engine encountered a non-degradable error.
    #[error("ML engine error: {0}")]
    MlEngine(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RunbookError {
    /// Provider lookup failure for an unknown category.
    pub fn provider_not_found(category: impl Into<String>) -> Self {
        RunbookError::ProviderNotFound {
            category: category.into(),
            mode: None,
        }
    }

    /// Provider lookup failure for a known category whose resolved mode has
    /// no registered constructor.
    pub fn provider_mode_not_found(category: impl Into<String>, mode: impl Into<String>) -> Self {
        RunbookError::ProviderNotFound {
            category: category.into(),
            mode: Some(mode.into()),
        }
    }

    pub fn integration(provider: impl Into<String>, message: impl Into<String>) -> Self {
        RunbookError::Integration {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn parse(path: impl Into<String>, reason: impl Into<String>) -> Self {
        RunbookError::RunbookParse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_not_found_display_without_mode() {
        let err = RunbookError::provider_not_found("ticketing");
        assert_eq!(err.to_string(), "No provider found for category 'ticketing'");
    }

    #[test]
    fn provider_not_found_display_with_mode() {
        let err = RunbookError::provider_mode_not_found("monitoring", "datadog");
        assert_eq!(
            err.to_string(),
            "No provider found for category 'monitoring' (mode=datadog)"
        );
    }

    #[test]
    fn integration_error_carries_provider_prefix() {
        let err = RunbookError::integration("datadog", "connection refused");
        assert_eq!(err.to_string(), "[datadog] connection refused");
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = RunbookError::parse("restart.yaml", "duplicate step IDs");
        assert!(err.to_string().contains("restart.yaml"));
        assert!(err.to_string().contains("duplicate step IDs"));
    }
}
