//! ML capability port.
//!
//! Implementations are interchangeable: an LLM-backed engine or a canned
//! mock for deterministic tests. Response parsing is the implementation's
//! responsibility - a parse failure must degrade to a low-confidence default
//! rather than surface as an error. [`RunbookError::MlEngine`] is reserved
//! for non-degradable failures (transport, authentication).

use async_trait::async_trait;

use runbook_domain::RunbookError;
use runbook_domain::incident::entities::{Finding, Incident};
use runbook_domain::incident::value_objects::{
    Classification, DiagnosticResult, RecommendationSet,
};

#[async_trait]
pub trait MlEngine: Send + Sync {
    /// Classify a problem description into category + severity.
    async fn classify(&self, problem_description: &str) -> Result<Classification, RunbookError>;

    /// Analyze gathered evidence and determine root cause.
    async fn diagnose(
        &self,
        problem_description: &str,
        findings: &[Finding],
    ) -> Result<DiagnosticResult, RunbookError>;

    /// Produce ranked action recommendations based on a diagnosis.
    async fn recommend(
        &self,
        problem_description: &str,
        diagnosis: &DiagnosticResult,
        findings: &[Finding],
    ) -> Result<RecommendationSet, RunbookError>;

    /// Generate a human-readable narrative summary of an incident.
    async fn summarize(&self, incident: &Incident) -> Result<String, RunbookError>;
}
