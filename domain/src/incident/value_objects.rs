//! Value objects produced by the ML capability and the verification stage.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::enums::{ProblemCategory, RiskLevel, Severity};

/// Result of ML problem classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub category: ProblemCategory,
    pub severity: Severity,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

impl Classification {
    /// Degraded fallback used when classification fails or cannot be parsed.
    pub fn unknown(reasoning: impl Into<String>) -> Self {
        Self {
            category: ProblemCategory::Unknown,
            severity: Severity::Medium,
            confidence: 0.0,
            reasoning: reasoning.into(),
        }
    }
}

/// Output of the ML diagnostic analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub root_cause: String,
    #[serde(default)]
    pub evidence_summary: String,
    pub confidence: f64,
    #[serde(default)]
    pub contributing_factors: Vec<String>,
    #[serde(default)]
    pub affected_components: Vec<String>,
}

/// A single recommended action from the ML engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecommendation {
    pub description: String,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub requires_approval: bool,
    pub integration: Option<String>,
    pub method: Option<String>,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub reasoning: String,
}

/// A ranked set of action recommendations from the ML engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecommendationSet {
    #[serde(default)]
    pub recommendations: Vec<ActionRecommendation>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub requires_immediate_action: bool,
}

/// Outcome of a verification pass over monitoring alerts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub resolved: bool,
    pub active_alert_count: usize,
    pub cleared_alert_count: usize,
    pub attempts: usize,
    pub detail: String,
}

impl VerificationResult {
    pub fn unresolved(attempts: usize, detail: impl Into<String>) -> Self {
        Self {
            resolved: false,
            active_alert_count: 0,
            cleared_alert_count: 0,
            attempts,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_classification_is_degraded() {
        let c = Classification::unknown("parse error");
        assert_eq!(c.category, ProblemCategory::Unknown);
        assert_eq!(c.severity, Severity::Medium);
        assert_eq!(c.confidence, 0.0);
        assert_eq!(c.reasoning, "parse error");
    }

    #[test]
    fn recommendation_set_deserializes_with_defaults() {
        let set: RecommendationSet = serde_json::from_str(r#"{"summary": "do things"}"#).unwrap();
        assert!(set.recommendations.is_empty());
        assert!(!set.requires_immediate_action);
    }

    #[test]
    fn recommendation_without_integration_parses() {
        let rec: ActionRecommendation = serde_json::from_str(
            r#"{"description": "Update the prod config", "risk_level": "low"}"#,
        )
        .unwrap();
        assert!(rec.integration.is_none());
        assert!(!rec.requires_approval);
    }
}
