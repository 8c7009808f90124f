//! LLM response parsing.
//!
//! Responses are expected to be JSON, possibly wrapped in markdown code
//! fences. Parse failures never propagate: each parser degrades to a
//! low-confidence default that carries the error and a slice of the raw
//! response for the operator to inspect.

use serde_json::Value;
use tracing::warn;

use runbook_domain::incident::enums::{ProblemCategory, RiskLevel, Severity};
use runbook_domain::incident::value_objects::{
    ActionRecommendation, Classification, DiagnosticResult, RecommendationSet,
};

/// Strip markdown code fences and parse the remaining text as JSON.
fn extract_json(raw: &str) -> Result<Value, serde_json::Error> {
    let text = raw.trim();
    let text = if text.starts_with("```") {
        text.lines()
            .filter(|line| !line.trim_start().starts_with("```"))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        text.to_string()
    };
    serde_json::from_str(&text)
}

fn truncated(raw: &str, max: usize) -> &str {
    let end = raw
        .char_indices()
        .nth(max)
        .map(|(index, _)| index)
        .unwrap_or(raw.len());
    &raw[..end]
}

/// Parse a classification response, degrading to unknown on failure.
pub fn parse_classification(raw: &str) -> Classification {
    match extract_json(raw) {
        Ok(data) => Classification {
            category: enum_field(&data, "category").unwrap_or(ProblemCategory::Unknown),
            severity: enum_field(&data, "severity").unwrap_or(Severity::Medium),
            confidence: data["confidence"].as_f64().unwrap_or(0.0),
            reasoning: data["reasoning"].as_str().unwrap_or("").to_string(),
        },
        Err(e) => {
            warn!(error = %e, "failed to parse classification response");
            Classification::unknown(format!(
                "Parse error: {e}. Raw response: {}",
                truncated(raw, 200)
            ))
        }
    }
}

/// Parse a diagnosis response, degrading to a zero-confidence result that
/// carries the raw text as its evidence.
pub fn parse_diagnostic_result(raw: &str) -> DiagnosticResult {
    match extract_json(raw) {
        Ok(data) => DiagnosticResult {
            root_cause: data["root_cause"].as_str().unwrap_or("Unknown").to_string(),
            evidence_summary: data["evidence_summary"].as_str().unwrap_or("").to_string(),
            confidence: data["confidence"].as_f64().unwrap_or(0.0),
            contributing_factors: string_list(&data, "contributing_factors"),
            affected_components: string_list(&data, "affected_components"),
        },
        Err(e) => {
            warn!(error = %e, "failed to parse diagnostic result");
            DiagnosticResult {
                root_cause: "Parse error, raw response available".to_string(),
                evidence_summary: truncated(raw, 500).to_string(),
                confidence: 0.0,
                contributing_factors: Vec::new(),
                affected_components: Vec::new(),
            }
        }
    }
}

/// Parse a recommendation response, degrading to an empty set whose summary
/// names the failure.
pub fn parse_recommendation_set(raw: &str) -> RecommendationSet {
    match extract_json(raw) {
        Ok(data) => {
            let recommendations = data["recommendations"]
                .as_array()
                .map(|items| items.iter().map(parse_recommendation).collect())
                .unwrap_or_default();
            RecommendationSet {
                recommendations,
                summary: data["summary"].as_str().unwrap_or("").to_string(),
                requires_immediate_action: data["requires_immediate_action"]
                    .as_bool()
                    .unwrap_or(false),
            }
        }
        Err(e) => {
            warn!(error = %e, "failed to parse recommendation response");
            RecommendationSet {
                recommendations: Vec::new(),
                summary: format!("Parse error: {e}. Raw response: {}", truncated(raw, 200)),
                requires_immediate_action: false,
            }
        }
    }
}

fn parse_recommendation(item: &Value) -> ActionRecommendation {
    ActionRecommendation {
        description: item["description"].as_str().unwrap_or("").to_string(),
        risk_level: enum_field(item, "risk_level").unwrap_or(RiskLevel::Low),
        requires_approval: item["requires_approval"].as_bool().unwrap_or(false),
        integration: item["integration"].as_str().map(str::to_string),
        method: item["method"].as_str().map(str::to_string),
        params: item["params"].as_object().cloned().unwrap_or_default(),
        reasoning: item["reasoning"].as_str().unwrap_or("").to_string(),
    }
}

/// Clean up a raw prose summary: trim, and drop a leading markdown heading
/// if the model prepended one.
pub fn clean_summary(raw: &str) -> String {
    let text = raw.trim();
    let mut lines: Vec<&str> = text.lines().collect();
    if lines.first().is_some_and(|line| line.starts_with('#')) {
        lines.remove(0);
    }
    lines.join("\n").trim().to_string()
}

fn enum_field<T: serde::de::DeserializeOwned>(data: &Value, key: &str) -> Option<T> {
    serde_json::from_value(data[key].clone()).ok()
}

fn string_list(data: &Value, key: &str) -> Vec<String> {
    data[key]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
