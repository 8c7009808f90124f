//! Runbook definitions.
//!
//! A [`Runbook`] is deserialized from YAML and then semantically validated:
//! structural shape is serde's job, cross-step rules live in
//! [`Runbook::validate`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::incident::enums::{ProblemCategory, RiskLevel, Severity};
use crate::integration::category::IntegrationCategory;

/// The three kinds of work a runbook step can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Gather,
    Execute,
    MlDecision,
}

impl StepAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepAction::Gather => "gather",
            StepAction::Execute => "execute",
            StepAction::MlDecision => "ml_decision",
        }
    }

    /// Gather and execute steps call a provider; ml_decision calls the ML
    /// engine instead.
    pub fn needs_integration(&self) -> bool {
        matches!(self, StepAction::Gather | StepAction::Execute)
    }
}

impl std::fmt::Display for StepAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single step in a runbook definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunbookStep {
    pub id: String,
    pub action: StepAction,
    pub description: String,
    pub integration: Option<String>,
    pub method: Option<String>,
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Step IDs whose results feed an ml_decision step as context.
    #[serde(default)]
    pub context: Vec<String>,
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default)]
    pub risk_level: RiskLevel,
}

impl RunbookStep {
    /// Per-step semantic checks. Returns a human-readable reason on failure.
    fn validate(&self) -> Result<(), String> {
        if self.action.needs_integration() {
            let Some(integration) = self.integration.as_deref() else {
                return Err(format!(
                    "Step '{}' (action={}) requires 'integration'",
                    self.id, self.action
                ));
            };
            let Some(method) = self.method.as_deref() else {
                return Err(format!(
                    "Step '{}' (action={}) requires 'method'",
                    self.id, self.action
                ));
            };
            let Some(category) = IntegrationCategory::parse(integration) else {
                return Err(format!(
                    "Step '{}': unknown integration '{}'. Valid: {}",
                    self.id,
                    integration,
                    IntegrationCategory::ALL.map(|c| c.as_str()).join(", ")
                ));
            };
            if !category.has_method(method) {
                return Err(format!(
                    "Step '{}': unknown method '{}' for integration '{}'. Valid: {}",
                    self.id,
                    method,
                    integration,
                    category.methods().join(", ")
                ));
            }
        }
        Ok(())
    }
}

/// A fully validated runbook loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runbook {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Human-readable trigger condition; informational, never evaluated.
    pub trigger: Option<String>,
    pub severity: Option<Severity>,
    pub category: Option<ProblemCategory>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub steps: Vec<RunbookStep>,
    /// Set by the parser after loading; not part of the YAML schema.
    #[serde(skip)]
    pub source_path: Option<String>,
}

impl Runbook {
    /// Cross-step semantic validation. Returns a human-readable reason on
    /// the first failure.
    pub fn validate(&self) -> Result<(), String> {
        for step in &self.steps {
            step.validate()?;
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut duplicates: Vec<&str> = Vec::new();
        for step in &self.steps {
            if !seen.insert(step.id.as_str()) {
                duplicates.push(step.id.as_str());
            }
        }
        if !duplicates.is_empty() {
            duplicates.sort_unstable();
            duplicates.dedup();
            return Err(format!("Duplicate step IDs: {}", duplicates.join(", ")));
        }

        for step in &self.steps {
            for reference in &step.context {
                if !seen.contains(reference.as_str()) {
                    return Err(format!(
                        "Step '{}' references unknown step ID '{}' in context",
                        step.id, reference
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn get_step(&self, step_id: &str) -> Option<&RunbookStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gather_step(id: &str) -> RunbookStep {
        RunbookStep {
            id: id.to_string(),
            action: StepAction::Gather,
            description: "gather alerts".to_string(),
            integration: Some("monitoring".to_string()),
            method: Some("get_current_alerts".to_string()),
            params: Map::new(),
            context: Vec::new(),
            requires_approval: false,
            risk_level: RiskLevel::Low,
        }
    }

    fn runbook(steps: Vec<RunbookStep>) -> Runbook {
        Runbook {
            name: "test".to_string(),
            description: String::new(),
            trigger: None,
            severity: None,
            category: None,
            tags: Vec::new(),
            steps,
            source_path: None,
        }
    }

    #[test]
    fn valid_runbook_passes() {
        assert!(runbook(vec![gather_step("a"), gather_step("b")]).validate().is_ok());
    }

    #[test]
    fn gather_without_integration_is_rejected() {
        let mut step = gather_step("a");
        step.integration = None;
        let err = runbook(vec![step]).validate().unwrap_err();
        assert!(err.contains("requires 'integration'"), "{err}");
    }

    #[test]
    fn gather_without_method_is_rejected() {
        let mut step = gather_step("a");
        step.method = None;
        let err = runbook(vec![step]).validate().unwrap_err();
        assert!(err.contains("requires 'method'"), "{err}");
    }

    #[test]
    fn vendor_mode_as_integration_is_rejected() {
        // "datadog" is a mode of the monitoring category, not a category
        let mut step = gather_step("a");
        step.integration = Some("datadog".to_string());
        let err = runbook(vec![step]).validate().unwrap_err();
        assert!(err.contains("unknown integration 'datadog'"), "{err}");
    }

    #[test]
    fn method_outside_allow_list_is_rejected() {
        let mut step = gather_step("a");
        step.method = Some("drop_tables".to_string());
        let err = runbook(vec![step]).validate().unwrap_err();
        assert!(err.contains("unknown method 'drop_tables'"), "{err}");
    }

    #[test]
    fn duplicate_step_ids_are_rejected() {
        let err = runbook(vec![gather_step("a"), gather_step("a")])
            .validate()
            .unwrap_err();
        assert!(err.contains("Duplicate step IDs: a"), "{err}");
    }

    #[test]
    fn context_must_reference_existing_steps() {
        let decision = RunbookStep {
            id: "decide".to_string(),
            action: StepAction::MlDecision,
            description: "correlate".to_string(),
            integration: None,
            method: None,
            params: Map::new(),
            context: vec!["missing".to_string()],
            requires_approval: false,
            risk_level: RiskLevel::Low,
        };
        let err = runbook(vec![gather_step("a"), decision]).validate().unwrap_err();
        assert!(err.contains("unknown step ID 'missing'"), "{err}");
    }

    #[test]
    fn ml_decision_needs_no_integration() {
        let decision = RunbookStep {
            id: "decide".to_string(),
            action: StepAction::MlDecision,
            description: "correlate".to_string(),
            integration: None,
            method: None,
            params: Map::new(),
            context: vec!["a".to_string()],
            requires_approval: false,
            risk_level: RiskLevel::Low,
        };
        assert!(runbook(vec![gather_step("a"), decision]).validate().is_ok());
    }
}
