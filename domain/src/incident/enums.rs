//! Incident enumerations
//!
//! All enums serialize to their lowercase snake_case names, matching the
//! runbook YAML schema and provider wire formats.

use serde::{Deserialize, Serialize};

/// Severity of an incident or alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Risk level of an action. Drives the approval policy lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of an incident.
///
/// Transitions are forward-only, with one exception: the orchestrator moves
/// `Verifying` back to `Diagnosing` during retry cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    #[default]
    New,
    Triaged,
    Diagnosing,
    AwaitingApproval,
    Executing,
    Verifying,
    Resolved,
    Closed,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::New => "new",
            IncidentStatus::Triaged => "triaged",
            IncidentStatus::Diagnosing => "diagnosing",
            IncidentStatus::AwaitingApproval => "awaiting_approval",
            IncidentStatus::Executing => "executing",
            IncidentStatus::Verifying => "verifying",
            IncidentStatus::Resolved => "resolved",
            IncidentStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What kind of work an action represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Gather,
    MlDecision,
    Execute,
    Notify,
}

/// Problem category assigned by classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProblemCategory {
    Compute,
    Network,
    Database,
    Deployment,
    Storage,
    Security,
    Application,
    #[default]
    Unknown,
}

impl ProblemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemCategory::Compute => "compute",
            ProblemCategory::Network => "network",
            ProblemCategory::Database => "database",
            ProblemCategory::Deployment => "deployment",
            ProblemCategory::Storage => "storage",
            ProblemCategory::Security => "security",
            ProblemCategory::Application => "application",
            ProblemCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ProblemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of evidence a finding represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingType {
    Alert,
    MetricAnomaly,
    LogPattern,
    Configuration,
    RecentChange,
    Correlation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"critical\"");
        assert_eq!(serde_json::to_string(&RiskLevel::Low).unwrap(), "\"low\"");
        assert_eq!(
            serde_json::to_string(&IncidentStatus::AwaitingApproval).unwrap(),
            "\"awaiting_approval\""
        );
        assert_eq!(
            serde_json::to_string(&FindingType::RecentChange).unwrap(),
            "\"recent_change\""
        );
        assert_eq!(
            serde_json::to_string(&ActionType::MlDecision).unwrap(),
            "\"ml_decision\""
        );
    }

    #[test]
    fn enums_deserialize_from_yaml_names() {
        let sev: Severity = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(sev, Severity::High);
        let cat: ProblemCategory = serde_json::from_str("\"deployment\"").unwrap();
        assert_eq!(cat, ProblemCategory::Deployment);
    }

    #[test]
    fn defaults_match_new_incident_expectations() {
        assert_eq!(Severity::default(), Severity::Medium);
        assert_eq!(RiskLevel::default(), RiskLevel::Low);
        assert_eq!(IncidentStatus::default(), IncidentStatus::New);
        assert_eq!(ProblemCategory::default(), ProblemCategory::Unknown);
    }
}
