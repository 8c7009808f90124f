//! Incident aggregate entities
//!
//! The [`Incident`] is the aggregate root owned by the caller of the
//! orchestrator. Use cases mutate it in place and hand it back; nothing in
//! this crate stores incidents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::enums::{ActionType, FindingType, IncidentStatus, ProblemCategory, RiskLevel, Severity};
use super::value_objects::Classification;
use crate::core::id::short_id;

/// A piece of evidence discovered while gathering context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub finding_type: FindingType,
    /// Which system produced the evidence (e.g. "monitoring", "ticketing").
    pub source: String,
    /// One-line human-readable summary.
    pub summary: String,
    #[serde(default)]
    pub details: Map<String, Value>,
    /// Confidence weight in `[0.0, 1.0]`.
    pub confidence: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Finding {
    pub fn new(
        finding_type: FindingType,
        source: impl Into<String>,
        summary: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: format!("find-{}", short_id()),
            finding_type,
            source: source.into(),
            summary: summary.into(),
            details: Map::new(),
            confidence: confidence.clamp(0.0, 1.0),
            timestamp: Some(Utc::now()),
        }
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = details;
        self
    }
}

/// Approval decision state of an action.
///
/// Modeled as an explicit three-state machine rather than `Option<bool>`:
/// `Undecided` actions are awaiting the gate, `Approved` actions may
/// execute, `Rejected` actions never execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    #[default]
    Undecided,
    Approved,
    Rejected,
}

/// A remediation or notification the system proposes or performs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub action_type: ActionType,
    pub description: String,
    pub risk_level: RiskLevel,
    pub requires_approval: bool,

    // Decision state
    #[serde(default)]
    pub decision: Decision,
    /// Distinct approver identifiers in the order they approved.
    #[serde(default)]
    pub approvals: Vec<String>,
    /// Most recent distinct approver, or `"auto"` for policy auto-approval.
    pub approved_by: Option<String>,
    pub rejected_by: Option<String>,

    // Integration target (absent means the action is informational)
    pub integration: Option<String>,
    pub method: Option<String>,
    #[serde(default)]
    pub params: Map<String, Value>,

    // Execution state
    pub result: Option<Map<String, Value>>,
    pub executed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl Action {
    pub fn new(action_type: ActionType, description: impl Into<String>) -> Self {
        Self {
            id: format!("act-{}", short_id()),
            action_type,
            description: description.into(),
            risk_level: RiskLevel::Low,
            requires_approval: false,
            decision: Decision::Undecided,
            approvals: Vec::new(),
            approved_by: None,
            rejected_by: None,
            integration: None,
            method: None,
            params: Map::new(),
            result: None,
            executed_at: None,
            error: None,
        }
    }

    pub fn with_risk(mut self, risk_level: RiskLevel, requires_approval: bool) -> Self {
        self.risk_level = risk_level;
        self.requires_approval = requires_approval;
        self
    }

    pub fn with_target(
        mut self,
        integration: impl Into<String>,
        method: impl Into<String>,
        params: Map<String, Value>,
    ) -> Self {
        self.integration = Some(integration.into());
        self.method = Some(method.into());
        self.params = params;
        self
    }

    pub fn is_approved(&self) -> bool {
        self.decision == Decision::Approved
    }

    pub fn is_rejected(&self) -> bool {
        self.decision == Decision::Rejected
    }

    pub fn is_undecided(&self) -> bool {
        self.decision == Decision::Undecided
    }

    /// Informational actions have no integration target and execute as no-ops.
    pub fn is_informational(&self) -> bool {
        self.integration.is_none() || self.method.is_none()
    }
}

/// A single append-only audit record on an incident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub summary: String,
    #[serde(default)]
    pub details: Map<String, Value>,
    pub source: Option<String>,
}

impl TimelineEntry {
    pub fn new(event_type: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type: event_type.into(),
            summary: summary.into(),
            details: Map::new(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = details;
        self
    }
}

/// Top-level incident tracking all diagnostic activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    /// Short title derived from the description (at most 120 characters).
    pub title: String,
    pub description: String,
    pub status: IncidentStatus,
    pub severity: Severity,
    pub category: ProblemCategory,
    pub classification: Option<Classification>,
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
    pub created_at: Option<DateTime<Utc>>,
    /// Set iff `status == Resolved`.
    pub resolved_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Incident {
    /// Create a fresh incident from a free-text problem report.
    pub fn from_report(description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            id: format!("INC-{}", short_id()),
            title: truncate_title(&description, 120),
            description,
            status: IncidentStatus::New,
            severity: Severity::Medium,
            category: ProblemCategory::Unknown,
            classification: None,
            findings: Vec::new(),
            actions: Vec::new(),
            timeline: Vec::new(),
            created_at: Some(Utc::now()),
            resolved_at: None,
            summary: None,
            metadata: Map::new(),
        }
    }

    /// Append an audit entry. The timeline is append-only; entries are never
    /// removed or rewritten.
    pub fn record(&mut self, entry: TimelineEntry) {
        self.timeline.push(entry);
    }

    pub fn find_action(&self, action_id: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == action_id)
    }

    pub fn find_action_mut(&mut self, action_id: &str) -> Option<&mut Action> {
        self.actions.iter_mut().find(|a| a.id == action_id)
    }
}

/// Truncate on a char boundary so multi-byte descriptions stay valid.
fn truncate_title(description: &str, max_chars: usize) -> String {
    description.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_report_derives_truncated_title() {
        let long = "x".repeat(200);
        let incident = Incident::from_report(long.clone());
        assert_eq!(incident.title.chars().count(), 120);
        assert_eq!(incident.description, long);
        assert_eq!(incident.status, IncidentStatus::New);
        assert!(incident.id.starts_with("INC-"));
        assert!(incident.created_at.is_some());
        assert!(incident.resolved_at.is_none());
    }

    #[test]
    fn short_report_title_is_untruncated() {
        let incident = Incident::from_report("CPU is pegged on prod-web-03");
        assert_eq!(incident.title, "CPU is pegged on prod-web-03");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let report = "é".repeat(150);
        let incident = Incident::from_report(report);
        assert_eq!(incident.title.chars().count(), 120);
    }

    #[test]
    fn record_appends_in_order() {
        let mut incident = Incident::from_report("test");
        incident.record(TimelineEntry::new("created", "Incident created"));
        incident.record(TimelineEntry::new("classified", "Classified"));
        assert_eq!(incident.timeline.len(), 2);
        assert_eq!(incident.timeline[0].event_type, "created");
        assert_eq!(incident.timeline[1].event_type, "classified");
        assert!(incident.timeline[0].timestamp <= incident.timeline[1].timestamp);
    }

    #[test]
    fn action_decision_defaults_to_undecided() {
        let action = Action::new(ActionType::Execute, "Restart the service");
        assert!(action.is_undecided());
        assert!(!action.is_approved());
        assert!(!action.is_rejected());
        assert!(action.is_informational());
    }

    #[test]
    fn action_with_target_is_not_informational() {
        let action = Action::new(ActionType::Execute, "Restart")
            .with_target("compute", "restart_service", Map::new());
        assert!(!action.is_informational());
    }

    #[test]
    fn find_action_locates_by_id() {
        let mut incident = Incident::from_report("test");
        let action = Action::new(ActionType::Notify, "Tell someone");
        let id = action.id.clone();
        incident.actions.push(action);
        assert!(incident.find_action(&id).is_some());
        assert!(incident.find_action("act-missing").is_none());
    }
}
