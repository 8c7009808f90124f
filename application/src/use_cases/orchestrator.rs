//! Orchestrator - the central workflow engine connecting the ML capability,
//! integration providers, and human approval.
//!
//! Lifecycle: classify → gather → diagnose → recommend → gate → execute →
//! verify → summarize. Every stage mutates the caller-owned incident in
//! place and appends timeline entries; the orchestrator itself holds no
//! incident state.

use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use runbook_domain::approval::evaluator::ApprovalEvaluator;
use runbook_domain::approval::policy::ApprovalPolicy;
use runbook_domain::incident::entities::{Action, Finding, Incident, TimelineEntry};
use runbook_domain::incident::enums::{ActionType, FindingType, IncidentStatus};
use runbook_domain::incident::value_objects::{
    ActionRecommendation, Classification, DiagnosticResult, RecommendationSet, VerificationResult,
};
use runbook_domain::integration::records::LogQuery;
use runbook_domain::RunbookError;

use crate::ports::dispatch;
use crate::ports::ml_engine::MlEngine;
use crate::ports::registry::ProviderRegistry;

/// Confidence weights per evidence source.
const ALERT_CONFIDENCE: f64 = 0.9;
const LOG_CONFIDENCE: f64 = 0.7;
const CHANGE_CONFIDENCE: f64 = 0.8;
const PROCESS_CONFIDENCE: f64 = 0.85;
const PAGER_CONFIDENCE: f64 = 0.9;

/// How far back to look for change records during gathering.
const CHANGE_TIMEFRAME: &str = "4h";
/// How many processes to snapshot per host.
const TOP_PROCESS_LIMIT: usize = 5;
/// How many log entries a log-pattern finding retains in its details.
const LOG_DETAIL_CAP: usize = 10;

pub struct Orchestrator {
    registry: Arc<dyn ProviderRegistry>,
    ml: Arc<dyn MlEngine>,
    evaluator: ApprovalEvaluator,
}

impl Orchestrator {
    pub fn new(registry: Arc<dyn ProviderRegistry>, ml: Arc<dyn MlEngine>) -> Self {
        Self::with_policy(registry, ml, ApprovalPolicy::default())
    }

    /// Construct with an explicit approval policy. The policy is scoped to
    /// this orchestrator, never a process-wide value.
    pub fn with_policy(
        registry: Arc<dyn ProviderRegistry>,
        ml: Arc<dyn MlEngine>,
        policy: ApprovalPolicy,
    ) -> Self {
        Self {
            registry,
            ml,
            evaluator: ApprovalEvaluator::new(policy),
        }
    }

    // ------------------------------------------------------------------
    // 1. Create & classify
    // ------------------------------------------------------------------

    /// Create a new incident from a problem description and classify it.
    ///
    /// A classification failure degrades to an unknown classification; the
    /// incident is always returned.
    pub async fn create_incident(&self, problem_description: &str) -> Incident {
        let mut incident = Incident::from_report(problem_description);
        incident.record(TimelineEntry::new("created", "Incident created from user report"));

        incident.status = IncidentStatus::Triaged;
        let classification = match self.ml.classify(problem_description).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!(error = %e, "classification failed; continuing with unknown");
                Classification::unknown(format!("Classification failed: {e}"))
            }
        };

        incident.severity = classification.severity;
        incident.category = classification.category;
        incident.record(
            TimelineEntry::new(
                "classified",
                format!(
                    "Classified as {} / {} (confidence: {:.0}%)",
                    classification.category,
                    classification.severity,
                    classification.confidence * 100.0
                ),
            )
            .with_source("ml_engine")
            .with_details(object(serde_json::json!({
                "reasoning": classification.reasoning.clone(),
            }))),
        );
        incident.classification = Some(classification);

        incident
    }

    // ------------------------------------------------------------------
    // 2. Gather context
    // ------------------------------------------------------------------

    /// Query the integrations for operational evidence.
    ///
    /// Each source is independently failure-isolated: a provider error is
    /// logged and that source contributes zero findings while the others
    /// proceed. The documented source order (monitoring alerts, monitoring
    /// logs, ticketing changes, compute, alerting) fixes the findings order.
    pub async fn gather_context(&self, incident: &mut Incident) -> Vec<Finding> {
        incident.status = IncidentStatus::Diagnosing;
        incident.record(TimelineEntry::new("gathering", "Gathering context from integrations"));

        let mut findings: Vec<Finding> = Vec::new();

        match self.gather_alerts().await {
            Ok(batch) => findings.extend(batch),
            Err(e) => warn!(error = %e, "failed to gather alerts"),
        }
        match self.gather_logs().await {
            Ok(batch) => findings.extend(batch),
            Err(e) => warn!(error = %e, "failed to gather logs"),
        }
        match self.gather_changes().await {
            Ok(batch) => findings.extend(batch),
            Err(e) => warn!(error = %e, "failed to gather changes"),
        }
        match self.gather_compute(TOP_PROCESS_LIMIT).await {
            Ok(batch) => findings.extend(batch),
            Err(e) => warn!(error = %e, "failed to gather compute data"),
        }
        match self.gather_pager_incidents().await {
            Ok(batch) => findings.extend(batch),
            Err(e) => warn!(error = %e, "failed to gather alerting data"),
        }

        incident.findings = findings.clone();
        incident.record(TimelineEntry::new(
            "context_gathered",
            format!("Gathered {} findings from integrations", findings.len()),
        ));
        findings
    }

    async fn gather_alerts(&self) -> Result<Vec<Finding>, RunbookError> {
        let monitoring = self.registry.monitoring()?;
        let alerts = monitoring.get_current_alerts(Map::new()).await?;
        Ok(alerts
            .into_iter()
            .map(|alert| {
                let summary = format!(
                    "[{}] {} on {} (value: {})",
                    alert.severity,
                    alert.name,
                    alert.host.as_deref().unwrap_or("unknown"),
                    alert.value.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string()),
                );
                Finding::new(FindingType::Alert, "monitoring", summary, ALERT_CONFIDENCE)
                    .with_details(dump_record(&alert))
            })
            .collect())
    }

    async fn gather_logs(&self) -> Result<Vec<Finding>, RunbookError> {
        let monitoring = self.registry.monitoring()?;
        let logs = monitoring.get_logs(LogQuery::all()).await?;
        if logs.is_empty() {
            return Ok(Vec::new());
        }
        let entries: Vec<Value> = logs
            .iter()
            .take(LOG_DETAIL_CAP)
            .map(|entry| serde_json::to_value(entry).unwrap_or(Value::Null))
            .collect();
        let finding = Finding::new(
            FindingType::LogPattern,
            "monitoring",
            format!("{} log entries gathered", logs.len()),
            LOG_CONFIDENCE,
        )
        .with_details(object(serde_json::json!({ "entries": entries })));
        Ok(vec![finding])
    }

    async fn gather_changes(&self) -> Result<Vec<Finding>, RunbookError> {
        let ticketing = self.registry.ticketing()?;
        let changes = ticketing.get_recent_changes(CHANGE_TIMEFRAME).await?;
        Ok(changes
            .into_iter()
            .map(|change| {
                let summary = format!("Change {}: {}", change.number, change.description);
                Finding::new(FindingType::RecentChange, "ticketing", summary, CHANGE_CONFIDENCE)
                    .with_details(dump_record(&change))
            })
            .collect())
    }

    async fn gather_compute(&self, limit: usize) -> Result<Vec<Finding>, RunbookError> {
        let compute = self.registry.compute()?;
        let host = compute.get_host_info("").await?;
        let processes = compute.get_top_processes(&host.hostname, limit).await?;
        let Some(top) = processes.first() else {
            return Ok(Vec::new());
        };
        let summary = format!(
            "Top process: {} at {}% CPU on {}",
            top.name, top.cpu_percent, host.hostname
        );
        let finding = Finding::new(
            FindingType::MetricAnomaly,
            "compute",
            summary,
            PROCESS_CONFIDENCE,
        )
        .with_details(object(serde_json::json!({
            "host": host,
            "processes": processes,
        })));
        Ok(vec![finding])
    }

    async fn gather_pager_incidents(&self) -> Result<Vec<Finding>, RunbookError> {
        let alerting = self.registry.alerting()?;
        let incidents = alerting.get_active_incidents().await?;
        Ok(incidents
            .into_iter()
            .map(|pager| {
                let summary = format!("Pager: {} (status: {})", pager.title, pager.status);
                Finding::new(FindingType::Alert, "alerting", summary, PAGER_CONFIDENCE)
                    .with_details(dump_record(&pager))
            })
            .collect())
    }

    // ------------------------------------------------------------------
    // 3. Diagnose
    // ------------------------------------------------------------------

    /// Run ML diagnosis over the gathered findings.
    pub async fn diagnose(&self, incident: &mut Incident) -> Result<DiagnosticResult, RunbookError> {
        incident.record(TimelineEntry::new("diagnosing", "Running ML diagnosis"));

        let diagnosis = self
            .ml
            .diagnose(&incident.description, &incident.findings)
            .await?;

        incident.record(
            TimelineEntry::new(
                "diagnosed",
                format!(
                    "Root cause: {} (confidence: {:.0}%)",
                    diagnosis.root_cause,
                    diagnosis.confidence * 100.0
                ),
            )
            .with_source("ml_engine")
            .with_details(object(serde_json::json!({
                "contributing_factors": diagnosis.contributing_factors.clone(),
                "affected_components": diagnosis.affected_components.clone(),
            }))),
        );
        Ok(diagnosis)
    }

    // ------------------------------------------------------------------
    // 4. Recommend
    // ------------------------------------------------------------------

    /// Generate action recommendations and attach them to the incident.
    pub async fn recommend(
        &self,
        incident: &mut Incident,
        diagnosis: &DiagnosticResult,
    ) -> Result<RecommendationSet, RunbookError> {
        let set = self
            .ml
            .recommend(&incident.description, diagnosis, &incident.findings)
            .await?;

        for recommendation in &set.recommendations {
            incident.actions.push(recommendation_to_action(recommendation));
        }

        incident.status = IncidentStatus::AwaitingApproval;
        incident.record(
            TimelineEntry::new(
                "recommended",
                format!(
                    "{} actions recommended - {}",
                    set.recommendations.len(),
                    set.summary
                ),
            )
            .with_source("ml_engine"),
        );
        Ok(set)
    }

    // ------------------------------------------------------------------
    // 5. Approval gate
    // ------------------------------------------------------------------

    /// Actions that still require human approval.
    pub fn pending_approvals(&self, incident: &Incident) -> Vec<Action> {
        self.evaluator
            .pending(&incident.actions)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Record an approval for a specific action.
    ///
    /// Multi-approver policies apply: the action flips to approved only when
    /// the threshold is met. Returns the updated action, or None if the id
    /// is unknown.
    pub fn approve_action(
        &self,
        incident: &mut Incident,
        action_id: &str,
        approved_by: &str,
    ) -> Option<Action> {
        let action = incident.find_action_mut(action_id)?;
        let now_approved = self.evaluator.add_approval(action, approved_by);
        let needed = self.evaluator.minimum_approvals(action);
        let snapshot = action.clone();

        let (event, summary) = if now_approved {
            (
                "approved",
                format!("Action fully approved: {}", snapshot.description),
            )
        } else {
            (
                "approval_recorded",
                format!(
                    "Approval recorded ({} of {} needed): {}",
                    snapshot.approvals.len(),
                    needed,
                    snapshot.description
                ),
            )
        };
        incident.record(TimelineEntry::new(event, summary).with_details(object(
            serde_json::json!({
                "action_id": action_id,
                "approved_by": approved_by,
                "approvals": snapshot.approvals.clone(),
            }),
        )));
        Some(snapshot)
    }

    /// Reject a specific action. Returns the updated action, or None if the
    /// id is unknown.
    pub fn reject_action(
        &self,
        incident: &mut Incident,
        action_id: &str,
        rejected_by: &str,
    ) -> Option<Action> {
        let action = incident.find_action_mut(action_id)?;
        self.evaluator.reject(action, rejected_by);
        let snapshot = action.clone();

        incident.record(
            TimelineEntry::new(
                "rejected",
                format!("Action rejected: {}", snapshot.description),
            )
            .with_details(object(serde_json::json!({
                "action_id": action_id,
                "rejected_by": rejected_by,
            }))),
        );
        Some(snapshot)
    }

    /// Auto-approve every action the policy does not require a human for.
    pub fn auto_approve_low_risk(&self, incident: &mut Incident) -> Vec<Action> {
        let auto_approved = self.evaluator.apply_auto_approvals(&mut incident.actions);
        for action in &auto_approved {
            incident.record(TimelineEntry::new(
                "auto_approved",
                format!("Auto-approved (policy: auto): {}", action.description),
            ));
        }
        auto_approved
    }

    // ------------------------------------------------------------------
    // 6. Execute
    // ------------------------------------------------------------------

    /// Execute all approved actions that have not been executed yet, in
    /// incident order. Failures are isolated per action.
    pub async fn execute_approved_actions(&self, incident: &mut Incident) -> Vec<Action> {
        incident.status = IncidentStatus::Executing;
        let mut executed = Vec::new();

        for index in 0..incident.actions.len() {
            let pending = {
                let action = &incident.actions[index];
                action.is_approved() && action.executed_at.is_none()
            };
            if !pending {
                continue;
            }

            let (details, succeeded) = self.execute_single_action(incident, index).await;
            let action = incident.actions[index].clone();
            incident.record(
                TimelineEntry::new(
                    "executed",
                    format!(
                        "Executed: {} - {}",
                        action.description,
                        if succeeded { "success" } else { "failed" }
                    ),
                )
                .with_details(details),
            );
            executed.push(action);
        }

        executed
    }

    /// Run one action through the integration layer. Returns the timeline
    /// details and whether the call succeeded.
    async fn execute_single_action(
        &self,
        incident: &mut Incident,
        index: usize,
    ) -> (Map<String, Value>, bool) {
        let (integration, method, params) = {
            let action = &incident.actions[index];
            (
                action.integration.clone(),
                action.method.clone(),
                action.params.clone(),
            )
        };

        let (Some(integration), Some(method)) = (integration, method) else {
            let action = &mut incident.actions[index];
            action.executed_at = Some(Utc::now());
            let result = object(serde_json::json!({
                "status": "skipped",
                "reason": "No integration/method specified",
            }));
            action.result = Some(result.clone());
            return (result, true);
        };

        let outcome = dispatch::call(self.registry.as_ref(), &integration, &method, &params).await;
        let action = &mut incident.actions[index];
        action.executed_at = Some(Utc::now());
        match outcome {
            Ok(result) => {
                action.result = Some(result.clone());
                (result, true)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "action execution failed");
                action.error = Some(message.clone());
                let details = object(serde_json::json!({
                    "status": "error",
                    "error": message,
                }));
                (details, false)
            }
        }
    }

    // ------------------------------------------------------------------
    // 7. Verify
    // ------------------------------------------------------------------

    /// Re-query monitoring to check whether the problem is resolved.
    ///
    /// Zero active alerts means resolved. A provider error yields an
    /// unresolved result with a descriptive detail instead of propagating.
    pub async fn verify(&self, incident: &mut Incident, attempt: usize) -> VerificationResult {
        incident.status = IncidentStatus::Verifying;
        incident.record(TimelineEntry::new(
            "verifying",
            format!("Verification attempt {attempt}"),
        ));

        let alerts = match self.alert_snapshot().await {
            Ok(alerts) => alerts,
            Err(e) => {
                warn!(error = %e, "verification error");
                incident.record(TimelineEntry::new(
                    "verification_error",
                    format!("Verification error: {e}"),
                ));
                return VerificationResult::unresolved(attempt, format!("Verification error: {e}"));
            }
        };

        let active = alerts.iter().filter(|a| a.is_active()).count();
        let cleared = alerts.len() - active;
        let resolved = active == 0;

        if resolved {
            incident.status = IncidentStatus::Resolved;
            incident.resolved_at = Some(Utc::now());
            incident.record(TimelineEntry::new(
                "resolved",
                "Verification passed - no active alerts",
            ));
        } else {
            incident.record(TimelineEntry::new(
                "verification_failed",
                format!("Attempt {attempt}: {active} alerts still active"),
            ));
        }

        VerificationResult {
            resolved,
            active_alert_count: active,
            cleared_alert_count: cleared,
            attempts: attempt,
            detail: if resolved {
                "No active alerts".to_string()
            } else {
                format!("{active} alerts still firing")
            },
        }
    }

    async fn alert_snapshot(
        &self,
    ) -> Result<Vec<runbook_domain::integration::records::Alert>, RunbookError> {
        let monitoring = self.registry.monitoring()?;
        monitoring.get_current_alerts(Map::new()).await
    }

    /// Retry verification up to `max_attempts` times, sleeping
    /// `interval_seconds` between attempts (never before the first).
    pub async fn verify_with_retry(
        &self,
        incident: &mut Incident,
        max_attempts: usize,
        interval_seconds: f64,
    ) -> VerificationResult {
        let mut result = VerificationResult::unresolved(0, "not attempted");
        for attempt in 1..=max_attempts.max(1) {
            if attempt > 1 {
                tokio::time::sleep(Duration::from_secs_f64(interval_seconds)).await;
            }
            result = self.verify(incident, attempt).await;
            if result.resolved {
                break;
            }
        }
        result
    }

    // ------------------------------------------------------------------
    // 8. Summarize
    // ------------------------------------------------------------------

    /// Generate a narrative summary and store it on the incident.
    pub async fn summarize(&self, incident: &mut Incident) -> Result<String, RunbookError> {
        let summary = self.ml.summarize(incident).await?;
        incident.summary = Some(summary.clone());
        incident.record(
            TimelineEntry::new("summarized", "Incident summary generated").with_source("ml_engine"),
        );
        Ok(summary)
    }

    // ------------------------------------------------------------------
    // Convenience workflows
    // ------------------------------------------------------------------

    /// Run the diagnostic workflow up to the approval gate: create, classify,
    /// gather, diagnose, recommend, auto-approve. The returned incident is
    /// in awaiting_approval status with actions populated.
    pub async fn run_diagnosis(&self, problem_description: &str) -> Result<Incident, RunbookError> {
        let mut incident = self.create_incident(problem_description).await;
        self.gather_context(&mut incident).await;
        let diagnosis = self.diagnose(&mut incident).await?;
        self.recommend(&mut incident, &diagnosis).await?;
        self.auto_approve_low_risk(&mut incident);
        Ok(incident)
    }

    /// End-to-end workflow: diagnose, execute approved actions, verify with
    /// retry, summarize. Actions still awaiting human approval are left
    /// pending; only approved actions execute.
    pub async fn run_full_workflow(
        &self,
        problem_description: &str,
        verify_max_attempts: usize,
        verify_interval_seconds: f64,
    ) -> Result<(Incident, VerificationResult), RunbookError> {
        let mut incident = self.run_diagnosis(problem_description).await?;
        info!(incident_id = %incident.id, "diagnosis complete; executing approved actions");
        self.execute_approved_actions(&mut incident).await;
        let verification = self
            .verify_with_retry(&mut incident, verify_max_attempts, verify_interval_seconds)
            .await;
        self.summarize(&mut incident).await?;
        Ok((incident, verification))
    }
}

fn recommendation_to_action(recommendation: &ActionRecommendation) -> Action {
    let action_type = if recommendation.integration.is_some() {
        ActionType::Execute
    } else {
        ActionType::Notify
    };
    let mut action = Action::new(action_type, recommendation.description.clone())
        .with_risk(recommendation.risk_level, recommendation.requires_approval);
    action.integration = recommendation.integration.clone();
    action.method = recommendation.method.clone();
    action.params = recommendation.params.clone();
    action
}

fn dump_record<T: serde::Serialize>(record: &T) -> Map<String, Value> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::test_support::{StubMlEngine, StubRegistry};
    use runbook_domain::approval::policy::{ApprovalPolicy, ThresholdPolicy};
    use runbook_domain::incident::enums::{ProblemCategory, RiskLevel, Severity};
    use serde_json::json;

    fn recommendations() -> RecommendationSet {
        serde_json::from_value(json!({
            "summary": "Restart the service, then notify the team.",
            "requires_immediate_action": true,
            "recommendations": [
                {
                    "description": "Restart the java service on prod-web-03",
                    "risk_level": "medium",
                    "requires_approval": true,
                    "integration": "compute",
                    "method": "restart_service",
                    "params": {"host": "prod-web-03", "service": "java"},
                },
                {
                    "description": "Notify the platform-alerts channel",
                    "risk_level": "low",
                    "requires_approval": false,
                    "integration": "communication",
                    "method": "send_message",
                    "params": {"channel": "platform-alerts", "message": "Investigating"},
                },
                {
                    "description": "Update the production change calendar",
                    "risk_level": "low",
                    "requires_approval": false,
                },
            ],
        }))
        .unwrap()
    }

    fn orchestrator(registry: StubRegistry, ml: StubMlEngine) -> Orchestrator {
        Orchestrator::new(Arc::new(registry), Arc::new(ml))
    }

    #[tokio::test]
    async fn create_incident_classifies_and_records_timeline() {
        let orch = orchestrator(StubRegistry::default(), StubMlEngine::default());
        let incident = orch.create_incident("High CPU on prod-web-03").await;

        assert_eq!(incident.status, IncidentStatus::Triaged);
        assert_eq!(incident.category, ProblemCategory::Compute);
        assert_eq!(incident.severity, Severity::High);
        assert!(incident.classification.is_some());

        let events: Vec<&str> = incident.timeline.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(events, vec!["created", "classified"]);
    }

    #[tokio::test]
    async fn create_incident_degrades_on_classify_failure() {
        let ml = StubMlEngine {
            fail_classify: true,
            ..Default::default()
        };
        let orch = orchestrator(StubRegistry::default(), ml);
        let incident = orch.create_incident("Something is broken").await;

        assert_eq!(incident.status, IncidentStatus::Triaged);
        assert_eq!(incident.category, ProblemCategory::Unknown);
        let classification = incident.classification.unwrap();
        assert_eq!(classification.confidence, 0.0);
        assert!(classification.reasoning.contains("Classification failed"));
    }

    #[tokio::test]
    async fn gather_context_collects_from_all_sources_in_order() {
        let registry = StubRegistry::default().with_default_evidence();
        let orch = orchestrator(registry, StubMlEngine::default());
        let mut incident = Incident::from_report("test");

        let findings = orch.gather_context(&mut incident).await;

        let sources: Vec<&str> = findings.iter().map(|f| f.source.as_str()).collect();
        assert_eq!(
            sources,
            vec!["monitoring", "monitoring", "ticketing", "compute", "alerting"]
        );
        assert_eq!(incident.status, IncidentStatus::Diagnosing);
        assert_eq!(incident.findings.len(), findings.len());

        // Per-source confidence weights
        assert_eq!(findings[0].confidence, 0.9);
        assert_eq!(findings[1].confidence, 0.7);
        assert_eq!(findings[2].confidence, 0.8);
        assert_eq!(findings[3].confidence, 0.85);
        assert_eq!(findings[4].confidence, 0.9);

        let last = incident.timeline.last().unwrap();
        assert_eq!(last.event_type, "context_gathered");
        assert!(last.summary.contains("5 findings"));
    }

    #[tokio::test]
    async fn gather_failure_is_isolated_to_one_source() {
        let registry = StubRegistry::default()
            .with_default_evidence()
            .failing("ticketing");
        let orch = orchestrator(registry, StubMlEngine::default());
        let mut incident = Incident::from_report("test");

        let findings = orch.gather_context(&mut incident).await;

        let sources: Vec<&str> = findings.iter().map(|f| f.source.as_str()).collect();
        assert_eq!(sources, vec!["monitoring", "monitoring", "compute", "alerting"]);
    }

    #[tokio::test]
    async fn recommend_turns_recommendations_into_actions() {
        let ml = StubMlEngine::default().with_recommendations(recommendations());
        let orch = orchestrator(StubRegistry::default(), ml);
        let mut incident = Incident::from_report("test");

        let diagnosis = orch.diagnose(&mut incident).await.unwrap();
        orch.recommend(&mut incident, &diagnosis).await.unwrap();

        assert_eq!(incident.status, IncidentStatus::AwaitingApproval);
        assert_eq!(incident.actions.len(), 3);
        assert_eq!(incident.actions[0].action_type, ActionType::Execute);
        assert_eq!(incident.actions[1].action_type, ActionType::Execute);
        // No integration target means an informational notify action
        assert_eq!(incident.actions[2].action_type, ActionType::Notify);
        assert!(incident.actions[2].is_informational());
    }

    #[tokio::test]
    async fn two_distinct_approvers_clear_a_critical_action() {
        let orch = orchestrator(StubRegistry::default(), StubMlEngine::default());
        let mut incident = Incident::from_report("test");
        let action = Action::new(ActionType::Execute, "Failover the database")
            .with_risk(RiskLevel::Critical, true);
        let action_id = action.id.clone();
        incident.actions.push(action);

        let after_alice = orch.approve_action(&mut incident, &action_id, "alice").unwrap();
        assert!(after_alice.is_undecided());

        // Duplicate approver keeps the action undecided
        let after_repeat = orch.approve_action(&mut incident, &action_id, "alice").unwrap();
        assert!(after_repeat.is_undecided());

        let after_bob = orch.approve_action(&mut incident, &action_id, "bob").unwrap();
        assert!(after_bob.is_approved());
        assert_eq!(after_bob.approved_by.as_deref(), Some("bob"));
        assert_eq!(after_bob.approvals, vec!["alice", "bob"]);

        let events: Vec<&str> = incident.timeline.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(events, vec!["approval_recorded", "approval_recorded", "approved"]);
    }

    #[tokio::test]
    async fn reject_action_records_timeline() {
        let orch = orchestrator(StubRegistry::default(), StubMlEngine::default());
        let mut incident = Incident::from_report("test");
        let action = Action::new(ActionType::Execute, "Scale down").with_risk(RiskLevel::High, true);
        let action_id = action.id.clone();
        incident.actions.push(action);

        let rejected = orch.reject_action(&mut incident, &action_id, "carol").unwrap();
        assert!(rejected.is_rejected());
        assert_eq!(incident.timeline.last().unwrap().event_type, "rejected");
        assert!(orch.pending_approvals(&incident).is_empty());
    }

    #[tokio::test]
    async fn auto_approve_leaves_gated_actions_pending() {
        let ml = StubMlEngine::default().with_recommendations(recommendations());
        let orch = orchestrator(StubRegistry::default(), ml);
        let mut incident = Incident::from_report("test");
        let diagnosis = orch.diagnose(&mut incident).await.unwrap();
        orch.recommend(&mut incident, &diagnosis).await.unwrap();

        let auto = orch.auto_approve_low_risk(&mut incident);
        assert_eq!(auto.len(), 2);

        let pending = orch.pending_approvals(&incident);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].description, "Restart the java service on prod-web-03");
    }

    #[tokio::test]
    async fn execute_runs_approved_actions_and_skips_informational() {
        let ml = StubMlEngine::default().with_recommendations(recommendations());
        let registry = StubRegistry::default();
        let state = Arc::clone(&registry.state);
        let orch = orchestrator(registry, ml);
        let mut incident = Incident::from_report("test");
        let diagnosis = orch.diagnose(&mut incident).await.unwrap();
        orch.recommend(&mut incident, &diagnosis).await.unwrap();
        orch.auto_approve_low_risk(&mut incident);

        let executed = orch.execute_approved_actions(&mut incident).await;

        // The gated restart is not executed; the notify and the informational
        // action are.
        assert_eq!(executed.len(), 2);
        assert_eq!(incident.status, IncidentStatus::Executing);
        assert!(incident.actions[0].executed_at.is_none());
        assert_eq!(state.sent_messages.lock().unwrap().len(), 1);

        let informational = &incident.actions[2];
        assert_eq!(
            informational.result.as_ref().unwrap()["status"],
            json!("skipped")
        );
        assert!(informational.executed_at.is_some());
    }

    #[tokio::test]
    async fn execute_isolates_per_action_failures() {
        let ml = StubMlEngine::default().with_recommendations(recommendations());
        let registry = StubRegistry::default().failing("compute");
        let state = Arc::clone(&registry.state);
        let orch = orchestrator(registry, ml);
        let mut incident = Incident::from_report("test");
        let diagnosis = orch.diagnose(&mut incident).await.unwrap();
        orch.recommend(&mut incident, &diagnosis).await.unwrap();
        let restart_id = incident.actions[0].id.clone();
        orch.approve_action(&mut incident, &restart_id, "alice");
        orch.auto_approve_low_risk(&mut incident);

        let executed = orch.execute_approved_actions(&mut incident).await;

        assert_eq!(executed.len(), 3);
        let restart = &incident.actions[0];
        assert!(restart.error.as_deref().unwrap().contains("injected failure"));
        assert!(restart.executed_at.is_some());
        // The later notify action still ran
        assert_eq!(state.sent_messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn verify_resolves_when_no_active_alerts() {
        let registry = StubRegistry::default().with_alerts(vec![
            StubRegistry::alert("al-1", "resolved"),
        ]);
        let orch = orchestrator(registry, StubMlEngine::default());
        let mut incident = Incident::from_report("test");

        let result = orch.verify(&mut incident, 1).await;

        assert!(result.resolved);
        assert_eq!(result.active_alert_count, 0);
        assert_eq!(result.cleared_alert_count, 1);
        assert_eq!(incident.status, IncidentStatus::Resolved);
        assert!(incident.resolved_at.is_some());
        assert_eq!(incident.timeline.last().unwrap().event_type, "resolved");
    }

    #[tokio::test]
    async fn verify_with_retry_stops_at_first_resolved_attempt() {
        let registry = StubRegistry::default().with_alert_sequence(vec![
            vec![
                StubRegistry::alert("al-1", "triggered"),
                StubRegistry::alert("al-2", "triggered"),
            ],
            vec![],
        ]);
        let orch = orchestrator(registry, StubMlEngine::default());
        let mut incident = Incident::from_report("test");

        let result = orch.verify_with_retry(&mut incident, 3, 0.0).await;

        assert!(result.resolved);
        assert_eq!(result.attempts, 2);
        assert_eq!(incident.status, IncidentStatus::Resolved);
    }

    #[tokio::test]
    async fn verify_provider_error_returns_unresolved_result() {
        let registry = StubRegistry::default().failing("monitoring");
        let orch = orchestrator(registry, StubMlEngine::default());
        let mut incident = Incident::from_report("test");

        let result = orch.verify(&mut incident, 1).await;

        assert!(!result.resolved);
        assert!(result.detail.contains("Verification error"));
        assert_eq!(
            incident.timeline.last().unwrap().event_type,
            "verification_error"
        );
    }

    #[tokio::test]
    async fn full_workflow_resolves_and_summarizes() {
        let ml = StubMlEngine::default().with_recommendations(recommendations());
        // No alerts at verification time: resolved on the first attempt.
        let registry = StubRegistry::default();
        let orch = orchestrator(registry, ml);

        let (incident, verification) = orch
            .run_full_workflow("High CPU on prod-web-03", 3, 0.0)
            .await
            .unwrap();

        assert!(verification.resolved);
        assert_eq!(incident.status, IncidentStatus::Resolved);
        assert_eq!(incident.summary.as_deref(), Some("Stub incident summary."));

        // Timeline timestamps are non-decreasing across the whole run
        let stamps: Vec<_> = incident.timeline.iter().map(|e| e.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn policy_override_changes_auto_approval_behavior() {
        let policy = ApprovalPolicy {
            low: ThresholdPolicy::RequireOne,
            ..Default::default()
        };
        let gated_low_risk = || {
            Action::new(ActionType::Execute, "Clear a cache").with_risk(RiskLevel::Low, true)
        };

        // Default policy: low risk auto-approves even when gated.
        let orch = orchestrator(StubRegistry::default(), StubMlEngine::default());
        let mut incident = Incident::from_report("test");
        incident.actions.push(gated_low_risk());
        assert_eq!(orch.auto_approve_low_risk(&mut incident).len(), 1);

        // Override: low risk now needs one approver.
        let strict = Orchestrator::with_policy(
            Arc::new(StubRegistry::default()),
            Arc::new(StubMlEngine::default()),
            policy,
        );
        let mut incident = Incident::from_report("test");
        incident.actions.push(gated_low_risk());
        assert!(strict.auto_approve_low_risk(&mut incident).is_empty());
        assert_eq!(strict.pending_approvals(&incident).len(), 1);
    }
}
