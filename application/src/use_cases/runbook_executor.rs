//! Runbook executor - runs declarative workflows step by step.
//!
//! Execution semantics:
//! - gather step failures are non-fatal: the step records `failed`, its
//!   result is an empty mapping, and the loop continues
//! - execute and ml_decision failures are fatal and halt the run
//! - a step with `requires_approval` that is not in the approved set pauses
//!   the run; [`RunbookExecutor::resume_runbook`] continues it after
//!   operator sign-off
//! - every step that actually runs appends one timeline entry to the
//!   incident; gated-but-not-run steps do not

use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

use runbook_domain::incident::entities::{Finding, Incident, TimelineEntry};
use runbook_domain::incident::enums::FindingType;
use runbook_domain::runbook::definition::{Runbook, RunbookStep, StepAction};
use runbook_domain::runbook::execution::{
    ExecutionStatus, RunbookExecution, StepResult, StepStatus,
};
use runbook_domain::runbook::template::resolve_params;

use crate::ports::dispatch;
use crate::ports::ml_engine::MlEngine;
use crate::ports::registry::ProviderRegistry;

/// Confidence attached to findings synthesized from step results.
const CONTEXT_FINDING_CONFIDENCE: f64 = 0.8;

pub struct RunbookExecutor {
    registry: Arc<dyn ProviderRegistry>,
    ml: Arc<dyn MlEngine>,
}

impl RunbookExecutor {
    pub fn new(registry: Arc<dyn ProviderRegistry>, ml: Arc<dyn MlEngine>) -> Self {
        Self { registry, ml }
    }

    // ------------------------------------------------------------------
    // Single-step execution
    // ------------------------------------------------------------------

    /// Execute one step and return its result.
    ///
    /// Does not check `requires_approval`; the gate is enforced by
    /// [`Self::execute_runbook`] and [`Self::resume_runbook`].
    pub async fn execute_step(
        &self,
        step: &RunbookStep,
        incident: &Incident,
        step_results: &Map<String, Value>,
    ) -> StepResult {
        match step.action {
            StepAction::MlDecision => self.run_ml_decision(step, incident, step_results).await,
            StepAction::Gather | StepAction::Execute => {
                self.run_integration_step(step, incident, step_results).await
            }
        }
    }

    // ------------------------------------------------------------------
    // Full runbook execution
    // ------------------------------------------------------------------

    /// Execute all steps sequentially, stopping at the first unapproved
    /// gate. The returned execution is `awaiting_approval` at a gate,
    /// `failed` after a fatal step, or `completed`.
    pub async fn execute_runbook(
        &self,
        runbook: &Runbook,
        incident: &mut Incident,
        pre_approved_steps: &HashSet<String>,
    ) -> RunbookExecution {
        let execution = RunbookExecution::start(runbook.name.as_str(), incident.id.as_str());
        self.run_steps(
            runbook,
            incident,
            execution,
            Map::new(),
            pre_approved_steps.clone(),
            0,
        )
        .await
    }

    /// Resume an `awaiting_approval` execution after operator sign-off.
    ///
    /// The approved set is the union of gates already satisfied (their steps
    /// completed) and the step ids approved in this call. Returns the
    /// execution unchanged if it is not awaiting approval.
    pub async fn resume_runbook(
        &self,
        runbook: &Runbook,
        incident: &mut Incident,
        mut execution: RunbookExecution,
        newly_approved: &HashSet<String>,
    ) -> RunbookExecution {
        if execution.status != ExecutionStatus::AwaitingApproval {
            return execution;
        }

        execution.status = ExecutionStatus::Running;
        execution.pending_approval_steps.clear();

        let mut approved = newly_approved.clone();
        for (step_id, result) in &execution.step_results {
            if result.status == StepStatus::Success {
                approved.insert(step_id.clone());
            }
        }

        let start_index = runbook
            .steps
            .iter()
            .position(|step| !execution.is_step_done(step.id.as_str()))
            .unwrap_or(runbook.steps.len());

        let accumulated = execution.results.clone();
        self.run_steps(runbook, incident, execution, accumulated, approved, start_index)
            .await
    }

    // ------------------------------------------------------------------
    // Shared execution loop
    // ------------------------------------------------------------------

    async fn run_steps(
        &self,
        runbook: &Runbook,
        incident: &mut Incident,
        mut execution: RunbookExecution,
        mut accumulated: Map<String, Value>,
        approved: HashSet<String>,
        start_index: usize,
    ) -> RunbookExecution {
        for (index, step) in runbook.steps.iter().enumerate().skip(start_index) {
            // Approval gate
            if step.requires_approval && !approved.contains(step.id.as_str()) {
                execution
                    .step_results
                    .insert(step.id.clone(), StepResult::pending_approval(step.id.as_str()));
                execution.pending_approval_steps.push(step.id.clone());

                // Mark the rest as pending so the caller sees the full picture
                for subsequent in &runbook.steps[index + 1..] {
                    execution
                        .step_results
                        .entry(subsequent.id.clone())
                        .or_insert_with(|| {
                            StepResult::pending(subsequent.id.as_str(), "Blocked by unapproved step")
                        });
                    if subsequent.requires_approval {
                        execution.pending_approval_steps.push(subsequent.id.clone());
                    }
                }

                execution.status = ExecutionStatus::AwaitingApproval;
                execution.results = accumulated;
                return execution;
            }

            // Run the step
            let step_result = self.execute_step(step, incident, &accumulated).await;
            append_step_timeline(incident, step, &step_result);

            match step_result.status {
                StepStatus::Success => {
                    accumulated.insert(step.id.clone(), Value::Object(step_result.result.clone()));
                    execution.step_results.insert(step.id.clone(), step_result);
                }
                StepStatus::Failed if step.action == StepAction::Gather => {
                    warn!(
                        runbook = %runbook.name,
                        step = %step.id,
                        error = step_result.error.as_deref().unwrap_or("unknown"),
                        "gather step failed; continuing"
                    );
                    execution.step_results.insert(step.id.clone(), step_result);
                    accumulated.insert(step.id.clone(), Value::Object(Map::new()));
                }
                _ => {
                    execution.step_results.insert(step.id.clone(), step_result);
                    execution.status = ExecutionStatus::Failed;
                    execution.completed_at = Some(Utc::now());
                    execution.results = accumulated;
                    return execution;
                }
            }
        }

        execution.status = ExecutionStatus::Completed;
        execution.completed_at = Some(Utc::now());
        execution.results = accumulated;
        execution
    }

    // ------------------------------------------------------------------
    // Step-type handlers
    // ------------------------------------------------------------------

    async fn run_integration_step(
        &self,
        step: &RunbookStep,
        incident: &Incident,
        step_results: &Map<String, Value>,
    ) -> StepResult {
        let resolved = resolve_params(&step.params, incident, step_results);

        let (Some(integration), Some(method)) =
            (step.integration.as_deref(), step.method.as_deref())
        else {
            // Validation rejects this shape; a hand-built step can still hit it.
            return StepResult::failed(step.id.as_str(), "Step has no integration/method");
        };

        match dispatch::call(self.registry.as_ref(), integration, method, &resolved).await {
            Ok(result) => StepResult::success(step.id.as_str(), result),
            Err(e) => StepResult::failed(step.id.as_str(), e.to_string()),
        }
    }

    async fn run_ml_decision(
        &self,
        step: &RunbookStep,
        incident: &Incident,
        step_results: &Map<String, Value>,
    ) -> StepResult {
        let mut findings: Vec<Finding> = Vec::new();
        for reference in &step.context {
            let Some(data) = step_results.get(reference) else {
                continue;
            };
            let details = match data {
                Value::Object(map) if !map.is_empty() => map.clone(),
                Value::Object(_) => continue,
                other => {
                    let mut map = Map::new();
                    map.insert("value".to_string(), Value::String(other.to_string()));
                    map
                }
            };
            findings.push(Finding {
                id: format!("rb-{reference}"),
                finding_type: FindingType::Correlation,
                source: format!("runbook_step:{reference}"),
                summary: format!("Data gathered by runbook step '{reference}'"),
                details,
                confidence: CONTEXT_FINDING_CONFIDENCE,
                timestamp: Some(Utc::now()),
            });
        }

        match self.ml.diagnose(&incident.description, &findings).await {
            Ok(diagnosis) => {
                let result = match serde_json::to_value(&diagnosis) {
                    Ok(Value::Object(map)) => map,
                    _ => Map::new(),
                };
                StepResult::success(step.id.as_str(), result)
            }
            Err(e) => StepResult::failed(step.id.as_str(), e.to_string()),
        }
    }
}

fn append_step_timeline(incident: &mut Incident, step: &RunbookStep, result: &StepResult) {
    let ok = result.status == StepStatus::Success;
    let mut details = Map::new();
    details.insert("step_id".to_string(), Value::String(step.id.clone()));
    details.insert(
        "integration".to_string(),
        step.integration.clone().map(Value::String).unwrap_or(Value::Null),
    );
    details.insert(
        "method".to_string(),
        step.method.clone().map(Value::String).unwrap_or(Value::Null),
    );
    if let Some(error) = &result.error {
        details.insert("error".to_string(), Value::String(error.clone()));
    }

    incident.record(TimelineEntry {
        timestamp: result.executed_at.unwrap_or_else(Utc::now),
        event_type: format!("runbook_step_{}", if ok { "success" } else { "failed" }),
        summary: format!(
            "{} [{}] {}",
            if ok { "✓" } else { "✗" },
            step.action,
            step.description
        ),
        details,
        source: Some("runbook_engine".to_string()),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::test_support::{StubMlEngine, StubRegistry};
    use serde_json::json;

    fn executor(registry: StubRegistry) -> RunbookExecutor {
        RunbookExecutor::new(Arc::new(registry), Arc::new(StubMlEngine::default()))
    }

    fn incident() -> Incident {
        let mut incident = Incident::from_report("High CPU on prod-web-03");
        incident
            .metadata
            .insert("host".to_string(), json!("prod-web-03"));
        incident
    }

    fn three_step_runbook() -> Runbook {
        let runbook: Runbook = serde_json::from_value(json!({
            "name": "restart-web-service",
            "description": "Restart the web tier and notify the channel",
            "steps": [
                {
                    "id": "check_alerts",
                    "action": "gather",
                    "description": "Check current alerts",
                    "integration": "monitoring",
                    "method": "get_current_alerts",
                },
                {
                    "id": "restart",
                    "action": "execute",
                    "description": "Restart the java service",
                    "integration": "compute",
                    "method": "restart_service",
                    "params": {"host": "{{ incident.metadata.host }}", "service": "java"},
                    "requires_approval": true,
                    "risk_level": "medium",
                },
                {
                    "id": "notify",
                    "action": "execute",
                    "description": "Notify the ops channel",
                    "integration": "communication",
                    "method": "send_message",
                    "params": {
                        "channel": "ops",
                        "message": "Restarted {{ restart.service }} on {{ incident.metadata.host }}",
                    },
                },
            ],
        }))
        .unwrap();
        runbook.validate().unwrap();
        runbook
    }

    #[tokio::test]
    async fn pauses_at_the_first_unapproved_gate() {
        let exec = executor(StubRegistry::default());
        let mut incident = incident();

        let execution = exec
            .execute_runbook(&three_step_runbook(), &mut incident, &HashSet::new())
            .await;

        assert_eq!(execution.status, ExecutionStatus::AwaitingApproval);
        assert_eq!(execution.step_status("check_alerts"), Some(StepStatus::Success));
        assert_eq!(execution.step_status("restart"), Some(StepStatus::PendingApproval));
        assert_eq!(execution.step_status("notify"), Some(StepStatus::Pending));
        assert_eq!(execution.pending_approval_steps, vec!["restart".to_string()]);
        // Gather results carried for the resumed run
        assert!(execution.results.contains_key("check_alerts"));
    }

    #[tokio::test]
    async fn resume_after_approval_completes_the_run() {
        let registry = StubRegistry::default();
        let state = Arc::clone(&registry.state);
        let exec = executor(registry);
        let mut incident = incident();
        let runbook = three_step_runbook();

        let paused = exec
            .execute_runbook(&runbook, &mut incident, &HashSet::new())
            .await;
        let approved: HashSet<String> = ["restart".to_string()].into();
        let finished = exec
            .resume_runbook(&runbook, &mut incident, paused, &approved)
            .await;

        assert_eq!(finished.status, ExecutionStatus::Completed);
        for step_id in ["check_alerts", "restart", "notify"] {
            assert_eq!(finished.step_status(step_id), Some(StepStatus::Success), "{step_id}");
        }
        assert!(finished.pending_approval_steps.is_empty());
        assert!(finished.completed_at.is_some());

        // Templates resolved against both the incident and the restart result
        let sent = state.sent_messages.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "Restarted java on prod-web-03");
    }

    #[tokio::test]
    async fn resume_matches_single_run_with_pre_approved_gate() {
        let runbook = three_step_runbook();

        // Run once with the gate pre-approved
        let exec_a = executor(StubRegistry::default());
        let mut incident_a = incident();
        let pre: HashSet<String> = ["restart".to_string()].into();
        let single = exec_a.execute_runbook(&runbook, &mut incident_a, &pre).await;

        // Run to the gate, then resume with the same approval
        let exec_b = executor(StubRegistry::default());
        let mut incident_b = incident();
        let paused = exec_b
            .execute_runbook(&runbook, &mut incident_b, &HashSet::new())
            .await;
        let resumed = exec_b
            .resume_runbook(&runbook, &mut incident_b, paused, &pre)
            .await;

        assert_eq!(single.status, resumed.status);
        for step in &runbook.steps {
            assert_eq!(
                single.step_status(step.id.as_str()),
                resumed.step_status(step.id.as_str()),
                "{}",
                step.id
            );
            assert_eq!(
                single.step_results[&step.id].result,
                resumed.step_results[&step.id].result,
                "{}",
                step.id
            );
        }
    }

    #[tokio::test]
    async fn execute_step_failure_is_fatal() {
        let registry = StubRegistry::default().failing("compute");
        let state = Arc::clone(&registry.state);
        let exec = executor(registry);
        let mut incident = incident();

        let runbook: Runbook = serde_json::from_value(json!({
            "name": "fatal-execute",
            "steps": [
                {
                    "id": "restart",
                    "action": "execute",
                    "description": "Restart the java service",
                    "integration": "compute",
                    "method": "restart_service",
                    "params": {"host": "prod-web-03", "service": "java"},
                },
                {
                    "id": "notify",
                    "action": "execute",
                    "description": "Notify the ops channel",
                    "integration": "communication",
                    "method": "send_message",
                    "params": {"channel": "ops", "message": "done"},
                },
            ],
        }))
        .unwrap();

        let execution = exec
            .execute_runbook(&runbook, &mut incident, &HashSet::new())
            .await;

        assert_eq!(execution.status, ExecutionStatus::Failed);
        assert_eq!(execution.step_status("restart"), Some(StepStatus::Failed));
        // Subsequent steps never appear in step_results
        assert!(!execution.step_results.contains_key("notify"));
        assert!(state.sent_messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn gather_step_failure_is_not_fatal() {
        let registry = StubRegistry::default().failing("ticketing");
        let state = Arc::clone(&registry.state);
        let exec = executor(registry);
        let mut incident = incident();

        let runbook: Runbook = serde_json::from_value(json!({
            "name": "tolerant-gather",
            "steps": [
                {
                    "id": "changes",
                    "action": "gather",
                    "description": "Recent changes",
                    "integration": "ticketing",
                    "method": "get_recent_changes",
                    "params": {"timeframe": "4h"},
                },
                {
                    "id": "notify",
                    "action": "execute",
                    "description": "Notify the ops channel",
                    "integration": "communication",
                    "method": "send_message",
                    "params": {"channel": "ops", "message": "changes: {{ changes.count }}"},
                },
            ],
        }))
        .unwrap();

        let execution = exec
            .execute_runbook(&runbook, &mut incident, &HashSet::new())
            .await;

        assert_eq!(execution.status, ExecutionStatus::Completed);
        assert_eq!(execution.step_status("changes"), Some(StepStatus::Failed));
        assert_eq!(execution.step_status("notify"), Some(StepStatus::Success));
        // The failed gather contributes an empty mapping, so its template
        // reference stays unresolved.
        let sent = state.sent_messages.lock().unwrap();
        assert_eq!(sent[0].1, "changes: {{ changes.count }}");
    }

    #[tokio::test]
    async fn ml_decision_diagnoses_from_context_steps() {
        let exec = executor(StubRegistry::default().with_default_evidence());
        let mut incident = incident();

        let runbook: Runbook = serde_json::from_value(json!({
            "name": "diagnose-from-alerts",
            "steps": [
                {
                    "id": "check_alerts",
                    "action": "gather",
                    "description": "Check current alerts",
                    "integration": "monitoring",
                    "method": "get_current_alerts",
                },
                {
                    "id": "decide",
                    "action": "ml_decision",
                    "description": "Correlate the evidence",
                    "context": ["check_alerts"],
                },
            ],
        }))
        .unwrap();

        let execution = exec
            .execute_runbook(&runbook, &mut incident, &HashSet::new())
            .await;

        assert_eq!(execution.status, ExecutionStatus::Completed);
        let decide = &execution.step_results["decide"];
        assert_eq!(decide.result["root_cause"], "Memory leak in v2.14.3");
    }

    #[tokio::test]
    async fn resume_is_a_no_op_unless_awaiting_approval() {
        let exec = executor(StubRegistry::default());
        let mut incident = incident();
        let runbook = three_step_runbook();
        let pre: HashSet<String> = ["restart".to_string()].into();

        let completed = exec.execute_runbook(&runbook, &mut incident, &pre).await;
        assert_eq!(completed.status, ExecutionStatus::Completed);

        let before = completed.clone();
        let after = exec
            .resume_runbook(&runbook, &mut incident, completed, &HashSet::new())
            .await;
        assert_eq!(after.status, before.status);
        assert_eq!(after.id, before.id);
    }

    #[tokio::test]
    async fn executed_steps_append_timeline_entries() {
        let exec = executor(StubRegistry::default());
        let mut incident = incident();
        let runbook = three_step_runbook();

        exec.execute_runbook(&runbook, &mut incident, &HashSet::new())
            .await;

        // Only the gather step ran; the gated step and its successor add no
        // timeline entries.
        let runbook_events: Vec<&TimelineEntry> = incident
            .timeline
            .iter()
            .filter(|e| e.source.as_deref() == Some("runbook_engine"))
            .collect();
        assert_eq!(runbook_events.len(), 1);
        assert_eq!(runbook_events[0].event_type, "runbook_step_success");
        assert_eq!(runbook_events[0].details["step_id"], "check_alerts");
    }
}
