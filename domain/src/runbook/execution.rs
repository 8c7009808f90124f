//! Runbook execution state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::core::id::short_id;

/// Outcome state of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Success,
    Failed,
    Skipped,
    PendingApproval,
}

/// Overall state of a runbook run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    AwaitingApproval,
    Completed,
    Failed,
}

/// The outcome of executing a single runbook step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: String,
    pub status: StepStatus,
    #[serde(default)]
    pub result: Map<String, Value>,
    pub error: Option<String>,
    pub executed_at: Option<DateTime<Utc>>,
    pub skipped_reason: Option<String>,
}

impl StepResult {
    pub fn success(step_id: impl Into<String>, result: Map<String, Value>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::Success,
            result,
            error: None,
            executed_at: Some(Utc::now()),
            skipped_reason: None,
        }
    }

    pub fn failed(step_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::Failed,
            result: Map::new(),
            error: Some(error.into()),
            executed_at: Some(Utc::now()),
            skipped_reason: None,
        }
    }

    pub fn pending(step_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::Pending,
            result: Map::new(),
            error: None,
            executed_at: None,
            skipped_reason: Some(reason.into()),
        }
    }

    pub fn pending_approval(step_id: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::PendingApproval,
            result: Map::new(),
            error: None,
            executed_at: None,
            skipped_reason: Some("Awaiting operator approval".to_string()),
        }
    }
}

/// Tracks the complete state of one runbook run.
///
/// `step_results` is the typed audit view; `results` holds the raw result
/// mappings later steps consume through templates. Both are kept because
/// they serve different consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunbookExecution {
    pub id: String,
    pub runbook_name: String,
    pub incident_id: String,
    pub status: ExecutionStatus,
    /// Per-step outcomes keyed by step ID.
    #[serde(default)]
    pub step_results: HashMap<String, StepResult>,
    /// Raw result mappings accumulated for template resolution.
    #[serde(default)]
    pub results: Map<String, Value>,
    /// Step IDs currently blocked on operator approval.
    #[serde(default)]
    pub pending_approval_steps: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl RunbookExecution {
    pub fn start(runbook_name: impl Into<String>, incident_id: impl Into<String>) -> Self {
        Self {
            id: format!("exec-{}", short_id()),
            runbook_name: runbook_name.into(),
            incident_id: incident_id.into(),
            status: ExecutionStatus::Running,
            step_results: HashMap::new(),
            results: Map::new(),
            pending_approval_steps: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn step_status(&self, step_id: &str) -> Option<StepStatus> {
        self.step_results.get(step_id).map(|r| r.status)
    }

    /// True once a step has completed successfully; used by resume to find
    /// where to pick the loop back up.
    pub fn is_step_done(&self, step_id: &str) -> bool {
        self.step_status(step_id) == Some(StepStatus::Success)
    }
}
