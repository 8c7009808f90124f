//! Domain layer for runbook-pilot
//!
//! This crate contains the core business logic, entities, and value objects
//! of the incident-response engine. It has no dependencies on infrastructure
//! or presentation concerns, and none of its functions suspend.

pub mod approval;
pub mod core;
pub mod incident;
pub mod integration;
pub mod runbook;

// Re-export commonly used types
pub use approval::{
    evaluator::ApprovalEvaluator,
    policy::{ApprovalPolicy, ThresholdPolicy},
};
pub use self::core::{error::RunbookError, id::short_id};
pub use incident::{
    entities::{Action, Decision, Finding, Incident, TimelineEntry},
    enums::{ActionType, FindingType, IncidentStatus, ProblemCategory, RiskLevel, Severity},
    value_objects::{
        ActionRecommendation, Classification, DiagnosticResult, RecommendationSet,
        VerificationResult,
    },
};
pub use integration::category::IntegrationCategory;
pub use runbook::{
    coerce::to_result_map,
    definition::{Runbook, RunbookStep, StepAction},
    execution::{ExecutionStatus, RunbookExecution, StepResult, StepStatus},
    template::{resolve_params, resolve_template},
};
