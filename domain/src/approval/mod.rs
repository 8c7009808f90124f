//! Risk-tiered approval policies for incident actions.
//!
//! - [`policy::ApprovalPolicy`] - maps each risk level to a threshold
//! - [`evaluator::ApprovalEvaluator`] - records approvals/rejections and
//!   decides when an action clears its gate

pub mod evaluator;
pub mod policy;
