//! Approval policy configuration.

use serde::{Deserialize, Serialize};

use crate::incident::enums::RiskLevel;

/// How many humans must sign off before an action may execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// No human input needed; the system auto-approves.
    Auto,
    /// One human approver required.
    RequireOne,
    /// Two distinct human approvers required.
    RequireTwo,
}

impl ThresholdPolicy {
    /// Minimum number of distinct human approvals this threshold demands.
    pub fn minimum_approvals(&self) -> usize {
        match self {
            ThresholdPolicy::Auto => 0,
            ThresholdPolicy::RequireOne => 1,
            ThresholdPolicy::RequireTwo => 2,
        }
    }
}

/// Maps each risk level to a threshold policy.
///
/// The policy is a per-orchestrator configuration value, passed at
/// construction. Tests build orchestrators with explicit policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    pub low: ThresholdPolicy,
    pub medium: ThresholdPolicy,
    pub high: ThresholdPolicy,
    pub critical: ThresholdPolicy,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            low: ThresholdPolicy::Auto,
            medium: ThresholdPolicy::RequireOne,
            high: ThresholdPolicy::RequireOne,
            critical: ThresholdPolicy::RequireTwo,
        }
    }
}

impl ApprovalPolicy {
    pub fn for_risk(&self, risk_level: RiskLevel) -> ThresholdPolicy {
        match risk_level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
            RiskLevel::Critical => self.critical,
        }
    }
}
