//! Approval state evaluation.

use crate::incident::entities::{Action, Decision};

use super::policy::{ApprovalPolicy, ThresholdPolicy};

/// Evaluates approval state for actions based on a configurable policy.
///
/// The approvals list keeps set semantics for membership and insertion order
/// for audit: a duplicate approver never counts twice toward a threshold.
#[derive(Debug, Clone, Default)]
pub struct ApprovalEvaluator {
    policy: ApprovalPolicy,
}

impl ApprovalEvaluator {
    pub fn new(policy: ApprovalPolicy) -> Self {
        Self { policy }
    }

    // ------------------------------------------------------------------
    // Policy queries
    // ------------------------------------------------------------------

    /// Effective threshold policy for an action. `requires_approval = false`
    /// overrides the risk level and yields `Auto`.
    pub fn policy_for(&self, action: &Action) -> ThresholdPolicy {
        if !action.requires_approval {
            return ThresholdPolicy::Auto;
        }
        self.policy.for_risk(action.risk_level)
    }

    /// Minimum number of distinct human approvals required for an action.
    pub fn minimum_approvals(&self, action: &Action) -> usize {
        self.policy_for(action).minimum_approvals()
    }

    pub fn requires_human_approval(&self, action: &Action) -> bool {
        self.minimum_approvals(action) > 0
    }

    // ------------------------------------------------------------------
    // State queries
    // ------------------------------------------------------------------

    /// True if the action has met its approval threshold (auto actions are
    /// trivially approved).
    pub fn is_approved(&self, action: &Action) -> bool {
        action.approvals.len() >= self.minimum_approvals(action)
    }

    pub fn is_rejected(&self, action: &Action) -> bool {
        action.rejected_by.is_some()
    }

    // ------------------------------------------------------------------
    // Mutating operations
    // ------------------------------------------------------------------

    /// Record a human approval from `approver`.
    ///
    /// Duplicate approvals from the same person are ignored. Once the
    /// threshold is met the action's decision flips to `Approved` and
    /// `approved_by` holds the most recent distinct approver.
    ///
    /// Returns true if the action just became fully approved.
    pub fn add_approval(&self, action: &mut Action, approver: &str) -> bool {
        if !action.approvals.iter().any(|a| a == approver) {
            action.approvals.push(approver.to_string());
        }
        action.approved_by = action.approvals.last().cloned();
        if self.is_approved(action) {
            action.decision = Decision::Approved;
            return true;
        }
        false
    }

    /// Record a rejection. Prior approvals stay in the list for audit but no
    /// longer satisfy the threshold.
    pub fn reject(&self, action: &mut Action, rejected_by: &str) {
        action.decision = Decision::Rejected;
        action.rejected_by = Some(rejected_by.to_string());
    }

    // ------------------------------------------------------------------
    // Bulk helpers
    // ------------------------------------------------------------------

    /// Approve every still-undecided action whose policy is `Auto`.
    ///
    /// Never touches actions that have already been approved or rejected, so
    /// repeated calls are no-ops. Returns snapshots of the actions newly
    /// approved by this call.
    pub fn apply_auto_approvals(&self, actions: &mut [Action]) -> Vec<Action> {
        let mut auto_approved = Vec::new();
        for action in actions.iter_mut() {
            if !action.is_undecided() {
                continue;
            }
            if !self.requires_human_approval(action) {
                action.decision = Decision::Approved;
                action.approved_by = Some("auto".to_string());
                auto_approved.push(action.clone());
            }
        }
        auto_approved
    }

    /// Actions that require human approval and are neither approved nor
    /// rejected.
    pub fn pending<'a>(&self, actions: &'a [Action]) -> Vec<&'a Action> {
        actions
            .iter()
            .filter(|a| {
                self.requires_human_approval(a) && !self.is_approved(a) && !self.is_rejected(a)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incident::enums::{ActionType, RiskLevel};

    fn action(risk: RiskLevel, requires_approval: bool) -> Action {
        Action::new(ActionType::Execute, "restart service").with_risk(risk, requires_approval)
    }

    #[test]
    fn requires_approval_false_overrides_risk() {
        let evaluator = ApprovalEvaluator::default();
        let a = action(RiskLevel::Critical, false);
        assert_eq!(evaluator.policy_for(&a), ThresholdPolicy::Auto);
        assert_eq!(evaluator.minimum_approvals(&a), 0);
        assert!(evaluator.is_approved(&a));
    }

    #[test]
    fn single_approver_satisfies_require_one() {
        let evaluator = ApprovalEvaluator::default();
        let mut a = action(RiskLevel::High, true);

        assert!(evaluator.add_approval(&mut a, "alice"));
        assert!(a.is_approved());
        assert_eq!(a.approved_by.as_deref(), Some("alice"));
        assert_eq!(a.approvals, vec!["alice"]);
    }

    #[test]
    fn require_two_needs_two_distinct_approvers() {
        let evaluator = ApprovalEvaluator::default();
        let mut a = action(RiskLevel::Critical, true);

        assert!(!evaluator.add_approval(&mut a, "alice"));
        assert!(a.is_undecided());

        // Same approver again must not satisfy the threshold
        assert!(!evaluator.add_approval(&mut a, "alice"));
        assert!(a.is_undecided());
        assert_eq!(a.approvals, vec!["alice"]);

        assert!(evaluator.add_approval(&mut a, "bob"));
        assert!(a.is_approved());
        assert_eq!(a.approved_by.as_deref(), Some("bob"));
        assert_eq!(a.approvals, vec!["alice", "bob"]);
    }

    #[test]
    fn rejection_sets_state_and_keeps_audit_trail() {
        let evaluator = ApprovalEvaluator::default();
        let mut a = action(RiskLevel::Critical, true);

        evaluator.add_approval(&mut a, "alice");
        evaluator.reject(&mut a, "carol");

        assert!(a.is_rejected());
        assert_eq!(a.rejected_by.as_deref(), Some("carol"));
        // Prior approvals retained for audit
        assert_eq!(a.approvals, vec!["alice"]);
        assert!(evaluator.is_rejected(&a));
    }

    #[test]
    fn auto_approvals_only_touch_undecided_auto_actions() {
        let evaluator = ApprovalEvaluator::default();
        let mut actions = vec![
            action(RiskLevel::Low, false),
            action(RiskLevel::High, true),
            action(RiskLevel::Low, false),
        ];
        evaluator.reject(&mut actions[2], "dave");

        let approved_ids: Vec<String> = evaluator
            .apply_auto_approvals(&mut actions)
            .iter()
            .map(|a| a.id.clone())
            .collect();

        assert_eq!(approved_ids.len(), 1);
        assert_eq!(approved_ids[0], actions[0].id);
        assert_eq!(actions[0].approved_by.as_deref(), Some("auto"));
        assert!(actions[1].is_undecided());
        assert!(actions[2].is_rejected());
    }

    #[test]
    fn auto_approvals_are_idempotent() {
        let evaluator = ApprovalEvaluator::default();
        let mut actions = vec![action(RiskLevel::Low, false)];

        assert_eq!(evaluator.apply_auto_approvals(&mut actions).len(), 1);
        let snapshot = actions[0].clone();

        // Second pass approves nothing and leaves state untouched
        assert!(evaluator.apply_auto_approvals(&mut actions).is_empty());
        assert_eq!(actions[0].decision, snapshot.decision);
        assert_eq!(actions[0].approved_by, snapshot.approved_by);
    }

    #[test]
    fn pending_excludes_auto_approved_and_rejected() {
        let evaluator = ApprovalEvaluator::default();
        let mut actions = vec![
            action(RiskLevel::Low, false),
            action(RiskLevel::High, true),
            action(RiskLevel::Critical, true),
            action(RiskLevel::Medium, true),
        ];
        evaluator.apply_auto_approvals(&mut actions);
        evaluator.reject(&mut actions[3], "erin");

        let pending = evaluator.pending(&actions);
        let pending_ids: Vec<&str> = pending.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(pending_ids, vec![actions[1].id.as_str(), actions[2].id.as_str()]);
    }

    #[test]
    fn custom_policy_is_honored() {
        let policy = ApprovalPolicy {
            low: ThresholdPolicy::RequireOne,
            medium: ThresholdPolicy::RequireTwo,
            high: ThresholdPolicy::RequireTwo,
            critical: ThresholdPolicy::RequireTwo,
        };
        let evaluator = ApprovalEvaluator::new(policy);
        let a = action(RiskLevel::Low, true);
        assert_eq!(evaluator.minimum_approvals(&a), 1);
    }
}
