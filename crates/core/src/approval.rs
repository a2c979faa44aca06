//! Approval routing: does a conflict-free request need a human decision?
//!
//! Routing is a property of the project, never of the event itself — it is
//! driven solely by configuration so behaviour stays predictable and
//! testable. The policy is passed in explicitly; nothing here reads
//! ambient state.

use serde::{Deserialize, Serialize};

/// Routing reason recorded when the project forces human review.
pub const REASON_PROJECT_POLICY: &str = "project policy";

/// Routing reason recorded when the oversight body must review.
pub const REASON_OVERSIGHT_REVIEW: &str = "oversight body review";

/// Per-project approval configuration. Immutable during a single
/// evaluation; owned by the configuration collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPolicy {
    /// Force human approval regardless of any other setting.
    pub always_require_approval: bool,
    /// Whether the project's events fall under the oversight body
    /// (superintendência). Projects outside it bypass human review.
    pub linked_to_oversight_body: bool,
}

/// Outcome of routing a conflict-free candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "reason")]
pub enum ApprovalDecision {
    /// The request may be confirmed without a human decision step.
    AutoApprove,
    /// The request must pass through human approval.
    RequireHumanApproval(String),
}

/// Decide whether a candidate requires human approval.
///
/// Precedence, first match wins:
/// 1. `always_require_approval` forces human review.
/// 2. Projects not linked to the oversight body auto-approve.
/// 3. Everything else goes to oversight-body review.
pub fn route(policy: &ProjectPolicy) -> ApprovalDecision {
    if policy.always_require_approval {
        return ApprovalDecision::RequireHumanApproval(REASON_PROJECT_POLICY.to_string());
    }
    if !policy.linked_to_oversight_body {
        return ApprovalDecision::AutoApprove;
    }
    ApprovalDecision::RequireHumanApproval(REASON_OVERSIGHT_REVIEW.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(always: bool, oversight: bool) -> ProjectPolicy {
        ProjectPolicy {
            always_require_approval: always,
            linked_to_oversight_body: oversight,
        }
    }

    #[test]
    fn always_require_wins_over_everything() {
        let decision = route(&policy(true, false));
        assert_eq!(
            decision,
            ApprovalDecision::RequireHumanApproval(REASON_PROJECT_POLICY.to_string())
        );
    }

    #[test]
    fn always_require_with_oversight_still_cites_project_policy() {
        let decision = route(&policy(true, true));
        assert_eq!(
            decision,
            ApprovalDecision::RequireHumanApproval(REASON_PROJECT_POLICY.to_string())
        );
    }

    #[test]
    fn outside_oversight_body_auto_approves() {
        assert_eq!(route(&policy(false, false)), ApprovalDecision::AutoApprove);
    }

    #[test]
    fn oversight_body_projects_require_review() {
        let decision = route(&policy(false, true));
        assert_eq!(
            decision,
            ApprovalDecision::RequireHumanApproval(REASON_OVERSIGHT_REVIEW.to_string())
        );
    }

    #[test]
    fn routing_depends_only_on_the_policy() {
        // Same policy, many calls: identical decisions. The signature takes
        // only the policy, so purity is structural; this guards the
        // precedence order instead.
        let p = policy(false, true);
        let first = route(&p);
        for _ in 0..10 {
            assert_eq!(route(&p), first);
        }
    }
}
