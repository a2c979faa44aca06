//! State-machine operations on an [`EventRequest`].
//!
//! Every operation validates the transition against the table in
//! [`crate::status`] before touching any field, so a request is either
//! fully updated (status plus bookkeeping) or left untouched.

use crate::approval::ApprovalDecision;
use crate::error::CoreError;
use crate::request::{validate_decision_note, EventRequest, ExternalCalendarRef};
use crate::status::RequestStatus;

impl EventRequest {
    /// Move a draft into the workflow according to the routing decision.
    ///
    /// Callers must have re-run conflict detection immediately before this
    /// under the trainer reservation locks; submission of a conflicting
    /// candidate never reaches this point.
    pub fn submit(&mut self, decision: &ApprovalDecision) -> Result<RequestStatus, CoreError> {
        let (target, reason) = match decision {
            ApprovalDecision::AutoApprove => (RequestStatus::AutoApproved, None),
            ApprovalDecision::RequireHumanApproval(reason) => {
                (RequestStatus::PendingApproval, Some(reason.clone()))
            }
        };
        self.status.validate_transition(target)?;
        self.status = target;
        self.routing_reason = reason;
        Ok(target)
    }

    /// Record a human approval. Requires a non-empty decision note.
    pub fn approve(&mut self, note: &str) -> Result<(), CoreError> {
        validate_decision_note(note)?;
        self.status.validate_transition(RequestStatus::Approved)?;
        self.status = RequestStatus::Approved;
        self.decision_note = Some(note.to_string());
        Ok(())
    }

    /// Record a human rejection. Requires a non-empty decision note.
    /// Rejected is terminal; no publish is ever attempted.
    pub fn reject(&mut self, note: &str) -> Result<(), CoreError> {
        validate_decision_note(note)?;
        self.status.validate_transition(RequestStatus::Rejected)?;
        self.status = RequestStatus::Rejected;
        self.decision_note = Some(note.to_string());
        Ok(())
    }

    /// Record a successful publish: stores the external reference and moves
    /// to `Published`.
    pub fn record_publish_success(
        &mut self,
        entry: ExternalCalendarRef,
    ) -> Result<(), CoreError> {
        self.status.validate_transition(RequestStatus::Published)?;
        self.status = RequestStatus::Published;
        self.external_calendar_ref = Some(entry);
        self.publish_halted = false;
        Ok(())
    }

    /// Record failed publish attempts. The status does not change — the
    /// request stays publishable for manual intervention. `halted` marks
    /// that automatic retrying has given up (retries exhausted or a
    /// permanent failure).
    pub fn record_publish_failure(
        &mut self,
        attempts: u32,
        halted: bool,
    ) -> Result<(), CoreError> {
        if !self.status.is_publishable() {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: RequestStatus::Published,
            });
        }
        self.publish_failures += attempts;
        self.publish_halted = halted;
        Ok(())
    }

    /// Re-arm publishing after a halt, for a manual retry.
    pub fn rearm_publish(&mut self) -> Result<(), CoreError> {
        if !self.status.is_publishable() {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: RequestStatus::Published,
            });
        }
        self.publish_halted = false;
        Ok(())
    }

    /// Cancel the request: withdrawal before decision, or retraction after
    /// publish. Valid only from `PendingApproval` and `Published`.
    pub fn cancel(&mut self) -> Result<(), CoreError> {
        self.status.validate_transition(RequestStatus::Cancelled)?;
        self.status = RequestStatus::Cancelled;
        Ok(())
    }
}
