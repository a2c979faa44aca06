//! Request lifecycle status and its transition table.
//!
//! The status is a closed enum with an explicit transition table so an
//! illegal transition is a construction-time impossibility, not a runtime
//! check against arbitrary strings.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of an [`EventRequest`](crate::request::EventRequest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Validated but not yet submitted.
    Draft,
    /// Waiting for a human (oversight body) decision.
    PendingApproval,
    /// Conflict-free and exempt from human review; ready to publish.
    AutoApproved,
    /// Human-approved; ready to publish.
    Approved,
    /// Human-rejected. Terminal.
    Rejected,
    /// Upserted into the external calendar.
    Published,
    /// Withdrawn before decision, or retracted after publish. Terminal.
    Cancelled,
}

impl RequestStatus {
    /// Returns the set of statuses reachable from `self`.
    ///
    /// Publish retries are not transitions — a failed publish leaves the
    /// request in `Approved`/`AutoApproved` with a recorded failure count.
    pub fn valid_transitions(self) -> &'static [RequestStatus] {
        use RequestStatus::*;
        match self {
            Draft => &[PendingApproval, AutoApproved],
            PendingApproval => &[Approved, Rejected, Cancelled],
            AutoApproved => &[Published],
            Approved => &[Published],
            Published => &[Cancelled],
            // Terminal states.
            Rejected | Cancelled => &[],
        }
    }

    /// Check whether a transition from `self` to `to` is valid.
    pub fn can_transition(self, to: RequestStatus) -> bool {
        self.valid_transitions().contains(&to)
    }

    /// Validate a transition, returning a descriptive error for invalid ones.
    pub fn validate_transition(self, to: RequestStatus) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition { from: self, to })
        }
    }

    /// Whether no further transitions are possible from this status.
    pub fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// Whether the request may be handed to the calendar publisher.
    pub fn is_publishable(self) -> bool {
        matches!(self, RequestStatus::Approved | RequestStatus::AutoApproved)
    }

    /// Stable lowercase name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Draft => "draft",
            RequestStatus::PendingApproval => "pending_approval",
            RequestStatus::AutoApproved => "auto_approved",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Published => "published",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
