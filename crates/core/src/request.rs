//! The event-request model and input validation.
//!
//! Validation runs at construction time, before any conflict check:
//! malformed input never reaches the detector or the state machine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::RequestStatus;
use crate::types::{Modality, MunicipalityId, ProjectId, RequestId, TrainerId};

/// Maximum number of trainers on a single request.
pub const MAX_TRAINERS: usize = 5;

/// Maximum length for a human decision note.
pub const MAX_DECISION_NOTE_LENGTH: usize = 2_000;

/// Reference to the external calendar entry, set only after a successful
/// publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCalendarRef {
    /// Identifier of the entry in the external calendar.
    pub external_id: String,
    /// Video-conference link. Always present for online sessions,
    /// optional for in-person ones.
    pub meeting_link: Option<String>,
}

/// A proposed or confirmed training session.
///
/// Created in `Draft` via [`EventRequest::new`]; all later status changes
/// go through the workflow operations in [`crate::workflow`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRequest {
    pub id: RequestId,
    /// Trainers delivering the session, in display order. Order is
    /// irrelevant to conflict logic; duplicates are rejected.
    pub trainers: Vec<TrainerId>,
    pub project: ProjectId,
    pub municipality: MunicipalityId,
    pub modality: Modality,
    /// Start of the session (canonical timezone: UTC).
    pub start: DateTime<Utc>,
    /// End of the session; always after `start`.
    pub end: DateTime<Utc>,
    pub status: RequestStatus,
    /// Why routing sent this request to (or past) human review.
    pub routing_reason: Option<String>,
    /// Note recorded by the human who approved or rejected.
    pub decision_note: Option<String>,
    pub external_calendar_ref: Option<ExternalCalendarRef>,
    /// Number of failed publish attempts recorded so far.
    pub publish_failures: u32,
    /// Set when automatic publishing has given up (retries exhausted or a
    /// permanent failure); cleared by a manual retry or a success.
    pub publish_halted: bool,
}

impl EventRequest {
    /// Validate inputs and create a request in `Draft`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        trainers: Vec<TrainerId>,
        project: ProjectId,
        municipality: MunicipalityId,
        modality: Modality,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        validate_time_range(start, end)?;
        validate_trainer_set(&trainers)?;

        Ok(Self {
            id: RequestId::new_v4(),
            trainers,
            project,
            municipality,
            modality,
            start,
            end,
            status: RequestStatus::Draft,
            routing_reason: None,
            decision_note: None,
            external_calendar_ref: None,
            publish_failures: 0,
            publish_halted: false,
        })
    }

    /// Calendar day the session starts on, used by the daily-capacity check
    /// and the commitment read window.
    pub fn day(&self) -> NaiveDate {
        self.start.date_naive()
    }
}

/// Validate that a time range is well-formed (`end > start`).
///
/// Zero-length ranges are invalid input and are rejected here, before
/// conflict detection ever runs.
pub fn validate_time_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), CoreError> {
    if end <= start {
        return Err(CoreError::Validation(format!(
            "Event end ({end}) must be after start ({start})"
        )));
    }
    Ok(())
}

/// Validate the trainer set: 1 to [`MAX_TRAINERS`] entries, no duplicates.
pub fn validate_trainer_set(trainers: &[TrainerId]) -> Result<(), CoreError> {
    if trainers.is_empty() {
        return Err(CoreError::Validation(
            "An event request needs at least one trainer".to_string(),
        ));
    }
    if trainers.len() > MAX_TRAINERS {
        return Err(CoreError::Validation(format!(
            "An event request allows at most {MAX_TRAINERS} trainers, got {}",
            trainers.len()
        )));
    }
    let mut seen = std::collections::HashSet::new();
    for trainer in trainers {
        if !seen.insert(trainer) {
            return Err(CoreError::Validation(format!(
                "Trainer {trainer} appears more than once"
            )));
        }
    }
    Ok(())
}

/// Validate a human decision note: non-empty and bounded.
pub fn validate_decision_note(note: &str) -> Result<(), CoreError> {
    if note.trim().is_empty() {
        return Err(CoreError::Validation(
            "A decision note is required when approving or rejecting".to_string(),
        ));
    }
    if note.len() > MAX_DECISION_NOTE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Decision note exceeds maximum length of {MAX_DECISION_NOTE_LENGTH} characters"
        )));
    }
    Ok(())
}
