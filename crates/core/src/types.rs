//! Shared id aliases and small enums used across the workspace.

use serde::{Deserialize, Serialize};

/// Trainer (formador) identifier.
pub type TrainerId = i64;

/// Project identifier. The project carries the approval policy.
pub type ProjectId = i64;

/// Municipality identifier (location reference data).
pub type MunicipalityId = i64;

/// Event request identifier. Doubles as the idempotency key for the
/// external calendar upsert.
pub type RequestId = uuid::Uuid;

/// How a training session is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Classroom session at the municipality.
    InPerson,
    /// Video-conference session; no physical presence required.
    Online,
    /// Follow-up visit (acompanhamento) at the municipality.
    FollowUp,
}

impl Modality {
    /// Whether the trainer must be physically present at the location.
    ///
    /// Physical modalities are subject to travel-time and daily-capacity
    /// checks; online sessions are not.
    pub fn requires_travel(self) -> bool {
        !matches!(self, Modality::Online)
    }
}
