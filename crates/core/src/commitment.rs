//! Calendar-of-record entries: a trainer's already-occupied time ranges.
//!
//! Commitments are owned by the calendar-of-record collaborator and are
//! read-only to this crate. The invariant that commitments for the same
//! trainer never overlap is maintained by whoever writes them, including
//! the engine when it reserves and publishes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MunicipalityId, TrainerId};

/// What kind of occupation a commitment represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitmentKind {
    /// A confirmed or reserved training event.
    Event,
    /// Declared unavailability for the whole window.
    BlockTotal,
    /// Declared unavailability for a sub-range. The commitment's
    /// `start`/`end` *are* the sub-range, so overlap is checked identically
    /// to the other kinds.
    BlockPartial,
}

/// A time range a trainer is already occupied by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commitment {
    pub trainer: TrainerId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub kind: CommitmentKind,
    /// Where the commitment takes place. `None` for blocks and online
    /// events — those impose no travel requirement.
    pub municipality: Option<MunicipalityId>,
}

impl Commitment {
    /// Whether this commitment overlaps the half-open range `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        ranges_overlap(self.start, self.end, start, end)
    }
}

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)`
/// conflict iff `a_start < b_end && b_start < a_end`.
///
/// Back-to-back ranges (one ending exactly when the other starts) do not
/// overlap.
pub fn ranges_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}
