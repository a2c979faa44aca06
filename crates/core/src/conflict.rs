//! Conflict detection for candidate event requests.
//!
//! Detection is a pure function: given the candidate and a snapshot of
//! each trainer's commitments it produces a [`ConflictOutcome`] with no
//! side effects, deterministically. Conflicts are expected results, not
//! errors — the caller surfaces them so the UI can explain why a slot is
//! unavailable.
//!
//! Checks run per trainer in priority order (direct overlap, then travel
//! time, then daily capacity); the first trainer to produce a conflict
//! short-circuits the evaluation.

use std::collections::HashMap;

use serde::Serialize;

use crate::commitment::{Commitment, CommitmentKind};
use crate::request::EventRequest;
use crate::travel::{required_minutes, TravelTimeSource};
use crate::types::TrainerId;

/// Tunables for the detector.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Maximum physical (in-person or follow-up) events per trainer per
    /// calendar day. Online events are not counted.
    pub daily_in_person_capacity: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            daily_in_person_capacity: 1,
        }
    }
}

/// Result of evaluating one candidate against a commitment snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ConflictOutcome {
    /// The candidate fits every trainer's calendar.
    NoConflict,
    /// The candidate window overlaps an existing commitment.
    DirectOverlap {
        trainer: TrainerId,
        commitment: Commitment,
    },
    /// The gap to an adjacent physical commitment is shorter than the
    /// required travel time.
    InsufficientTravelTime {
        trainer: TrainerId,
        required_minutes: i64,
        available_minutes: i64,
    },
    /// The trainer already has too many physical events that day.
    CapacityExceeded {
        trainer: TrainerId,
        count_on_day: u32,
    },
}

impl ConflictOutcome {
    pub fn is_clean(&self) -> bool {
        matches!(self, ConflictOutcome::NoConflict)
    }
}

/// Evaluate a candidate against the commitment snapshot of every trainer
/// on it.
///
/// `commitments` maps each trainer to their commitments inside the
/// surrounding read window (candidate day plus the travel buffer).
/// A trainer missing from the map is treated as having a free calendar.
pub fn detect(
    candidate: &EventRequest,
    commitments: &HashMap<TrainerId, Vec<Commitment>>,
    travel: &dyn TravelTimeSource,
    config: &DetectionConfig,
) -> ConflictOutcome {
    static NO_COMMITMENTS: Vec<Commitment> = Vec::new();

    for &trainer in &candidate.trainers {
        let existing = commitments.get(&trainer).unwrap_or(&NO_COMMITMENTS);

        if let Some(outcome) = check_trainer(candidate, trainer, existing, travel, config) {
            return outcome;
        }
    }

    ConflictOutcome::NoConflict
}

/// Run the three checks for a single trainer, in priority order.
fn check_trainer(
    candidate: &EventRequest,
    trainer: TrainerId,
    existing: &[Commitment],
    travel: &dyn TravelTimeSource,
    config: &DetectionConfig,
) -> Option<ConflictOutcome> {
    // 1. Direct overlap with any commitment. Total blocks and events
    //    occupy their whole window; partial blocks carry their sub-range
    //    as their own start/end, so the comparison is identical.
    if let Some(hit) = existing
        .iter()
        .find(|c| c.overlaps(candidate.start, candidate.end))
    {
        return Some(ConflictOutcome::DirectOverlap {
            trainer,
            commitment: hit.clone(),
        });
    }

    // 2. Travel time to the nearest commitment before and after.
    if let Some(outcome) = check_travel_gaps(candidate, trainer, existing, travel) {
        return Some(outcome);
    }

    // 3. Daily capacity for physical events. A commitment counts against
    //    the day it starts on; one spilling over midnight from the
    //    previous day is charged to that previous day only (overlap and
    //    travel checks still apply to it).
    if candidate.modality.requires_travel() {
        let physical_on_day = existing
            .iter()
            .filter(|c| {
                c.kind == CommitmentKind::Event
                    && c.municipality.is_some()
                    && c.start.date_naive() == candidate.day()
            })
            .count() as u32;

        if physical_on_day + 1 > config.daily_in_person_capacity {
            return Some(ConflictOutcome::CapacityExceeded {
                trainer,
                count_on_day: physical_on_day + 1,
            });
        }
    }

    None
}

/// Compare the gap to the nearest commitment on each side of the candidate
/// against the required travel time between the two municipalities.
fn check_travel_gaps(
    candidate: &EventRequest,
    trainer: TrainerId,
    existing: &[Commitment],
    travel: &dyn TravelTimeSource,
) -> Option<ConflictOutcome> {
    let before = existing
        .iter()
        .filter(|c| c.end <= candidate.start)
        .max_by_key(|c| c.end);
    let after = existing
        .iter()
        .filter(|c| c.start >= candidate.end)
        .min_by_key(|c| c.start);

    if let Some(prev) = before {
        let required = i64::from(required_minutes(
            travel,
            prev.municipality,
            candidate.municipality,
            candidate.modality,
        ));
        let available = (candidate.start - prev.end).num_minutes();
        if available < required {
            return Some(ConflictOutcome::InsufficientTravelTime {
                trainer,
                required_minutes: required,
                available_minutes: available,
            });
        }
    }

    if let Some(next) = after {
        let required = i64::from(required_minutes(
            travel,
            next.municipality,
            candidate.municipality,
            candidate.modality,
        ));
        let available = (next.start - candidate.end).num_minutes();
        if available < required {
            return Some(ConflictOutcome::InsufficientTravelTime {
                trainer,
                required_minutes: required,
                available_minutes: available,
            });
        }
    }

    None
}
