//! Minimum travel-time estimation between municipalities.
//!
//! The estimator answers one question: how many minutes must separate two
//! physical commitments in different municipalities for the same trainer.
//! Reference data comes from an external distance table; a missing entry
//! falls back to a conservative default rather than failing, because
//! missing travel data must not silently permit impossible schedules.

use std::collections::HashMap;

use crate::types::{Modality, MunicipalityId};

/// Conservative fallback when the distance table has no entry for a
/// municipality pair.
pub const DEFAULT_TRAVEL_MINUTES: u32 = 240;

/// Reference-data source for pairwise travel times.
pub trait TravelTimeSource {
    /// Minimum minutes between `origin` and `destination`, or `None` when
    /// the table has no entry for the pair.
    fn lookup(&self, origin: MunicipalityId, destination: MunicipalityId) -> Option<u32>;
}

/// In-memory symmetric travel-time table.
#[derive(Debug, Clone, Default)]
pub struct TravelTimeTable {
    entries: HashMap<(MunicipalityId, MunicipalityId), u32>,
}

impl TravelTimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the travel time between two municipalities (both directions).
    pub fn insert(&mut self, a: MunicipalityId, b: MunicipalityId, minutes: u32) {
        self.entries.insert(pair_key(a, b), minutes);
    }
}

impl TravelTimeSource for TravelTimeTable {
    fn lookup(&self, origin: MunicipalityId, destination: MunicipalityId) -> Option<u32> {
        self.entries.get(&pair_key(origin, destination)).copied()
    }
}

/// Normalize a pair so lookups are direction-independent.
fn pair_key(a: MunicipalityId, b: MunicipalityId) -> (MunicipalityId, MunicipalityId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Minimum turnaround minutes required between a commitment at `origin`
/// and a candidate event at `destination`.
///
/// Returns 0 when the candidate is online, when the origin is unknown
/// (blocks and online commitments carry no municipality), or when both
/// sides are in the same municipality. Otherwise the table is consulted,
/// falling back to [`DEFAULT_TRAVEL_MINUTES`].
pub fn required_minutes(
    source: &dyn TravelTimeSource,
    origin: Option<MunicipalityId>,
    destination: MunicipalityId,
    modality: Modality,
) -> u32 {
    if !modality.requires_travel() {
        return 0;
    }
    let Some(origin) = origin else {
        return 0;
    };
    if origin == destination {
        return 0;
    }
    source
        .lookup(origin, destination)
        .unwrap_or(DEFAULT_TRAVEL_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TravelTimeTable {
        let mut t = TravelTimeTable::new();
        t.insert(10, 20, 90);
        t
    }

    #[test]
    fn online_modality_requires_no_travel() {
        assert_eq!(required_minutes(&table(), Some(10), 20, Modality::Online), 0);
    }

    #[test]
    fn same_municipality_requires_no_travel() {
        assert_eq!(
            required_minutes(&table(), Some(10), 10, Modality::InPerson),
            0
        );
    }

    #[test]
    fn unknown_origin_requires_no_travel() {
        assert_eq!(required_minutes(&table(), None, 10, Modality::InPerson), 0);
    }

    #[test]
    fn table_entry_used_when_present() {
        assert_eq!(
            required_minutes(&table(), Some(10), 20, Modality::InPerson),
            90
        );
    }

    #[test]
    fn lookup_is_symmetric() {
        assert_eq!(
            required_minutes(&table(), Some(20), 10, Modality::InPerson),
            90
        );
    }

    #[test]
    fn missing_entry_falls_back_to_conservative_default() {
        assert_eq!(
            required_minutes(&table(), Some(10), 30, Modality::InPerson),
            DEFAULT_TRAVEL_MINUTES
        );
    }

    #[test]
    fn follow_up_is_a_physical_visit() {
        assert_eq!(
            required_minutes(&table(), Some(10), 20, Modality::FollowUp),
            90
        );
    }
}
