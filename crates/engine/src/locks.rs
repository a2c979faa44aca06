//! Per-trainer reservation locks.
//!
//! The serializable section "read commitments → detect → reserve" must be
//! mutually exclusive per trainer. Locks are acquired in sorted trainer
//! order so two multi-trainer submissions can never deadlock, and
//! detection for disjoint trainer sets still runs in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use agenda_core::types::TrainerId;

/// Registry of one async mutex per trainer.
#[derive(Default)]
pub struct TrainerLocks {
    handles: std::sync::Mutex<HashMap<TrainerId, Arc<Mutex<()>>>>,
}

impl TrainerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, trainer: TrainerId) -> Arc<Mutex<()>> {
        let mut handles = self.handles.lock().expect("trainer lock registry poisoned");
        handles.entry(trainer).or_default().clone()
    }

    /// Acquire the locks for every trainer in the set, in sorted order.
    ///
    /// The returned guards hold the critical section open; dropping them
    /// releases every lock.
    pub async fn acquire(&self, trainers: &[TrainerId]) -> Vec<OwnedMutexGuard<()>> {
        let mut sorted = trainers.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len());
        for trainer in sorted {
            guards.push(self.handle(trainer).lock_owned().await);
        }
        guards
    }
}
