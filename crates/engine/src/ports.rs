//! Collaborator boundaries the engine depends on.
//!
//! These traits are the engine's only contact surface with persistence
//! and configuration storage — no storage technology is prescribed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use agenda_core::approval::ProjectPolicy;
use agenda_core::commitment::Commitment;
use agenda_core::request::EventRequest;
use agenda_core::types::{ProjectId, RequestId, TrainerId};

use crate::error::EngineResult;

/// The calendar of record: authoritative occupied time ranges per trainer.
///
/// Reservations written here make pending and auto-approved requests
/// visible to subsequent conflict checks — that, combined with the
/// per-trainer locks, is what prevents double-booking.
#[async_trait]
pub trait CommitmentStore: Send + Sync {
    /// All commitments for `trainer` overlapping `[window_start, window_end)`,
    /// ordered by start.
    async fn commitments_for(
        &self,
        trainer: TrainerId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> EngineResult<Vec<Commitment>>;

    /// Occupy each of the request's trainers for the request window.
    /// Called under the reservation locks, immediately after a clean
    /// conflict check.
    async fn reserve(&self, request: &EventRequest) -> EngineResult<()>;

    /// Free the reservation for a rejected or cancelled request.
    async fn release(&self, request_id: RequestId) -> EngineResult<()>;
}

/// Project approval policies, owned by configuration storage.
#[async_trait]
pub trait PolicyLookup: Send + Sync {
    async fn policy_for(&self, project: ProjectId) -> EngineResult<ProjectPolicy>;
}

/// Persistence for event-request state. The engine emits each transition
/// exactly once; downstream notification is the store's concern.
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn insert(&self, request: &EventRequest) -> EngineResult<()>;
    async fn update(&self, request: &EventRequest) -> EngineResult<()>;
    async fn get(&self, id: RequestId) -> EngineResult<Option<EventRequest>>;
}
