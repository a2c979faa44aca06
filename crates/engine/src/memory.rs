//! In-memory port implementations.
//!
//! Back the engine in tests and single-process deployments where the
//! surrounding application owns durable storage separately.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use agenda_core::approval::ProjectPolicy;
use agenda_core::commitment::{Commitment, CommitmentKind};
use agenda_core::request::EventRequest;
use agenda_core::types::{ProjectId, RequestId, TrainerId};

use crate::error::{EngineError, EngineResult};
use crate::ports::{CommitmentStore, PolicyLookup, RequestStore};

// ---------------------------------------------------------------------------
// Commitments
// ---------------------------------------------------------------------------

#[derive(Default)]
struct CommitmentState {
    /// Externally-owned commitments (published events, trainer blocks).
    fixed: Vec<Commitment>,
    /// Reservations made by the engine, keyed by request id so they can be
    /// released on reject/cancel.
    reserved: HashMap<RequestId, Vec<Commitment>>,
}

/// In-memory calendar of record.
#[derive(Default)]
pub struct InMemoryCommitments {
    state: RwLock<CommitmentState>,
}

impl InMemoryCommitments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an externally-owned commitment (existing event or block).
    pub async fn add(&self, commitment: Commitment) {
        self.state.write().await.fixed.push(commitment);
    }
}

#[async_trait]
impl CommitmentStore for InMemoryCommitments {
    async fn commitments_for(
        &self,
        trainer: TrainerId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> EngineResult<Vec<Commitment>> {
        let state = self.state.read().await;
        let mut result: Vec<Commitment> = state
            .fixed
            .iter()
            .chain(state.reserved.values().flatten())
            .filter(|c| c.trainer == trainer && c.overlaps(window_start, window_end))
            .cloned()
            .collect();
        result.sort_by_key(|c| c.start);
        Ok(result)
    }

    async fn reserve(&self, request: &EventRequest) -> EngineResult<()> {
        let entries: Vec<Commitment> = request
            .trainers
            .iter()
            .map(|&trainer| Commitment {
                trainer,
                start: request.start,
                end: request.end,
                kind: CommitmentKind::Event,
                municipality: request
                    .modality
                    .requires_travel()
                    .then_some(request.municipality),
            })
            .collect();

        self.state.write().await.reserved.insert(request.id, entries);
        Ok(())
    }

    async fn release(&self, request_id: RequestId) -> EngineResult<()> {
        self.state.write().await.reserved.remove(&request_id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// In-memory project-policy configuration.
#[derive(Default)]
pub struct InMemoryPolicies {
    policies: RwLock<HashMap<ProjectId, ProjectPolicy>>,
}

impl InMemoryPolicies {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, project: ProjectId, policy: ProjectPolicy) {
        self.policies.write().await.insert(project, policy);
    }
}

#[async_trait]
impl PolicyLookup for InMemoryPolicies {
    async fn policy_for(&self, project: ProjectId) -> EngineResult<ProjectPolicy> {
        self.policies
            .read()
            .await
            .get(&project)
            .copied()
            .ok_or(EngineError::PolicyNotFound(project))
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// In-memory event-request store.
#[derive(Default)]
pub struct InMemoryRequests {
    requests: RwLock<HashMap<RequestId, EventRequest>>,
}

impl InMemoryRequests {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestStore for InMemoryRequests {
    async fn insert(&self, request: &EventRequest) -> EngineResult<()> {
        self.requests
            .write()
            .await
            .insert(request.id, request.clone());
        Ok(())
    }

    async fn update(&self, request: &EventRequest) -> EngineResult<()> {
        let mut requests = self.requests.write().await;
        if !requests.contains_key(&request.id) {
            return Err(EngineError::RequestNotFound(request.id));
        }
        requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn get(&self, id: RequestId) -> EngineResult<Option<EventRequest>> {
        Ok(self.requests.read().await.get(&id).cloned())
    }
}
