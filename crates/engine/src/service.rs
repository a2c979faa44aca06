//! The scheduling service: submission through publish.
//!
//! Drives the workflow end to end. The serializable section
//! "read commitments → detect → reserve" runs under the per-trainer
//! locks; the publisher is only ever invoked after those locks are
//! released, so slow external calls never block new submissions.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde_json::json;

use agenda_calendar::{publish_with_retry, CalendarPublisher};
use agenda_core::approval::route;
use agenda_core::commitment::Commitment;
use agenda_core::conflict::{detect, ConflictOutcome};
use agenda_core::request::EventRequest;
use agenda_core::status::RequestStatus;
use agenda_core::travel::TravelTimeSource;
use agenda_core::types::{RequestId, TrainerId};
use agenda_events::{
    EventBus, SchedulingEvent, EVENT_APPROVED, EVENT_CANCELLED, EVENT_PUBLISHED,
    EVENT_PUBLISH_FAILED, EVENT_REJECTED, EVENT_SUBMITTED,
};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::locks::TrainerLocks;
use crate::ports::{CommitmentStore, PolicyLookup, RequestStore};

/// Result of submitting a candidate request.
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// The candidate entered the workflow. `status` reflects any publish
    /// attempt that already ran (auto-approved requests publish
    /// immediately).
    Accepted {
        id: RequestId,
        status: RequestStatus,
    },
    /// The candidate collides with a trainer's calendar; nothing was
    /// stored. The outcome explains why the slot is unavailable.
    Conflict(ConflictOutcome),
}

/// Orchestrates conflict detection, approval routing, the workflow state
/// machine, and calendar publishing.
pub struct SchedulingService {
    config: EngineConfig,
    commitments: Arc<dyn CommitmentStore>,
    policies: Arc<dyn PolicyLookup>,
    requests: Arc<dyn RequestStore>,
    publisher: Arc<dyn CalendarPublisher>,
    travel: Arc<dyn TravelTimeSource + Send + Sync>,
    bus: Arc<EventBus>,
    locks: TrainerLocks,
}

impl SchedulingService {
    pub fn new(
        config: EngineConfig,
        commitments: Arc<dyn CommitmentStore>,
        policies: Arc<dyn PolicyLookup>,
        requests: Arc<dyn RequestStore>,
        publisher: Arc<dyn CalendarPublisher>,
        travel: Arc<dyn TravelTimeSource + Send + Sync>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            config,
            commitments,
            policies,
            requests,
            publisher,
            travel,
            bus,
            locks: TrainerLocks::new(),
        }
    }

    /// Submit a validated draft.
    ///
    /// Runs conflict detection under the trainer reservation locks; a
    /// clean candidate is routed, reserved, and stored atomically with
    /// respect to other submissions touching the same trainers.
    /// Auto-approved requests continue straight into publishing.
    pub async fn submit(&self, mut candidate: EventRequest) -> EngineResult<SubmissionOutcome> {
        let policy = self.policies.policy_for(candidate.project).await?;
        let (window_start, window_end) = self.read_window(&candidate);

        let guards = self.locks.acquire(&candidate.trainers).await;

        let mut snapshot: HashMap<TrainerId, Vec<Commitment>> = HashMap::new();
        for &trainer in &candidate.trainers {
            let list = self
                .commitments
                .commitments_for(trainer, window_start, window_end)
                .await?;
            snapshot.insert(trainer, list);
        }

        let outcome = detect(
            &candidate,
            &snapshot,
            &*self.travel,
            &self.config.detection(),
        );
        if !outcome.is_clean() {
            drop(guards);
            tracing::info!(
                request_id = %candidate.id,
                outcome = ?outcome,
                "Submission blocked by conflict"
            );
            return Ok(SubmissionOutcome::Conflict(outcome));
        }

        let decision = route(&policy);
        let status = candidate.submit(&decision)?;
        self.commitments.reserve(&candidate).await?;
        self.requests.insert(&candidate).await?;
        drop(guards);

        tracing::info!(request_id = %candidate.id, status = %status, "Request submitted");
        self.emit(
            EVENT_SUBMITTED,
            &candidate,
            json!({
                "status": status,
                "routing_reason": candidate.routing_reason,
            }),
        );

        if status == RequestStatus::AutoApproved {
            self.run_publish(&mut candidate).await?;
            return Ok(SubmissionOutcome::Accepted {
                id: candidate.id,
                status: candidate.status,
            });
        }

        Ok(SubmissionOutcome::Accepted {
            id: candidate.id,
            status,
        })
    }

    /// Record a human approval and continue into publishing.
    pub async fn approve(&self, id: RequestId, note: &str) -> EngineResult<RequestStatus> {
        let mut request = self.fetch(id).await?;
        request.approve(note)?;
        self.requests.update(&request).await?;
        tracing::info!(request_id = %id, "Request approved");
        self.emit(
            EVENT_APPROVED,
            &request,
            json!({ "status": request.status, "note": note }),
        );

        self.run_publish(&mut request).await?;
        Ok(request.status)
    }

    /// Record a human rejection. Terminal: the reservation is freed and
    /// no publish is ever attempted.
    pub async fn reject(&self, id: RequestId, note: &str) -> EngineResult<RequestStatus> {
        let mut request = self.fetch(id).await?;
        request.reject(note)?;
        self.requests.update(&request).await?;
        self.commitments.release(id).await?;
        tracing::info!(request_id = %id, "Request rejected");
        self.emit(
            EVENT_REJECTED,
            &request,
            json!({ "status": request.status, "note": note }),
        );
        Ok(request.status)
    }

    /// Cancel a request: withdrawal before decision, or retraction of a
    /// published entry.
    ///
    /// For published requests the external entry is retracted first; if
    /// retraction fails the request stays `Published` and the error is
    /// surfaced to the operator.
    pub async fn cancel(&self, id: RequestId) -> EngineResult<RequestStatus> {
        let mut request = self.fetch(id).await?;

        if request.status == RequestStatus::Published {
            self.publisher.retract(id).await?;
        }
        request.cancel()?;
        self.requests.update(&request).await?;
        self.commitments.release(id).await?;
        tracing::info!(request_id = %id, "Request cancelled");
        self.emit(
            EVENT_CANCELLED,
            &request,
            json!({ "status": request.status }),
        );
        Ok(request.status)
    }

    /// Manual retry after automatic publishing halted.
    pub async fn retry_publish(&self, id: RequestId) -> EngineResult<RequestStatus> {
        let mut request = self.fetch(id).await?;
        request.rearm_publish()?;
        self.run_publish(&mut request).await?;
        Ok(request.status)
    }

    /// Run the bounded-retry publish pipeline and record its outcome.
    ///
    /// Both exhaustion and permanent failure leave the request in its
    /// publishable status with `publish_halted` set — it is never dropped
    /// and never regresses to `PendingApproval`.
    async fn run_publish(&self, request: &mut EventRequest) -> EngineResult<()> {
        match publish_with_retry(&*self.publisher, request, self.config.publish_attempts).await {
            Ok(entry) => {
                let external_id = entry.external_id.clone();
                request.record_publish_success(entry)?;
                self.requests.update(request).await?;
                tracing::info!(
                    request_id = %request.id,
                    external_id = %external_id,
                    "Request published"
                );
                self.emit(
                    EVENT_PUBLISHED,
                    request,
                    json!({ "status": request.status, "external_id": external_id }),
                );
            }
            Err(report) => {
                request.record_publish_failure(report.attempts, true)?;
                self.requests.update(request).await?;
                tracing::error!(
                    request_id = %request.id,
                    attempts = report.attempts,
                    error = %report.error,
                    "Publishing halted; manual intervention required"
                );
                self.emit(
                    EVENT_PUBLISH_FAILED,
                    request,
                    json!({
                        "status": request.status,
                        "attempts": report.attempts,
                        "retryable": report.error.is_retryable(),
                        "error": report.error.to_string(),
                    }),
                );
            }
        }
        Ok(())
    }

    async fn fetch(&self, id: RequestId) -> EngineResult<EventRequest> {
        self.requests
            .get(id)
            .await?
            .ok_or(EngineError::RequestNotFound(id))
    }

    /// Commitment read window: the candidate's calendar day plus the
    /// travel buffer on each side.
    fn read_window(&self, candidate: &EventRequest) -> (DateTime<Utc>, DateTime<Utc>) {
        let midnight = candidate.day().and_time(NaiveTime::MIN).and_utc();
        let buffer = Duration::days(self.config.window_buffer_days);
        (midnight - buffer, midnight + Duration::days(1) + buffer)
    }

    fn emit(&self, event_type: &str, request: &EventRequest, payload: serde_json::Value) {
        self.bus.publish(
            SchedulingEvent::new(event_type)
                .with_request(request.id)
                .with_payload(payload),
        );
    }
}
