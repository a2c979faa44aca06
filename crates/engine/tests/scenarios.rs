//! End-to-end workflow tests against in-memory collaborators.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use agenda_calendar::{CalendarPublisher, PublishError};
use agenda_core::approval::ProjectPolicy;
use agenda_core::commitment::{Commitment, CommitmentKind};
use agenda_core::conflict::ConflictOutcome;
use agenda_core::request::{EventRequest, ExternalCalendarRef};
use agenda_core::status::RequestStatus;
use agenda_core::travel::TravelTimeTable;
use agenda_core::types::{Modality, RequestId, TrainerId};
use agenda_engine::{
    EngineConfig, EngineError, InMemoryCommitments, InMemoryPolicies, InMemoryRequests,
    RequestStore, SchedulingService, SubmissionOutcome,
};
use agenda_events::EventBus;

const MUNI_M: i64 = 10;
const MUNI_N: i64 = 20;
const PROJECT: i64 = 100;

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, min, 0).unwrap()
}

fn candidate(trainers: Vec<TrainerId>, modality: Modality, start_h: u32, end_h: u32) -> EventRequest {
    EventRequest::new(trainers, PROJECT, MUNI_M, modality, at(start_h, 0), at(end_h, 0)).unwrap()
}

// ---------------------------------------------------------------------------
// Publisher test doubles
// ---------------------------------------------------------------------------

/// Plays back a script of outcomes, then succeeds forever. Records calls
/// and retractions.
struct ScriptedPublisher {
    script: Mutex<VecDeque<Result<ExternalCalendarRef, PublishError>>>,
    publish_calls: AtomicU32,
    retracted: Mutex<Vec<RequestId>>,
}

impl ScriptedPublisher {
    fn always_ok() -> Self {
        Self::with_script(vec![])
    }

    fn with_script(script: Vec<Result<ExternalCalendarRef, PublishError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            publish_calls: AtomicU32::new(0),
            retracted: Mutex::new(Vec::new()),
        }
    }

    fn publish_calls(&self) -> u32 {
        self.publish_calls.load(Ordering::SeqCst)
    }

    fn retracted(&self) -> Vec<RequestId> {
        self.retracted.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarPublisher for ScriptedPublisher {
    async fn publish(&self, request: &EventRequest) -> Result<ExternalCalendarRef, PublishError> {
        self.publish_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(scripted) = self.script.lock().unwrap().pop_front() {
            return scripted;
        }
        Ok(ExternalCalendarRef {
            external_id: format!("cal-{}", request.id),
            meeting_link: Some("https://meet.example/x".to_string()),
        })
    }

    async fn retract(&self, request_id: RequestId) -> Result<(), PublishError> {
        self.retracted.lock().unwrap().push(request_id);
        Ok(())
    }
}

/// Upserts entries keyed by request id, like the real calendar service.
#[derive(Default)]
struct UpsertPublisher {
    entries: Mutex<HashMap<RequestId, ExternalCalendarRef>>,
}

impl UpsertPublisher {
    fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl CalendarPublisher for UpsertPublisher {
    async fn publish(&self, request: &EventRequest) -> Result<ExternalCalendarRef, PublishError> {
        let entry = ExternalCalendarRef {
            external_id: format!("cal-{}", request.id),
            meeting_link: Some("https://meet.example/x".to_string()),
        };
        self.entries
            .lock()
            .unwrap()
            .insert(request.id, entry.clone());
        Ok(entry)
    }

    async fn retract(&self, request_id: RequestId) -> Result<(), PublishError> {
        self.entries.lock().unwrap().remove(&request_id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    service: SchedulingService,
    commitments: Arc<InMemoryCommitments>,
    policies: Arc<InMemoryPolicies>,
    requests: Arc<InMemoryRequests>,
    publisher: Arc<ScriptedPublisher>,
    bus: Arc<EventBus>,
}

fn harness_with(publisher: ScriptedPublisher) -> Harness {
    let commitments = Arc::new(InMemoryCommitments::new());
    let policies = Arc::new(InMemoryPolicies::new());
    let requests = Arc::new(InMemoryRequests::new());
    let publisher = Arc::new(publisher);
    let bus = Arc::new(EventBus::default());

    let mut travel = TravelTimeTable::new();
    travel.insert(MUNI_M, MUNI_N, 90);

    let service = SchedulingService::new(
        EngineConfig::default(),
        commitments.clone(),
        policies.clone(),
        requests.clone(),
        publisher.clone(),
        Arc::new(travel),
        bus.clone(),
    );

    Harness {
        service,
        commitments,
        policies,
        requests,
        publisher,
        bus,
    }
}

fn harness() -> Harness {
    harness_with(ScriptedPublisher::always_ok())
}

async fn set_policy(h: &Harness, always: bool, oversight: bool) {
    h.policies
        .set(
            PROJECT,
            ProjectPolicy {
                always_require_approval: always,
                linked_to_oversight_body: oversight,
            },
        )
        .await;
}

fn accepted_id(outcome: &SubmissionOutcome) -> RequestId {
    match outcome {
        SubmissionOutcome::Accepted { id, .. } => *id,
        other => panic!("expected acceptance, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Scenario C: auto-approval straight through to publish
// ---------------------------------------------------------------------------

#[tokio::test]
async fn auto_approved_request_publishes_without_human_step() {
    let h = harness();
    set_policy(&h, false, false).await;
    let mut rx = h.bus.subscribe();

    let outcome = h
        .service
        .submit(candidate(vec![1], Modality::Online, 9, 11))
        .await
        .unwrap();
    let id = accepted_id(&outcome);

    let stored = h.requests.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Published);
    assert!(stored.decision_note.is_none());
    let entry = stored.external_calendar_ref.unwrap();
    assert!(entry.meeting_link.is_some());

    // Observers saw the submission and the publish.
    let first = rx.recv().await.unwrap();
    assert_eq!(first.event_type, "request.submitted");
    assert_eq!(first.payload["status"], "auto_approved");
    let second = rx.recv().await.unwrap();
    assert_eq!(second.event_type, "request.published");
}

// ---------------------------------------------------------------------------
// Scenario D: oversight-body review and rejection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn oversight_project_goes_to_pending_and_reject_is_terminal() {
    let h = harness();
    set_policy(&h, false, true).await;

    let outcome = h
        .service
        .submit(candidate(vec![1], Modality::InPerson, 9, 12))
        .await
        .unwrap();
    let id = accepted_id(&outcome);

    let stored = h.requests.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::PendingApproval);
    assert_eq!(stored.routing_reason.as_deref(), Some("oversight body review"));

    let status = h
        .service
        .reject(id, "incomplete justification")
        .await
        .unwrap();
    assert_eq!(status, RequestStatus::Rejected);

    // No publish was ever attempted.
    assert_eq!(h.publisher.publish_calls(), 0);

    // Terminal: approving afterwards is an illegal transition.
    let err = h.service.approve(id, "late").await.unwrap_err();
    assert_matches!(err, EngineError::Core(_));
}

#[tokio::test]
async fn approval_with_note_publishes() {
    let h = harness();
    set_policy(&h, true, false).await;

    let outcome = h
        .service
        .submit(candidate(vec![1], Modality::Online, 9, 11))
        .await
        .unwrap();
    let id = accepted_id(&outcome);

    let stored = h.requests.get(id).await.unwrap().unwrap();
    assert_eq!(stored.routing_reason.as_deref(), Some("project policy"));

    let status = h.service.approve(id, "Budget confirmed").await.unwrap();
    assert_eq!(status, RequestStatus::Published);

    let stored = h.requests.get(id).await.unwrap().unwrap();
    assert_eq!(stored.decision_note.as_deref(), Some("Budget confirmed"));
}

// ---------------------------------------------------------------------------
// Conflicts surface as structured outcomes, not stored requests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn direct_overlap_blocks_submission() {
    let h = harness();
    set_policy(&h, false, false).await;
    h.commitments
        .add(Commitment {
            trainer: 1,
            start: at(9, 0),
            end: at(12, 0),
            kind: CommitmentKind::Event,
            municipality: Some(MUNI_M),
        })
        .await;

    let cand = candidate(vec![1], Modality::InPerson, 11, 13);
    let cand_id = cand.id;
    let outcome = h.service.submit(cand).await.unwrap();

    assert_matches!(
        outcome,
        SubmissionOutcome::Conflict(ConflictOutcome::DirectOverlap { trainer: 1, .. })
    );
    // Nothing persisted, nothing published.
    assert!(h.requests.get(cand_id).await.unwrap().is_none());
    assert_eq!(h.publisher.publish_calls(), 0);
}

#[tokio::test]
async fn insufficient_travel_time_blocks_submission() {
    let h = harness();
    set_policy(&h, false, false).await;
    // Prior commitment ends 17:00 in N; 90 minutes required to M, only 60
    // available before an 18:00 start.
    h.commitments
        .add(Commitment {
            trainer: 1,
            start: at(14, 0),
            end: at(17, 0),
            kind: CommitmentKind::Event,
            municipality: Some(MUNI_N),
        })
        .await;

    let outcome = h
        .service
        .submit(candidate(vec![1], Modality::InPerson, 18, 19))
        .await
        .unwrap();

    assert_matches!(
        outcome,
        SubmissionOutcome::Conflict(ConflictOutcome::InsufficientTravelTime {
            required_minutes: 90,
            available_minutes: 60,
            ..
        })
    );
}

// ---------------------------------------------------------------------------
// Reservation semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pending_reservation_blocks_second_request() {
    let h = harness();
    set_policy(&h, false, true).await;

    let first = h
        .service
        .submit(candidate(vec![1], Modality::Online, 9, 11))
        .await
        .unwrap();
    assert_matches!(first, SubmissionOutcome::Accepted { .. });

    // Same trainer, overlapping window: the pending reservation already
    // occupies the calendar.
    let second = h
        .service
        .submit(candidate(vec![1], Modality::Online, 10, 12))
        .await
        .unwrap();
    assert_matches!(
        second,
        SubmissionOutcome::Conflict(ConflictOutcome::DirectOverlap { .. })
    );
}

#[tokio::test]
async fn rejection_frees_the_slot() {
    let h = harness();
    set_policy(&h, false, true).await;

    let first = h
        .service
        .submit(candidate(vec![1], Modality::Online, 9, 11))
        .await
        .unwrap();
    let id = accepted_id(&first);
    h.service.reject(id, "double-check the venue").await.unwrap();

    let retry = h
        .service
        .submit(candidate(vec![1], Modality::Online, 9, 11))
        .await
        .unwrap();
    assert_matches!(retry, SubmissionOutcome::Accepted { .. });
}

#[tokio::test]
async fn withdrawal_before_decision_frees_the_slot() {
    let h = harness();
    set_policy(&h, false, true).await;

    let first = h
        .service
        .submit(candidate(vec![1], Modality::Online, 9, 11))
        .await
        .unwrap();
    let id = accepted_id(&first);

    let status = h.service.cancel(id).await.unwrap();
    assert_eq!(status, RequestStatus::Cancelled);
    // Withdrawn before any decision: nothing was published, so nothing
    // is retracted.
    assert!(h.publisher.retracted().is_empty());

    let retry = h
        .service
        .submit(candidate(vec![1], Modality::Online, 9, 11))
        .await
        .unwrap();
    assert_matches!(retry, SubmissionOutcome::Accepted { .. });
}

#[tokio::test]
async fn cancelling_published_request_retracts_the_entry() {
    let h = harness();
    set_policy(&h, false, false).await;

    let outcome = h
        .service
        .submit(candidate(vec![1], Modality::Online, 9, 11))
        .await
        .unwrap();
    let id = accepted_id(&outcome);
    assert_eq!(
        h.requests.get(id).await.unwrap().unwrap().status,
        RequestStatus::Published
    );

    let status = h.service.cancel(id).await.unwrap();
    assert_eq!(status, RequestStatus::Cancelled);
    assert_eq!(h.publisher.retracted(), vec![id]);
}

#[tokio::test]
async fn cancel_of_approved_unpublished_request_is_rejected() {
    // Publisher fails permanently, stranding the request in Approved.
    let h = harness_with(ScriptedPublisher::with_script(vec![Err(
        PublishError::Permanent("calendar deleted".into()),
    )]));
    set_policy(&h, true, false).await;

    let outcome = h
        .service
        .submit(candidate(vec![1], Modality::Online, 9, 11))
        .await
        .unwrap();
    let id = accepted_id(&outcome);
    h.service.approve(id, "ok").await.unwrap();

    let stored = h.requests.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Approved);
    assert!(stored.publish_halted);

    // Approved is not cancellable; only pending and published requests are.
    let err = h.service.cancel(id).await.unwrap_err();
    assert_matches!(err, EngineError::Core(_));
    assert!(h.publisher.retracted().is_empty());
}

// ---------------------------------------------------------------------------
// Scenario E: transient failures, halt, manual retry
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn transient_publish_failures_halt_then_manual_retry_succeeds() {
    let h = harness_with(ScriptedPublisher::with_script(vec![
        Err(PublishError::Transient("503".into())),
        Err(PublishError::Transient("503".into())),
        Err(PublishError::Transient("503".into())),
    ]));
    set_policy(&h, false, false).await;

    let outcome = h
        .service
        .submit(candidate(vec![1], Modality::Online, 9, 11))
        .await
        .unwrap();
    let id = accepted_id(&outcome);

    // Retries exhausted: still auto-approved, halted, three failures.
    let stored = h.requests.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::AutoApproved);
    assert_eq!(stored.publish_failures, 3);
    assert!(stored.publish_halted);
    assert_eq!(h.publisher.publish_calls(), 3);

    // No automatic further retry happens on its own.
    tokio::time::sleep(std::time::Duration::from_secs(60)).await;
    assert_eq!(h.publisher.publish_calls(), 3);

    // Manual retry: the fourth attempt succeeds.
    let status = h.service.retry_publish(id).await.unwrap();
    assert_eq!(status, RequestStatus::Published);
    assert_eq!(h.publisher.publish_calls(), 4);

    let stored = h.requests.get(id).await.unwrap().unwrap();
    assert!(!stored.publish_halted);
    assert!(stored.external_calendar_ref.is_some());
}

#[tokio::test(start_paused = true)]
async fn permanent_publish_failure_halts_without_retrying() {
    let h = harness_with(ScriptedPublisher::with_script(vec![Err(
        PublishError::Permanent("calendar deleted".into()),
    )]));
    set_policy(&h, false, false).await;

    let outcome = h
        .service
        .submit(candidate(vec![1], Modality::Online, 9, 11))
        .await
        .unwrap();
    let id = accepted_id(&outcome);

    let stored = h.requests.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::AutoApproved);
    assert!(stored.publish_halted);
    assert_eq!(h.publisher.publish_calls(), 1);
}

#[tokio::test]
async fn retry_publish_on_published_request_is_rejected() {
    let h = harness();
    set_policy(&h, false, false).await;

    let outcome = h
        .service
        .submit(candidate(vec![1], Modality::Online, 9, 11))
        .await
        .unwrap();
    let id = accepted_id(&outcome);

    let err = h.service.retry_publish(id).await.unwrap_err();
    assert_matches!(err, EngineError::Core(_));
}

// ---------------------------------------------------------------------------
// Publisher idempotence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publishing_the_same_request_twice_creates_one_entry() {
    let publisher = UpsertPublisher::default();
    let request = candidate(vec![1], Modality::Online, 9, 11);

    publisher.publish(&request).await.unwrap();
    publisher.publish(&request).await.unwrap();

    assert_eq!(publisher.entry_count(), 1);
}

// ---------------------------------------------------------------------------
// Double-booking under concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_overlapping_submissions_accept_exactly_one() {
    let h = Arc::new(harness());
    set_policy(&h, false, true).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let h = h.clone();
        handles.push(tokio::spawn(async move {
            h.service
                .submit(candidate(vec![1], Modality::Online, 9, 11))
                .await
                .unwrap()
        }));
    }

    let mut accepted = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            SubmissionOutcome::Accepted { .. } => accepted += 1,
            SubmissionOutcome::Conflict(_) => conflicts += 1,
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(conflicts, 7);
}

// ---------------------------------------------------------------------------
// Error surfacing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_request_id_is_reported() {
    let h = harness();
    let err = h.service.approve(RequestId::new_v4(), "note").await.unwrap_err();
    assert_matches!(err, EngineError::RequestNotFound(_));
}

#[tokio::test]
async fn missing_policy_is_reported_before_any_locking() {
    let h = harness();
    // No policy seeded for the project.
    let err = h
        .service
        .submit(candidate(vec![1], Modality::Online, 9, 11))
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::PolicyNotFound(PROJECT));
}
