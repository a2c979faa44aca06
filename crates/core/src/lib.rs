//! Domain logic for training-event scheduling.
//!
//! This crate holds the pure core of the scheduling engine — it has zero
//! internal deps and no knowledge of persistence or transport:
//!
//! - [`request`]: the [`EventRequest`](request::EventRequest) model and
//!   input validation.
//! - [`status`]: the request lifecycle enum and its transition table.
//! - [`workflow`]: state-machine operations (submit, approve, reject,
//!   publish bookkeeping, cancel).
//! - [`commitment`]: calendar-of-record entries and interval math.
//! - [`conflict`]: the conflict detector (direct overlap, travel time,
//!   daily capacity).
//! - [`travel`]: minimum travel-time estimation between municipalities.
//! - [`approval`]: project-policy driven approval routing.
//!
//! Everything here is synchronous and deterministic; orchestration,
//! locking, and external calls live in `agenda-engine` and
//! `agenda-calendar`.

pub mod approval;
pub mod commitment;
pub mod conflict;
pub mod error;
pub mod request;
pub mod status;
pub mod travel;
pub mod types;
pub mod workflow;

pub use approval::{route, ApprovalDecision, ProjectPolicy};
pub use commitment::{Commitment, CommitmentKind};
pub use conflict::{detect, ConflictOutcome, DetectionConfig};
pub use error::CoreError;
pub use request::{EventRequest, ExternalCalendarRef};
pub use status::RequestStatus;
pub use travel::{required_minutes, TravelTimeSource, TravelTimeTable};
pub use types::{Modality, MunicipalityId, ProjectId, RequestId, TrainerId};
