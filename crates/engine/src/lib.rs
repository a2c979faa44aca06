//! Scheduling engine orchestration.
//!
//! Ties the pure domain logic of `agenda-core` to the outside world:
//!
//! - [`ports`] — async traits for the collaborators the engine needs
//!   (calendar of record, project-policy configuration, request
//!   persistence).
//! - [`memory`] — in-memory port implementations for tests and
//!   single-process embedding.
//! - [`locks`] — per-trainer reservation locks making
//!   read-commitments → detect → reserve serializable.
//! - [`service`] — the [`SchedulingService`] driving the workflow from
//!   submission through publish, cancel, and manual retry.
//! - [`config`] — environment-driven engine configuration.
//! - [`telemetry`] — tracing-subscriber setup for host applications.
//!
//! The engine has no network protocol of its own; it is invoked
//! in-process by the surrounding application.

pub mod config;
pub mod error;
pub mod locks;
pub mod memory;
pub mod ports;
pub mod service;
pub mod telemetry;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use locks::TrainerLocks;
pub use memory::{InMemoryCommitments, InMemoryPolicies, InMemoryRequests};
pub use ports::{CommitmentStore, PolicyLookup, RequestStore};
pub use service::{SchedulingService, SubmissionOutcome};
