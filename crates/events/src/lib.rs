//! Scheduling event bus.
//!
//! Downstream read models (dashboards, audit log) observe the engine
//! through this crate:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`SchedulingEvent`] — the canonical domain event envelope.
//!
//! Observers are fire-and-forget: the engine's correctness never depends
//! on anyone listening.

pub mod bus;

pub use bus::{
    EventBus, SchedulingEvent, EVENT_APPROVED, EVENT_CANCELLED, EVENT_PUBLISHED,
    EVENT_PUBLISH_FAILED, EVENT_REJECTED, EVENT_SUBMITTED,
};
