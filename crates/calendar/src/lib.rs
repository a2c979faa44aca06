//! External calendar integration boundary.
//!
//! The engine hands approved requests to a [`CalendarPublisher`]; this
//! crate defines that boundary and ships the production HTTP adapter:
//!
//! - [`publisher`] — the [`CalendarPublisher`] trait, the
//!   [`PublishError`] taxonomy (transient vs. permanent), and
//!   result validation.
//! - [`http`] — reqwest-based adapter upserting entries keyed by the
//!   request id, so repeated publishes never create duplicates.
//! - [`retry`] — bounded exponential-backoff retry around a publisher.

pub mod http;
pub mod publisher;
pub mod retry;

pub use http::{CalendarConfig, HttpCalendarPublisher};
pub use publisher::{CalendarPublisher, PublishError};
pub use retry::{publish_with_retry, PublishFailureReport, DEFAULT_PUBLISH_ATTEMPTS};
