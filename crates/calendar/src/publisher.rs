//! The calendar publisher boundary.

use async_trait::async_trait;

use agenda_core::request::{EventRequest, ExternalCalendarRef};
use agenda_core::types::{Modality, RequestId};

/// Why a publish attempt failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PublishError {
    /// Network, timeout, or quota trouble — worth retrying.
    #[error("Transient publish failure: {0}")]
    Transient(String),

    /// Invalid data or a deleted resource — retrying cannot help; a human
    /// must correct the request.
    #[error("Permanent publish failure: {0}")]
    Permanent(String),
}

impl PublishError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, PublishError::Transient(_))
    }
}

/// Creates and retracts entries in the external calendar.
///
/// Implementations must be idempotent keyed by the request id: publishing
/// the same id with the same content twice yields a single external
/// entry (upsert semantics).
#[async_trait]
pub trait CalendarPublisher: Send + Sync {
    /// Upsert the request into the external calendar. A successful result
    /// for an online session must carry a meeting link.
    async fn publish(&self, request: &EventRequest) -> Result<ExternalCalendarRef, PublishError>;

    /// Remove the entry for a cancelled request. Retracting an entry that
    /// no longer exists is a success.
    async fn retract(&self, request_id: RequestId) -> Result<(), PublishError>;
}

/// Check a successful publish result against the request's modality:
/// online sessions are unusable without a meeting link.
pub fn validate_entry(
    modality: Modality,
    entry: &ExternalCalendarRef,
) -> Result<(), PublishError> {
    if modality == Modality::Online && entry.meeting_link.is_none() {
        return Err(PublishError::Permanent(format!(
            "Calendar entry {} for an online session has no meeting link",
            entry.external_id
        )));
    }
    Ok(())
}
