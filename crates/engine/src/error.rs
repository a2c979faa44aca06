use agenda_calendar::PublishError;
use agenda_core::error::CoreError;
use agenda_core::types::{ProjectId, RequestId};

/// Error type for engine operations.
///
/// Conflict outcomes are not represented here — they are expected results
/// returned through [`SubmissionOutcome`](crate::service::SubmissionOutcome).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level error (validation or invalid transition).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The calendar publisher failed during a synchronous operation
    /// (e.g. retracting on cancel).
    #[error("Publish failed: {0}")]
    Publish(#[from] PublishError),

    /// No stored request with this id.
    #[error("Request not found: {0}")]
    RequestNotFound(RequestId),

    /// The configuration collaborator has no policy for this project.
    #[error("No approval policy configured for project {0}")]
    PolicyNotFound(ProjectId),
}

/// Convenience alias for engine operation results.
pub type EngineResult<T> = Result<T, EngineError>;
