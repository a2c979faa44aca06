use crate::status::RequestStatus;

/// Domain-level error type.
///
/// Conflict outcomes are *not* errors — they are expected results and are
/// returned as [`ConflictOutcome`](crate::conflict::ConflictOutcome).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed validation before any conflict check ran.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A lifecycle operation was attempted from a state that does not
    /// allow it. Never coerced into a neighbouring state.
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },
}
