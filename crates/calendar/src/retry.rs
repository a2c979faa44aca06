//! Bounded retry with backoff around a [`CalendarPublisher`].
//!
//! Transient failures are retried with backoff (1 s, 2 s, 4 s; further
//! attempts reuse the last delay); permanent failures stop immediately.
//! The caller records the attempt count and halts automatic publishing on
//! exhaustion — the request is never silently dropped and never regresses
//! in status.

use std::time::Duration;

use agenda_core::request::{EventRequest, ExternalCalendarRef};

use crate::publisher::{validate_entry, CalendarPublisher, PublishError};

/// Default number of publish attempts before giving up.
pub const DEFAULT_PUBLISH_ATTEMPTS: u32 = 3;

/// Delays between attempts; attempts beyond the table reuse the last entry.
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// Outcome of an exhausted or halted publish run.
#[derive(Debug)]
pub struct PublishFailureReport {
    /// The last error observed.
    pub error: PublishError,
    /// How many attempts were made before giving up.
    pub attempts: u32,
}

/// Publish with bounded retry.
///
/// Successful results are validated against the request's modality (an
/// online session without a meeting link counts as a permanent failure).
/// `attempts` below 1 is treated as 1.
pub async fn publish_with_retry(
    publisher: &dyn CalendarPublisher,
    request: &EventRequest,
    attempts: u32,
) -> Result<ExternalCalendarRef, PublishFailureReport> {
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        let result = publisher
            .publish(request)
            .await
            .and_then(|entry| validate_entry(request.modality, &entry).map(|()| entry));

        match result {
            Ok(entry) => return Ok(entry),
            Err(error) if !error.is_retryable() => {
                tracing::error!(
                    request_id = %request.id,
                    error = %error,
                    "Permanent publish failure, halting retries"
                );
                return Err(PublishFailureReport { error, attempts: attempt });
            }
            Err(error) => {
                tracing::warn!(
                    request_id = %request.id,
                    attempt,
                    error = %error,
                    "Publish attempt failed"
                );
                if attempt == attempts {
                    return Err(PublishFailureReport { error, attempts });
                }
                let delay = RETRY_DELAYS_SECS
                    .get(attempt as usize - 1)
                    .copied()
                    .unwrap_or(RETRY_DELAYS_SECS[RETRY_DELAYS_SECS.len() - 1]);
                tokio::time::sleep(Duration::from_secs(delay)).await;
            }
        }
    }

    unreachable!("loop always returns")
}
