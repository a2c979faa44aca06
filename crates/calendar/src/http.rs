//! HTTP adapter for the external calendar service.
//!
//! Entries are upserted with `PUT {base_url}/events/{request_id}` — the
//! request id acts as the idempotency key, so re-publishing the same
//! request overwrites the existing entry instead of duplicating it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use agenda_core::request::{EventRequest, ExternalCalendarRef};
use agenda_core::types::{Modality, RequestId};

use crate::publisher::{CalendarPublisher, PublishError};

/// Adapter configuration loaded from environment variables.
///
/// | Env Var                 | Default                 |
/// |-------------------------|-------------------------|
/// | `CALENDAR_BASE_URL`     | `http://localhost:8080` |
/// | `CALENDAR_TIMEOUT_SECS` | `10`                    |
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    /// Base URL of the calendar service.
    pub base_url: String,
    /// Per-attempt HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl CalendarConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("CALENDAR_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into());

        let request_timeout_secs: u64 = std::env::var("CALENDAR_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("CALENDAR_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            request_timeout_secs,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            request_timeout_secs: 10,
        }
    }
}

/// Shape of the calendar service's upsert response.
#[derive(Debug, Deserialize)]
struct UpsertResponse {
    id: String,
    #[serde(default)]
    meeting_link: Option<String>,
}

/// Production [`CalendarPublisher`] talking to the calendar service over
/// HTTP.
pub struct HttpCalendarPublisher {
    client: reqwest::Client,
    config: CalendarConfig,
}

impl HttpCalendarPublisher {
    /// Create a publisher with a pre-configured HTTP client.
    pub fn new(config: CalendarConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    fn event_url(&self, request_id: RequestId) -> String {
        format!(
            "{}/events/{request_id}",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CalendarPublisher for HttpCalendarPublisher {
    async fn publish(&self, request: &EventRequest) -> Result<ExternalCalendarRef, PublishError> {
        let body = serde_json::json!({
            "request_id": request.id,
            "municipality_id": request.municipality,
            "modality": request.modality,
            "trainer_ids": request.trainers,
            "start": request.start,
            "end": request.end,
            "create_meeting": request.modality == Modality::Online,
        });

        let response = self
            .client
            .put(self.event_url(request.id))
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        if let Some(err) = classify_status(status) {
            return Err(err);
        }

        let parsed: UpsertResponse = response.json().await.map_err(|e| {
            PublishError::Permanent(format!("Malformed calendar service response: {e}"))
        })?;

        tracing::info!(
            request_id = %request.id,
            external_id = %parsed.id,
            "Calendar entry upserted"
        );

        Ok(ExternalCalendarRef {
            external_id: parsed.id,
            meeting_link: parsed.meeting_link,
        })
    }

    async fn retract(&self, request_id: RequestId) -> Result<(), PublishError> {
        let response = self
            .client
            .delete(self.event_url(request_id))
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        // The entry being gone already is the desired end state.
        if status == 404 {
            return Ok(());
        }
        if let Some(err) = classify_status(status) {
            return Err(err);
        }

        tracing::info!(request_id = %request_id, "Calendar entry retracted");
        Ok(())
    }
}

/// Map a transport-level failure onto the error taxonomy. Network trouble
/// is always worth retrying.
fn classify_transport_error(err: reqwest::Error) -> PublishError {
    PublishError::Transient(format!("HTTP request failed: {err}"))
}

/// Map a non-success HTTP status onto the error taxonomy.
///
/// 5xx and 429 are service-side or quota trouble (transient); any other
/// 4xx means the request itself is bad (permanent). Returns `None` for
/// success statuses.
fn classify_status(status: u16) -> Option<PublishError> {
    match status {
        200..=299 => None,
        429 => Some(PublishError::Transient(format!(
            "Calendar service returned HTTP {status}"
        ))),
        500..=599 => Some(PublishError::Transient(format!(
            "Calendar service returned HTTP {status}"
        ))),
        other => Some(PublishError::Permanent(format!(
            "Calendar service returned HTTP {other}"
        ))),
    }
}
