use agenda_core::conflict::DetectionConfig;

/// Engine configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development and tests.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum physical events per trainer per calendar day
    /// (default: `1`). Online events are never capacity-limited.
    pub daily_in_person_capacity: u32,
    /// How many calendar days around the candidate's day the commitment
    /// read window covers on each side (default: `1` — the prior and
    /// following day).
    pub window_buffer_days: i64,
    /// Publish attempts before automatic retrying gives up (default: `3`).
    pub publish_attempts: u32,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `AGENDA_DAILY_CAPACITY`     | `1`     |
    /// | `AGENDA_WINDOW_BUFFER_DAYS` | `1`     |
    /// | `AGENDA_PUBLISH_ATTEMPTS`   | `3`     |
    pub fn from_env() -> Self {
        let daily_in_person_capacity: u32 = std::env::var("AGENDA_DAILY_CAPACITY")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("AGENDA_DAILY_CAPACITY must be a valid u32");

        let window_buffer_days: i64 = std::env::var("AGENDA_WINDOW_BUFFER_DAYS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("AGENDA_WINDOW_BUFFER_DAYS must be a valid i64");

        let publish_attempts: u32 = std::env::var("AGENDA_PUBLISH_ATTEMPTS")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("AGENDA_PUBLISH_ATTEMPTS must be a valid u32");

        Self {
            daily_in_person_capacity,
            window_buffer_days,
            publish_attempts,
        }
    }

    /// Load a `.env` file if present, then read the environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Detector tunables derived from this configuration.
    pub fn detection(&self) -> DetectionConfig {
        DetectionConfig {
            daily_in_person_capacity: self.daily_in_person_capacity,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            daily_in_person_capacity: 1,
            window_buffer_days: 1,
            publish_attempts: 3,
        }
    }
}
