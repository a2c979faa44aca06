//! Tracing setup for host applications.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// Filtering follows `RUST_LOG` when set, defaulting to `info` for the
/// `agenda` crates. Call once at startup of the embedding application.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agenda=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
