//! Logging initialization with environment-based formatters.
//!
//! Production emits structured JSON for log aggregation; everything else gets
//! colorful human-readable output.

use crate::config::get_environment;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Honors `RUST_LOG`; defaults to `info`.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let is_production = matches!(get_environment().as_str(), "production" | "prod");

    if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stdout),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .init();
    }
}
