//! ## netvakt-telemetry::logging
//! Structured logging with tracing.
//!
//! `RUST_LOG` wins when set; otherwise the configured default filter
//! applies.

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Install the global subscriber with the default "info" filter.
    pub fn init() {
        Self::init_with_default("info")
    }

    /// Install the global subscriber, using `default_filter` when
    /// `RUST_LOG` is unset. Safe to call once per process.
    pub fn init_with_default(default_filter: &str) {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_filter)),
            )
            .with_thread_names(true)
            .init()
    }
}
