//! Lifecycle events shared by the CLI and the poll driver.

use tracing::{error, info};

use crate::errors::AvisionError;

/// Per-session fetch counters, reported when the driver exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub fetches: u64,
    pub failures: u64,
}

pub fn log_app_startup() {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION")
    );
}

pub fn log_app_shutdown() {
    info!(event = "core.app.shutdown_started");
}

/// Error event carrying the error's stable code.
pub fn log_coded_error<E: AvisionError>(error: &E) {
    error!(
        event = "core.app.error_occurred",
        error = %error,
        error_code = error.error_code(),
        user_error = error.is_user_error()
    );
}

pub fn log_session_started(base_url: &str, interval_ms: u64, background_interval_ms: u64) {
    info!(
        event = "core.poll.session_started",
        base_url = %base_url,
        interval_ms = interval_ms,
        background_interval_ms = background_interval_ms
    );
}

pub fn log_session_ended(base_url: &str, stats: SessionStats) {
    info!(
        event = "core.poll.session_ended",
        base_url = %base_url,
        fetches = stats.fetches,
        failures = stats.failures
    );
}
