//! Default values for configuration types.
//!
//! File fields are all optional; these accessors resolve them against the
//! built-in values.

use crate::config::types::{PollConfig, ServerConfig};

pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:5000";
pub const DEFAULT_DEV_PORT: u16 = 5500;
pub const DEFAULT_BACKEND_PORT: u16 = 5000;

pub const DEFAULT_BASE_INTERVAL_MS: u64 = 250;
pub const DEFAULT_BACKGROUND_INTERVAL_MS: u64 = 1200;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 600;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.6;
pub const DEFAULT_BACKOFF_CEILING_MS: u64 = 4000;
pub const DEFAULT_STALE_THRESHOLD_MS: u64 = 2000;
pub const DEFAULT_OFFLINE_THRESHOLD_MS: u64 = 1500;
pub const DEFAULT_DIAGNOSTIC_TTL_MS: u64 = 8000;

impl ServerConfig {
    pub fn origin(&self) -> &str {
        self.origin.as_deref().unwrap_or(DEFAULT_ORIGIN)
    }

    pub fn dev_port(&self) -> u16 {
        self.dev_port.unwrap_or(DEFAULT_DEV_PORT)
    }

    pub fn backend_port(&self) -> u16 {
        self.backend_port.unwrap_or(DEFAULT_BACKEND_PORT)
    }
}

impl PollConfig {
    pub fn base_interval_ms(&self) -> u64 {
        self.base_interval_ms.unwrap_or(DEFAULT_BASE_INTERVAL_MS)
    }

    pub fn background_interval_ms(&self) -> u64 {
        self.background_interval_ms
            .unwrap_or(DEFAULT_BACKGROUND_INTERVAL_MS)
    }

    pub fn backoff_base_ms(&self) -> u64 {
        self.backoff_base_ms.unwrap_or(DEFAULT_BACKOFF_BASE_MS)
    }

    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier.unwrap_or(DEFAULT_BACKOFF_MULTIPLIER)
    }

    pub fn backoff_ceiling_ms(&self) -> u64 {
        self.backoff_ceiling_ms.unwrap_or(DEFAULT_BACKOFF_CEILING_MS)
    }

    pub fn stale_threshold_ms(&self) -> u64 {
        self.stale_threshold_ms.unwrap_or(DEFAULT_STALE_THRESHOLD_MS)
    }

    pub fn offline_threshold_ms(&self) -> u64 {
        self.offline_threshold_ms
            .unwrap_or(DEFAULT_OFFLINE_THRESHOLD_MS)
    }

    pub fn diagnostic_ttl_ms(&self) -> u64 {
        self.diagnostic_ttl_ms.unwrap_or(DEFAULT_DIAGNOSTIC_TTL_MS)
    }
}
