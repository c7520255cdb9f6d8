//! Configuration type definitions for avision.
//!
//! These types are deserialized from TOML config files. All fields are
//! optional in the file; accessor methods in [`super::defaults`] supply
//! the built-in values.
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! base_url = "http://192.168.1.20:5000"
//! origin = "http://127.0.0.1:5500"
//!
//! [poll]
//! base_interval_ms = 250
//! background_interval_ms = 1200
//! backoff_base_ms = 600
//! backoff_multiplier = 1.6
//! backoff_ceiling_ms = 4000
//! ```

use serde::{Deserialize, Serialize};

/// Main configuration loaded from TOML config files.
///
/// Loaded from:
/// 1. User config: `~/.avision/config.toml`
/// 2. Project config: `./.avision/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AvisionConfig {
    /// Where the detection service lives
    #[serde(default)]
    pub server: ServerConfig,

    /// Polling cadence and failure policy
    #[serde(default)]
    pub poll: PollConfig,
}

/// Detection service location.
///
/// `base_url` wins when set. Otherwise the base is derived from `origin`:
/// same-origin, unless the origin is the local dev server on `dev_port`, in
/// which case the backend is assumed on `backend_port` of the same host.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Explicit base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Origin the dashboard is served from.
    /// Default: `http://127.0.0.1:5000`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// Port of the live-reload dev server. Default: 5500.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_port: Option<u16>,

    /// Backend port used when running from the dev server. Default: 5000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_port: Option<u16>,
}

/// Polling policy.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PollConfig {
    /// Tick interval while the dashboard is visible. Default: 250ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_interval_ms: Option<u64>,

    /// Tick interval while the dashboard is hidden. Default: 1200ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_interval_ms: Option<u64>,

    /// First backoff delay after a failure. Default: 600ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_base_ms: Option<u64>,

    /// Growth factor for consecutive failures. Default: 1.6.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_multiplier: Option<f64>,

    /// Backoff cap. Default: 4000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_ceiling_ms: Option<u64>,

    /// Time since last success after which failures are surfaced to the
    /// diagnostic banner. Default: 2000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_threshold_ms: Option<u64>,

    /// Time since last success after which the connection is shown as
    /// offline. Default: 1500ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offline_threshold_ms: Option<u64>,

    /// How long a diagnostic banner stays up. Default: 8000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic_ttl_ms: Option<u64>,
}
