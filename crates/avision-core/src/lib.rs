//! avision-core: Core library for the A.VISION live status dashboard
//!
//! Polls a detection service for snapshots, adapts the polling rate to
//! failures and visibility, and reconciles each snapshot into the minimal
//! set of HUD mutations. Used by the `avision` CLI.
//!
//! # Main Entry Points
//!
//! - [`scheduler`] - Poll state machine and its tokio driver
//! - [`fetcher`] - Snapshot sources, including the HTTP fetcher
//! - [`reconcile`] - Render-state diffing and HUD sinks
//! - [`config`] - Configuration management
//! - [`base_url`] - Base URL normalization and endpoint paths

pub mod base_url;
pub mod config;
pub mod errors;
pub mod events;
pub mod fetcher;
pub mod logging;
pub mod reconcile;
pub mod scheduler;
pub mod snapshot;

// Re-export commonly used types at crate root for convenience
pub use config::AvisionConfig;
pub use errors::{AvisionError, AvisionResult, ConfigError};
pub use fetcher::{FetchError, FetchErrorKind, HttpFetcher, SnapshotSource};
pub use reconcile::{
    AlertState, ConnectionStatus, HudReconciler, HudSink, Reconciler, RenderState, UiMutation,
};
pub use scheduler::{
    Command, PollDriver, PollEffect, PollEvent, PollPolicy, PollScheduler, Visibility,
};
pub use snapshot::Snapshot;

// Re-export logging initialization
pub use logging::init_logging;
