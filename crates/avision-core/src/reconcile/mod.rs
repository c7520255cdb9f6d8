//! Snapshot reconciliation.
//!
//! [`RenderState`] caches what was last rendered and turns each snapshot
//! into the minimal list of [`UiMutation`]s. [`HudReconciler`] pairs that
//! cache with a [`HudSink`] that actually draws.

pub mod hud;
pub mod render_state;
pub mod types;

pub use hud::{HudReconciler, HudSink};
pub use render_state::{RenderState, diff_snapshot, format_number};
pub use types::{
    AlertBanner, AlertState, ConnectionStatus, Light, TextSlot, UiMutation, VoiceLogLine,
};

use crate::snapshot::Snapshot;

/// Callbacks the poll driver invokes as the scheduler emits effects.
///
/// # Semantics
///
/// - **Idempotency**: `reconcile` with a snapshot identical to the previous
///   one produces no observable change. The same holds for repeated
///   `render_stale` and `set_connection` with an unchanged status.
/// - **Voice log**: re-rendered in full only when the newest entry's
///   timestamp is strictly greater than the last one rendered.
/// - **Orientation**: the first portrait frame of a session rotates the
///   view by 90 degrees once. Later frames never auto-rotate again.
/// - **Video**: `update_video` refreshes only when the base URL changed or
///   `force` is set. `now_ms` is wall-clock epoch milliseconds.
pub trait Reconciler {
    fn reconcile(&mut self, snapshot: &Snapshot);
    fn render_stale(&mut self);
    fn set_connection(&mut self, status: ConnectionStatus);
    fn show_diagnostic(&mut self, message: &str);
    fn clear_diagnostic(&mut self);
    fn update_video(&mut self, base_url: &str, force: bool, now_ms: i64);
    /// Manual quarter turn clockwise.
    fn rotate(&mut self);
}
