use serde::{Deserialize, Serialize};

use crate::fetcher::FetchError;
use crate::reconcile::ConnectionStatus;
use crate::snapshot::Snapshot;

/// Host page visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    pub fn is_hidden(self) -> bool {
        self == Visibility::Hidden
    }
}

/// Coarse scheduler state. Backoff and background are independent
/// modifiers on a running scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerMode {
    Stopped,
    Running { backoff: bool, background: bool },
}

/// Mutable poll bookkeeping owned by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct PollState {
    /// Set immediately before a fetch is issued, cleared on every completion.
    pub inflight: bool,
    /// Monotonic milliseconds of the last successful poll. `None` means no
    /// success yet, so elapsed time is unbounded.
    pub last_success_ms: Option<u64>,
    pub backoff_ms: f64,
    pub interval_ms: u64,
    pub timer_armed: bool,
}

impl PollState {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            inflight: false,
            last_success_ms: None,
            backoff_ms: 0.0,
            interval_ms,
            timer_armed: false,
        }
    }

    pub fn elapsed_since_success(&self, now_ms: u64) -> u64 {
        match self.last_success_ms {
            Some(last) => now_ms.saturating_sub(last),
            None => u64::MAX,
        }
    }
}

/// Inputs to [`PollScheduler::handle`](crate::scheduler::PollScheduler::handle).
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Start,
    Stop,
    /// The repeating timer fired.
    Tick,
    /// A one-shot backoff delay elapsed.
    DelayedPollDue,
    VisibilityChanged(Visibility),
    /// Raw user input; normalized by the scheduler.
    SetBaseUrl(String),
    RefreshVideo,
    FetchSucceeded(Snapshot),
    FetchFailed(FetchError),
    DiagnosticExpired,
}

/// Work the host must perform after a transition, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEffect {
    /// Replace any repeating timer with one at `interval_ms`. The first tick
    /// fires one full interval from now.
    ArmTimer { interval_ms: u64 },
    CancelTimer,
    /// Deliver [`PollEvent::DelayedPollDue`] after `delay_ms`.
    SchedulePoll { delay_ms: u64 },
    IssueFetch { base_url: String },
    Reconcile(Snapshot),
    RenderStale,
    Connection(ConnectionStatus),
    /// Show `message`, then deliver [`PollEvent::DiagnosticExpired`] after
    /// `ttl_ms`.
    ShowDiagnostic { message: String, ttl_ms: u64 },
    ClearDiagnostic,
    VideoSource { base_url: String, force: bool },
}
