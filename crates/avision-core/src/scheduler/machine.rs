use tracing::{debug, info, warn};

use crate::base_url::normalize_base_url;
use crate::fetcher::FetchError;
use crate::reconcile::ConnectionStatus;
use crate::scheduler::policy::PollPolicy;
use crate::scheduler::types::{PollEffect, PollEvent, PollState, SchedulerMode, Visibility};
use crate::snapshot::Snapshot;

/// Pure poll state machine.
///
/// Owns [`PollState`] exclusively. Every input arrives as a [`PollEvent`]
/// with the current monotonic time, and every side effect leaves as a
/// [`PollEffect`] for the host to carry out. No I/O happens here.
#[derive(Debug, Clone)]
pub struct PollScheduler {
    policy: PollPolicy,
    default_base_url: String,
    base_url: String,
    running: bool,
    visibility: Visibility,
    state: PollState,
}

impl PollScheduler {
    pub fn new(
        policy: PollPolicy,
        base_url: impl Into<String>,
        default_base_url: impl Into<String>,
    ) -> Self {
        let default_base_url = default_base_url.into();
        let base_url = normalize_base_url(&base_url.into(), &default_base_url);
        let state = PollState::new(policy.base_interval_ms);

        Self {
            policy,
            default_base_url,
            base_url,
            running: false,
            visibility: Visibility::Visible,
            state,
        }
    }

    pub fn handle(&mut self, event: PollEvent, now_ms: u64) -> Vec<PollEffect> {
        let mut effects = Vec::new();

        match event {
            PollEvent::Start => self.start(&mut effects),
            PollEvent::Stop => self.stop(&mut effects),
            PollEvent::Tick => self.tick(&mut effects),
            PollEvent::DelayedPollDue => self.delayed_poll_due(&mut effects),
            PollEvent::VisibilityChanged(visibility) => {
                self.set_visibility(visibility, &mut effects)
            }
            PollEvent::SetBaseUrl(input) => self.set_base_url(&input, &mut effects),
            PollEvent::RefreshVideo => effects.push(PollEffect::VideoSource {
                base_url: self.base_url.clone(),
                force: true,
            }),
            PollEvent::FetchSucceeded(snapshot) => {
                self.on_success(snapshot, now_ms, &mut effects)
            }
            PollEvent::FetchFailed(error) => self.on_failure(&error, now_ms, &mut effects),
            PollEvent::DiagnosticExpired => effects.push(PollEffect::ClearDiagnostic),
        }

        effects
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn mode(&self) -> SchedulerMode {
        if !self.running {
            return SchedulerMode::Stopped;
        }
        SchedulerMode::Running {
            backoff: self.state.backoff_ms > 0.0,
            background: self.visibility.is_hidden(),
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    fn start(&mut self, effects: &mut Vec<PollEffect>) {
        if self.running {
            return;
        }
        self.running = true;
        info!(
            event = "core.poll.started",
            base_url = %self.base_url,
            interval_ms = self.state.interval_ms
        );

        self.attempt_poll(effects);
        self.state.timer_armed = true;
        effects.push(PollEffect::ArmTimer {
            interval_ms: self.state.interval_ms,
        });
    }

    fn stop(&mut self, effects: &mut Vec<PollEffect>) {
        if !self.running {
            return;
        }
        self.running = false;
        self.state.timer_armed = false;
        info!(event = "core.poll.stopped", inflight = self.state.inflight);
        effects.push(PollEffect::CancelTimer);
    }

    fn tick(&mut self, effects: &mut Vec<PollEffect>) {
        // A tick racing a cancel is discarded
        if !self.running || self.visibility.is_hidden() {
            return;
        }

        if self.state.backoff_ms > 0.0 {
            let delay_ms = self.state.backoff_ms as u64;
            debug!(event = "core.poll.delayed", delay_ms = delay_ms);
            effects.push(PollEffect::SchedulePoll { delay_ms });
        } else {
            self.attempt_poll(effects);
        }
    }

    fn delayed_poll_due(&mut self, effects: &mut Vec<PollEffect>) {
        // Backoff retries scheduled before a stop or hide are discarded
        if !self.running || self.visibility.is_hidden() {
            debug!(event = "core.poll.delayed_discarded", running = self.running);
            return;
        }
        self.attempt_poll(effects);
    }

    fn attempt_poll(&mut self, effects: &mut Vec<PollEffect>) {
        if self.state.inflight {
            debug!(event = "core.poll.dropped_inflight");
            return;
        }
        self.state.inflight = true;
        effects.push(PollEffect::IssueFetch {
            base_url: self.base_url.clone(),
        });
    }

    fn set_visibility(&mut self, visibility: Visibility, effects: &mut Vec<PollEffect>) {
        self.visibility = visibility;
        self.state.interval_ms = self.policy.interval_for(visibility.is_hidden());
        debug!(
            event = "core.poll.visibility_changed",
            hidden = visibility.is_hidden(),
            interval_ms = self.state.interval_ms
        );

        if self.running {
            effects.push(PollEffect::ArmTimer {
                interval_ms: self.state.interval_ms,
            });
        }
    }

    fn set_base_url(&mut self, input: &str, effects: &mut Vec<PollEffect>) {
        self.base_url = normalize_base_url(input, &self.default_base_url);
        self.state.last_success_ms = None;
        info!(event = "core.poll.base_url_changed", base_url = %self.base_url);

        effects.push(PollEffect::VideoSource {
            base_url: self.base_url.clone(),
            force: true,
        });
        self.attempt_poll(effects);
    }

    fn on_success(&mut self, snapshot: Snapshot, now_ms: u64, effects: &mut Vec<PollEffect>) {
        self.state.inflight = false;
        self.state.last_success_ms = Some(now_ms);
        self.state.backoff_ms = 0.0;

        effects.push(PollEffect::Reconcile(snapshot));
        effects.push(PollEffect::Connection(ConnectionStatus::Healthy));
    }

    fn on_failure(&mut self, error: &FetchError, now_ms: u64, effects: &mut Vec<PollEffect>) {
        self.state.inflight = false;
        let elapsed = self.state.elapsed_since_success(now_ms);

        if elapsed > self.policy.stale_threshold_ms {
            effects.push(PollEffect::ShowDiagnostic {
                message: error.diagnostic(),
                ttl_ms: self.policy.diagnostic_ttl_ms,
            });
        }

        if elapsed > self.policy.offline_threshold_ms {
            effects.push(PollEffect::Connection(ConnectionStatus::Offline));
            effects.push(PollEffect::RenderStale);
        }

        self.state.backoff_ms = self.policy.next_backoff(self.state.backoff_ms);

        warn!(
            event = "core.poll.fetch_failed",
            error = %error,
            base_url = %error.base_url,
            backoff_ms = self.state.backoff_ms
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_BASE: &str = "http://127.0.0.1:5000";

    fn scheduler() -> PollScheduler {
        PollScheduler::new(PollPolicy::default(), DEFAULT_BASE, DEFAULT_BASE)
    }

    fn running() -> PollScheduler {
        let mut scheduler = scheduler();
        scheduler.handle(PollEvent::Start, 0);
        scheduler
    }

    fn failure() -> PollEvent {
        PollEvent::FetchFailed(FetchError::network("connection refused", DEFAULT_BASE))
    }

    fn fetches(effects: &[PollEffect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, PollEffect::IssueFetch { .. }))
            .count()
    }

    #[test]
    fn test_initial_state_is_stopped() {
        let scheduler = scheduler();
        assert_eq!(scheduler.mode(), SchedulerMode::Stopped);
        assert!(!scheduler.state().inflight);
        assert_eq!(scheduler.state().last_success_ms, None);
        assert_eq!(scheduler.state().interval_ms, 250);
    }

    #[test]
    fn test_start_polls_then_arms_timer() {
        let mut scheduler = scheduler();
        let effects = scheduler.handle(PollEvent::Start, 0);
        assert_eq!(
            effects,
            vec![
                PollEffect::IssueFetch {
                    base_url: DEFAULT_BASE.to_string()
                },
                PollEffect::ArmTimer { interval_ms: 250 },
            ]
        );
        assert!(scheduler.state().inflight);
        assert!(scheduler.state().timer_armed);
        assert_eq!(
            scheduler.mode(),
            SchedulerMode::Running {
                backoff: false,
                background: false
            }
        );
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut scheduler = running();
        assert!(scheduler.handle(PollEvent::Start, 10).is_empty());
    }

    #[test]
    fn test_tick_while_inflight_is_dropped() {
        let mut scheduler = running();
        assert!(scheduler.handle(PollEvent::Tick, 250).is_empty());
        assert!(scheduler.handle(PollEvent::Tick, 500).is_empty());

        scheduler.handle(PollEvent::FetchSucceeded(Snapshot::default()), 600);
        let effects = scheduler.handle(PollEvent::Tick, 750);
        assert_eq!(fetches(&effects), 1);
    }

    #[test]
    fn test_success_resets_backoff_and_records_time() {
        let mut scheduler = running();
        scheduler.handle(failure(), 100);
        assert!(scheduler.state().backoff_ms > 0.0);

        scheduler.handle(PollEvent::DelayedPollDue, 800);
        let effects = scheduler.handle(PollEvent::FetchSucceeded(Snapshot::default()), 900);

        assert_eq!(scheduler.state().backoff_ms, 0.0);
        assert_eq!(scheduler.state().last_success_ms, Some(900));
        assert!(!scheduler.state().inflight);
        assert_eq!(
            effects,
            vec![
                PollEffect::Reconcile(Snapshot::default()),
                PollEffect::Connection(ConnectionStatus::Healthy),
            ]
        );
    }

    #[test]
    fn test_first_failure_is_offline_and_diagnosed() {
        let mut scheduler = running();
        let effects = scheduler.handle(failure(), 50);

        assert!(effects.iter().any(|e| matches!(
            e,
            PollEffect::ShowDiagnostic { message, ttl_ms: 8000 }
                if message == "connection refused @ http://127.0.0.1:5000"
        )));
        assert!(effects.contains(&PollEffect::Connection(ConnectionStatus::Offline)));
        assert!(effects.contains(&PollEffect::RenderStale));
        assert_eq!(scheduler.state().backoff_ms, 600.0);
        assert!(!scheduler.state().inflight);
    }

    #[test]
    fn test_failure_thresholds_after_success() {
        let mut scheduler = running();
        scheduler.handle(PollEvent::FetchSucceeded(Snapshot::default()), 1000);

        // 1000ms since success: neither offline nor diagnosed
        scheduler.handle(PollEvent::Tick, 1250);
        let effects = scheduler.handle(failure(), 2000);
        assert!(effects.is_empty());

        // 1600ms: offline, but no diagnostic yet
        scheduler.handle(PollEvent::DelayedPollDue, 2100);
        let effects = scheduler.handle(failure(), 2600);
        assert_eq!(
            effects,
            vec![
                PollEffect::Connection(ConnectionStatus::Offline),
                PollEffect::RenderStale
            ]
        );

        // 2500ms: both
        scheduler.handle(PollEvent::DelayedPollDue, 3000);
        let effects = scheduler.handle(failure(), 3500);
        assert_eq!(effects.len(), 3);
        assert!(matches!(effects[0], PollEffect::ShowDiagnostic { .. }));
    }

    #[test]
    fn test_tick_in_backoff_schedules_delayed_poll() {
        let mut scheduler = running();
        scheduler.handle(failure(), 10);
        assert_eq!(
            scheduler.mode(),
            SchedulerMode::Running {
                backoff: true,
                background: false
            }
        );

        let effects = scheduler.handle(PollEvent::Tick, 250);
        assert_eq!(effects, vec![PollEffect::SchedulePoll { delay_ms: 600 }]);
        // The delay does not consume the backoff
        assert_eq!(scheduler.state().backoff_ms, 600.0);
        assert!(!scheduler.state().inflight);

        let effects = scheduler.handle(PollEvent::DelayedPollDue, 850);
        assert_eq!(fetches(&effects), 1);
    }

    #[test]
    fn test_delayed_poll_after_hide_is_discarded() {
        let mut scheduler = running();
        scheduler.handle(failure(), 10);
        let effects = scheduler.handle(PollEvent::Tick, 250);
        assert_eq!(effects, vec![PollEffect::SchedulePoll { delay_ms: 600 }]);

        scheduler.handle(PollEvent::VisibilityChanged(Visibility::Hidden), 300);
        assert!(scheduler.handle(PollEvent::DelayedPollDue, 850).is_empty());
        assert!(!scheduler.state().inflight);

        // Back in the foreground, retries fetch again
        scheduler.handle(PollEvent::VisibilityChanged(Visibility::Visible), 900);
        assert_eq!(fetches(&scheduler.handle(PollEvent::DelayedPollDue, 950)), 1);
    }

    #[test]
    fn test_delayed_poll_after_stop_is_discarded() {
        let mut scheduler = running();
        scheduler.handle(failure(), 10);
        scheduler.handle(PollEvent::Tick, 250);
        scheduler.handle(PollEvent::Stop, 300);

        assert!(scheduler.handle(PollEvent::DelayedPollDue, 850).is_empty());
        assert!(!scheduler.state().inflight);
    }

    #[test]
    fn test_hidden_ticks_are_skipped() {
        let mut scheduler = running();
        scheduler.handle(PollEvent::FetchSucceeded(Snapshot::default()), 10);

        let effects = scheduler.handle(PollEvent::VisibilityChanged(Visibility::Hidden), 20);
        assert_eq!(effects, vec![PollEffect::ArmTimer { interval_ms: 1200 }]);
        assert_eq!(
            scheduler.mode(),
            SchedulerMode::Running {
                backoff: false,
                background: true
            }
        );

        for now in [1220, 2420, 3620] {
            assert!(scheduler.handle(PollEvent::Tick, now).is_empty());
        }

        let effects = scheduler.handle(PollEvent::VisibilityChanged(Visibility::Visible), 4000);
        assert_eq!(effects, vec![PollEffect::ArmTimer { interval_ms: 250 }]);
        assert_eq!(fetches(&scheduler.handle(PollEvent::Tick, 4250)), 1);
    }

    #[test]
    fn test_visibility_while_stopped_only_updates_interval() {
        let mut scheduler = scheduler();
        let effects = scheduler.handle(PollEvent::VisibilityChanged(Visibility::Hidden), 0);
        assert!(effects.is_empty());
        assert_eq!(scheduler.state().interval_ms, 1200);

        let effects = scheduler.handle(PollEvent::Start, 10);
        assert!(effects.contains(&PollEffect::ArmTimer { interval_ms: 1200 }));
    }

    #[test]
    fn test_stop_cancels_timer_but_keeps_inflight() {
        let mut scheduler = running();
        let effects = scheduler.handle(PollEvent::Stop, 100);
        assert_eq!(effects, vec![PollEffect::CancelTimer]);
        assert!(scheduler.state().inflight);
        assert_eq!(scheduler.mode(), SchedulerMode::Stopped);

        // The outstanding fetch still lands
        let effects = scheduler.handle(PollEvent::FetchSucceeded(Snapshot::default()), 200);
        assert!(effects.contains(&PollEffect::Reconcile(Snapshot::default())));

        // Late ticks do nothing
        assert!(scheduler.handle(PollEvent::Tick, 250).is_empty());
        assert!(scheduler.handle(PollEvent::Stop, 300).is_empty());
    }

    #[test]
    fn test_set_base_url_normalizes_and_polls_despite_backoff() {
        let mut scheduler = running();
        scheduler.handle(PollEvent::FetchSucceeded(Snapshot::default()), 100);
        scheduler.handle(PollEvent::Tick, 250);
        scheduler.handle(failure(), 300);
        assert!(scheduler.state().backoff_ms > 0.0);

        let effects = scheduler.handle(PollEvent::SetBaseUrl("http://host:9000/".to_string()), 400);

        assert_eq!(scheduler.base_url(), "http://host:9000");
        assert_eq!(scheduler.state().last_success_ms, None);
        assert_eq!(
            effects,
            vec![
                PollEffect::VideoSource {
                    base_url: "http://host:9000".to_string(),
                    force: true
                },
                PollEffect::IssueFetch {
                    base_url: "http://host:9000".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_set_base_url_blank_falls_back_to_default() {
        let mut scheduler = PollScheduler::new(
            PollPolicy::default(),
            "http://elsewhere:8080",
            DEFAULT_BASE,
        );
        scheduler.handle(PollEvent::SetBaseUrl("   ".to_string()), 0);
        assert_eq!(scheduler.base_url(), DEFAULT_BASE);
    }

    #[test]
    fn test_set_base_url_respects_inflight_guard() {
        let mut scheduler = running();
        let effects = scheduler.handle(PollEvent::SetBaseUrl("http://other".to_string()), 10);
        assert_eq!(fetches(&effects), 0);
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_refresh_video_is_forced() {
        let mut scheduler = scheduler();
        assert_eq!(
            scheduler.handle(PollEvent::RefreshVideo, 0),
            vec![PollEffect::VideoSource {
                base_url: DEFAULT_BASE.to_string(),
                force: true
            }]
        );
    }

    #[test]
    fn test_diagnostic_expiry_clears() {
        let mut scheduler = scheduler();
        assert_eq!(
            scheduler.handle(PollEvent::DiagnosticExpired, 8000),
            vec![PollEffect::ClearDiagnostic]
        );
    }

    #[test]
    fn test_backoff_caps_at_ceiling() {
        let mut scheduler = running();
        scheduler.handle(failure(), 0);
        for i in 1..12 {
            scheduler.handle(PollEvent::DelayedPollDue, i * 100);
            scheduler.handle(failure(), i * 100 + 50);
        }
        assert_eq!(scheduler.state().backoff_ms, 4000.0);
    }
}
