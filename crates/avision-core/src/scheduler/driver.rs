use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep};
use tracing::debug;

use crate::events::{self, SessionStats};
use crate::fetcher::{FetchError, SnapshotSource};
use crate::reconcile::Reconciler;
use crate::scheduler::machine::PollScheduler;
use crate::scheduler::types::{PollEffect, PollEvent, Visibility};
use crate::snapshot::Snapshot;

type FetchFuture = BoxFuture<'static, Result<Snapshot, FetchError>>;

/// Requests from the host environment.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Stop,
    /// Start when stopped, stop when running.
    Toggle,
    SetBaseUrl(String),
    SetVisibility(Visibility),
    RefreshVideo,
    Rotate,
    Shutdown,
}

/// Runs a [`PollScheduler`] on the current task.
///
/// Owns the repeating timer, one-shot delays and the single outstanding
/// fetch, feeds their completions back into the machine, and carries out
/// the machine's effects against the [`Reconciler`].
pub struct PollDriver<S, R> {
    machine: PollScheduler,
    source: Arc<S>,
    reconciler: R,
    epoch: Instant,
    stats: SessionStats,
}

impl<S, R> PollDriver<S, R>
where
    S: SnapshotSource + 'static,
    R: Reconciler,
{
    pub fn new(machine: PollScheduler, source: Arc<S>, reconciler: R) -> Self {
        Self {
            machine,
            source,
            reconciler,
            epoch: Instant::now(),
            stats: SessionStats::default(),
        }
    }

    /// Process commands until [`Command::Shutdown`] arrives or every sender
    /// is dropped. Returns the reconciler for inspection.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> R {
        let (timer_tx, mut timer_rx) = mpsc::unbounded_channel::<PollEvent>();
        let mut ticker: Option<Interval> = None;
        let mut inflight: Option<FetchFuture> = None;

        let policy = self.machine.policy();
        events::log_session_started(
            self.machine.base_url(),
            policy.base_interval_ms,
            policy.background_interval_ms,
        );
        self.reconciler.update_video(self.machine.base_url(), false, wall_clock_ms());

        loop {
            let event = tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    match self.translate(command) {
                        Translated::Event(event) => event,
                        Translated::Handled => continue,
                        Translated::Shutdown => break,
                    }
                }
                _ = next_tick(&mut ticker) => PollEvent::Tick,
                Some(event) = timer_rx.recv() => event,
                result = next_result(&mut inflight) => {
                    inflight = None;
                    if result.is_err() {
                        self.stats.failures += 1;
                    }
                    match result {
                        Ok(snapshot) => PollEvent::FetchSucceeded(snapshot),
                        Err(error) => PollEvent::FetchFailed(error),
                    }
                }
            };

            let effects = self.machine.handle(event, self.now_ms());
            for effect in effects {
                self.apply(effect, &mut ticker, &mut inflight, &timer_tx);
            }
        }

        events::log_session_ended(self.machine.base_url(), self.stats);
        self.reconciler
    }

    fn translate(&mut self, command: Command) -> Translated {
        debug!(event = "core.poll.command_received", command = ?command);

        let event = match command {
            Command::Start => PollEvent::Start,
            Command::Stop => PollEvent::Stop,
            Command::Toggle if self.machine.is_running() => PollEvent::Stop,
            Command::Toggle => PollEvent::Start,
            Command::SetBaseUrl(url) => PollEvent::SetBaseUrl(url),
            Command::SetVisibility(visibility) => PollEvent::VisibilityChanged(visibility),
            Command::RefreshVideo => PollEvent::RefreshVideo,
            Command::Rotate => {
                self.reconciler.rotate();
                return Translated::Handled;
            }
            Command::Shutdown => return Translated::Shutdown,
        };

        Translated::Event(event)
    }

    fn apply(
        &mut self,
        effect: PollEffect,
        ticker: &mut Option<Interval>,
        inflight: &mut Option<FetchFuture>,
        timer_tx: &mpsc::UnboundedSender<PollEvent>,
    ) {
        match effect {
            PollEffect::ArmTimer { interval_ms } => {
                let period = Duration::from_millis(interval_ms);
                let mut interval = interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                *ticker = Some(interval);
            }
            PollEffect::CancelTimer => *ticker = None,
            PollEffect::SchedulePoll { delay_ms } => {
                deliver_after(timer_tx, delay_ms, PollEvent::DelayedPollDue);
            }
            PollEffect::IssueFetch { base_url } => {
                debug!(event = "core.poll.fetch_issued", base_url = %base_url);
                self.stats.fetches += 1;
                let source = Arc::clone(&self.source);
                *inflight = Some(Box::pin(async move { source.poll(&base_url).await }));
            }
            PollEffect::Reconcile(snapshot) => self.reconciler.reconcile(&snapshot),
            PollEffect::RenderStale => self.reconciler.render_stale(),
            PollEffect::Connection(status) => self.reconciler.set_connection(status),
            PollEffect::ShowDiagnostic { message, ttl_ms } => {
                self.reconciler.show_diagnostic(&message);
                deliver_after(timer_tx, ttl_ms, PollEvent::DiagnosticExpired);
            }
            PollEffect::ClearDiagnostic => self.reconciler.clear_diagnostic(),
            PollEffect::VideoSource { base_url, force } => {
                self.reconciler.update_video(&base_url, force, wall_clock_ms());
            }
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

enum Translated {
    Event(PollEvent),
    Handled,
    Shutdown,
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn next_result(inflight: &mut Option<FetchFuture>) -> Result<Snapshot, FetchError> {
    match inflight {
        Some(fetch) => fetch.await,
        None => std::future::pending().await,
    }
}

fn deliver_after(tx: &mpsc::UnboundedSender<PollEvent>, delay_ms: u64, event: PollEvent) {
    let tx = tx.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(delay_ms)).await;
        // The driver may have shut down in the meantime
        let _ = tx.send(event);
    });
}

fn wall_clock_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
