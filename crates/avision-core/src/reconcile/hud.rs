use tracing::debug;

use crate::reconcile::Reconciler;
use crate::reconcile::render_state::RenderState;
use crate::reconcile::types::{ConnectionStatus, UiMutation};
use crate::snapshot::Snapshot;

/// Presentation collaborator that receives batches of mutations.
///
/// A batch is never empty; the reconciler skips calls that would change
/// nothing.
pub trait HudSink {
    fn apply(&mut self, mutations: &[UiMutation]);
}

/// Collects every mutation in order.
impl HudSink for Vec<UiMutation> {
    fn apply(&mut self, mutations: &[UiMutation]) {
        self.extend_from_slice(mutations);
    }
}

/// [`Reconciler`] that diffs against a [`RenderState`] and forwards the
/// resulting mutations to a [`HudSink`].
#[derive(Debug, Default)]
pub struct HudReconciler<S> {
    state: RenderState,
    sink: S,
}

impl<S: HudSink> HudReconciler<S> {
    pub fn new(sink: S) -> Self {
        Self {
            state: RenderState::new(),
            sink,
        }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn emit(&mut self, mutations: Vec<UiMutation>) {
        if mutations.is_empty() {
            return;
        }
        debug!(event = "core.reconcile.mutations_applied", count = mutations.len());
        self.sink.apply(&mutations);
    }
}

impl<S: HudSink> Reconciler for HudReconciler<S> {
    fn reconcile(&mut self, snapshot: &Snapshot) {
        let mutations = self.state.apply_snapshot(snapshot);
        self.emit(mutations);
    }

    fn render_stale(&mut self) {
        let mutations = self.state.apply_stale();
        self.emit(mutations);
    }

    fn set_connection(&mut self, status: ConnectionStatus) {
        let mutations = self.state.apply_connection(status);
        self.emit(mutations);
    }

    fn show_diagnostic(&mut self, message: &str) {
        let mutations = self.state.show_diagnostic(message);
        self.emit(mutations);
    }

    fn clear_diagnostic(&mut self) {
        let mutations = self.state.clear_diagnostic();
        self.emit(mutations);
    }

    fn update_video(&mut self, base_url: &str, force: bool, now_ms: i64) {
        let mutations = self.state.apply_video(base_url, force, now_ms);
        self.emit(mutations);
    }

    fn rotate(&mut self) {
        let mutations = self.state.rotate();
        self.emit(mutations);
    }
}
