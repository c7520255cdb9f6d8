//! Snapshot of the remote detection process, as returned by `GET /detect`.

pub mod types;

pub use types::{
    AlertTarget, FrameShape, SendOutcome, Snapshot, VoiceLogEntry, VoiceRole, VoiceStatus,
};

impl Snapshot {
    /// Parse a `/detect` response body.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Frame dimensions, or `None` when the service has not seen a frame yet
    /// (it reports `0x0` in that case).
    pub fn frame_shape(&self) -> Option<FrameShape> {
        self.shape.filter(|s| s.w > 0 && s.h > 0)
    }

    pub fn is_portrait(&self) -> bool {
        self.frame_shape().is_some_and(|s| s.h > s.w)
    }

    /// Epoch seconds of the last audio send, if one ever happened.
    pub fn last_send_ts(&self) -> Option<f64> {
        self.last_send_ts.filter(|ts| *ts > 0.0)
    }

    pub fn last_send(&self) -> SendOutcome {
        if self.last_send_ok {
            SendOutcome::Ok
        } else if self.last_send_ts().is_some() {
            SendOutcome::Failed
        } else {
            SendOutcome::Standby
        }
    }

    /// Timestamp of the newest voice log entry.
    pub fn latest_voice_ts(&self) -> Option<f64> {
        self.voice_log.last().map(|entry| entry.ts)
    }
}
