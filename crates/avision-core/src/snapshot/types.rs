//! Wire types for the `/detect` payload.
//!
//! Field names mirror the detection service's JSON. Every field has a
//! default because older service builds omit the voice and search blocks.
//!
//! # Example Payload
//!
//! ```json
//! {
//!   "ts": 1718000000.25,
//!   "shape": {"w": 640, "h": 480},
//!   "count": 2,
//!   "infer_ms": 31.5,
//!   "fps_infer": 31.7,
//!   "delay_ms": 84.0,
//!   "alert_level": 2,
//!   "alert_target": {"label": "person", "level": 2, "area_ratio": 0.18},
//!   "should_notify": true,
//!   "last_send_ts": 1717999999.9,
//!   "last_send_ok": true,
//!   "voice_status": "idle",
//!   "voice_log": [{"role": "user", "content": "what is ahead?", "ts": 1717999990.0}]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// One parsed `/detect` response.
///
/// Immutable once parsed: the scheduler hands it to the reconciler and
/// drops it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Server-side timestamp of the frame (epoch seconds).
    pub ts: f64,
    pub fps_infer: f64,
    pub delay_ms: f64,
    pub infer_ms: f64,
    pub count: u64,
    pub shape: Option<FrameShape>,
    pub alert_level: i64,
    pub alert_text: String,
    pub alert_target: Option<AlertTarget>,
    pub should_notify: bool,
    pub last_send_ok: bool,
    /// Epoch seconds of the last audio send; `0` means never sent.
    pub last_send_ts: Option<f64>,
    pub voice_status: VoiceStatus,
    pub voice_log: Vec<VoiceLogEntry>,
    pub search_mode: bool,
    pub search_target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameShape {
    #[serde(default)]
    pub w: u32,
    #[serde(default)]
    pub h: u32,
}

/// The primary risk target chosen by the detector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertTarget {
    pub label: String,
    pub level: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_ratio: Option<f64>,
}

/// Voice assistant state. Unrecognized values read as `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum VoiceStatus {
    #[default]
    Idle,
    Listening,
    Processing,
    Speaking,
}

impl From<String> for VoiceStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "listening" => VoiceStatus::Listening,
            "processing" => VoiceStatus::Processing,
            "speaking" => VoiceStatus::Speaking,
            _ => VoiceStatus::Idle,
        }
    }
}

/// Speaker of a voice log line. Anything other than `user` is the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum VoiceRole {
    User,
    Assistant,
}

impl From<String> for VoiceRole {
    fn from(value: String) -> Self {
        if value == "user" {
            VoiceRole::User
        } else {
            VoiceRole::Assistant
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceLogEntry {
    pub role: VoiceRole,
    #[serde(default)]
    pub content: String,
    /// Epoch seconds.
    #[serde(default)]
    pub ts: f64,
}

/// Outcome of the most recent audio alert send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendOutcome {
    Ok,
    Failed,
    /// Nothing has been sent yet.
    Standby,
}
