use serde::Serialize;

use crate::snapshot::{VoiceRole, VoiceStatus};

/// Connection health as shown by the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Healthy,
    Offline,
}

/// The four mutually exclusive alert banner states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    Safe,
    Notice,
    Warning,
    Danger,
}

impl AlertState {
    /// Map a detector alert level. Every level from 3 up is `Danger`;
    /// anything below 1 is `Safe`.
    pub fn from_level(level: i64) -> Self {
        match level {
            l if l >= 3 => AlertState::Danger,
            2 => AlertState::Warning,
            1 => AlertState::Notice,
            _ => AlertState::Safe,
        }
    }
}

/// Fully resolved banner content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertBanner {
    pub state: AlertState,
    pub header: String,
    pub title: String,
    pub description: String,
}

impl AlertBanner {
    pub fn new(level: i64, label: &str, count: u64) -> Self {
        let state = AlertState::from_level(level);
        let (header, title, description) = match state {
            AlertState::Danger => (
                "EMERGENCY",
                "Danger detected",
                format!("Stop now! {} ahead ({} total).", label, count),
            ),
            AlertState::Warning => (
                "WARNING",
                "Caution",
                format!("Obstacle ahead: {} ({}), slow down.", label, count),
            ),
            AlertState::Notice => (
                "NOTICE",
                "Object detected",
                format!("{} detected in view.", label),
            ),
            AlertState::Safe => (
                "SAFE",
                "No threats detected",
                "Path is clear.".to_string(),
            ),
        };

        Self {
            state,
            header: header.to_string(),
            title: title.to_string(),
            description,
        }
    }
}

/// Text widgets on the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSlot {
    Fps,
    Delay,
    Inference,
    Count,
    Shape,
    Notify,
    AudioState,
    LastSend,
    TargetMeta,
    StreamState,
    InferState,
    LastUpdate,
}

/// Indicator lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Light {
    Inference,
    Audio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceLogLine {
    pub role: VoiceRole,
    /// Local wall-clock time of the entry.
    pub time: String,
    pub content: String,
}

/// One change to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UiMutation {
    Text { slot: TextSlot, text: String },
    Indicator { light: Light, active: bool },
    Banner(AlertBanner),
    Rotation { degrees: u16 },
    AspectRatio { width: u32, height: u32 },
    VoiceBadge { status: VoiceStatus, label: String },
    /// Full re-render of the voice log panel.
    VoiceLog { entries: Vec<VoiceLogLine> },
    VideoSource { url: String },
    Connection { status: ConnectionStatus },
    /// `None` clears the banner.
    Diagnostic { message: Option<String> },
}
