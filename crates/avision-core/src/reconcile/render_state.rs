//! Last-rendered HUD values and the diffing rules against new snapshots.
//!
//! Every function here compares the incoming value against what was last
//! rendered and emits a mutation only when they differ, so feeding the
//! same snapshot twice yields nothing the second time.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};

use crate::base_url::video_url;
use crate::reconcile::types::{
    AlertBanner, ConnectionStatus, Light, TextSlot, UiMutation, VoiceLogLine,
};
use crate::snapshot::{FrameShape, SendOutcome, Snapshot, VoiceStatus};

const PLACEHOLDER: &str = "--";
const DEFAULT_TARGET_LABEL: &str = "object";

/// Explicit render cache owned by the reconciler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderState {
    texts: BTreeMap<TextSlot, String>,
    lights: BTreeMap<Light, bool>,
    banner: Option<AlertBanner>,
    /// Quarter turns clockwise, 0..=3.
    rotate_step: u8,
    auto_rotated: bool,
    last_shape: Option<FrameShape>,
    aspect: Option<(u32, u32)>,
    voice_status: Option<VoiceStatus>,
    last_voice_ts: f64,
    last_video_base_url: Option<String>,
    connection: Option<ConnectionStatus>,
    diagnostic: Option<String>,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, slot: TextSlot) -> Option<&str> {
        self.texts.get(&slot).map(String::as_str)
    }

    pub fn light(&self, light: Light) -> bool {
        self.lights.get(&light).copied().unwrap_or(false)
    }

    pub fn banner(&self) -> Option<&AlertBanner> {
        self.banner.as_ref()
    }

    pub fn rotation_degrees(&self) -> u16 {
        u16::from(self.rotate_step) * 90
    }

    pub fn auto_rotated(&self) -> bool {
        self.auto_rotated
    }

    pub fn aspect(&self) -> Option<(u32, u32)> {
        self.aspect
    }

    pub fn last_voice_ts(&self) -> f64 {
        self.last_voice_ts
    }

    pub fn connection(&self) -> Option<ConnectionStatus> {
        self.connection
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// Diff a new snapshot against the cache.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Vec<UiMutation> {
        let mut out = Vec::new();

        self.set_text(TextSlot::Fps, format_number(snapshot.fps_infer, 1), &mut out);
        self.set_text(
            TextSlot::Delay,
            format!("{} ms", format_number(snapshot.delay_ms, 0)),
            &mut out,
        );
        self.set_text(
            TextSlot::Inference,
            format!("{} ms", format_number(snapshot.infer_ms, 0)),
            &mut out,
        );
        self.set_text(TextSlot::Count, snapshot.count.to_string(), &mut out);
        self.set_text(
            TextSlot::Notify,
            if snapshot.should_notify { "yes" } else { "no" }.to_string(),
            &mut out,
        );

        let (audio_state, last_send) = match snapshot.last_send() {
            SendOutcome::Ok => ("Ok", snapshot.last_send_ts()),
            SendOutcome::Failed => ("Failed", snapshot.last_send_ts()),
            SendOutcome::Standby => ("Standby", None),
        };
        self.set_text(TextSlot::AudioState, audio_state.to_string(), &mut out);
        self.set_text(
            TextSlot::LastSend,
            last_send
                .and_then(format_local_time)
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            &mut out,
        );

        let shape = snapshot.frame_shape();
        self.set_text(
            TextSlot::Shape,
            shape
                .map(|s| format!("{}x{}", s.w, s.h))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            &mut out,
        );
        self.last_shape = shape;
        self.update_aspect(&mut out);

        self.set_light(Light::Inference, snapshot.infer_ms > 0.0, &mut out);
        self.set_light(Light::Audio, snapshot.should_notify, &mut out);

        self.set_text(TextSlot::StreamState, "Live".to_string(), &mut out);
        self.set_text(
            TextSlot::InferState,
            if snapshot.infer_ms > 0.0 {
                "Inferring"
            } else {
                "Waiting"
            }
            .to_string(),
            &mut out,
        );

        let target_meta = match &snapshot.alert_target {
            Some(target) => format!(
                "Tracking: {} (level {})",
                target.label.to_uppercase(),
                target.level
            ),
            None => "Scanning area...".to_string(),
        };
        self.set_text(TextSlot::TargetMeta, target_meta, &mut out);

        let label = snapshot
            .alert_target
            .as_ref()
            .map(|t| t.label.as_str())
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_TARGET_LABEL);
        let banner = AlertBanner::new(snapshot.alert_level, label, snapshot.count);
        if self.banner.as_ref() != Some(&banner) {
            self.banner = Some(banner.clone());
            out.push(UiMutation::Banner(banner));
        }

        if let Some(stamp) = (snapshot.ts > 0.0)
            .then_some(snapshot.ts)
            .and_then(format_local_time)
        {
            self.set_text(TextSlot::LastUpdate, format!("Last update: {}", stamp), &mut out);
        }

        self.apply_voice(snapshot, &mut out);

        out
    }

    /// Placeholders shown while the service is unreachable.
    pub fn apply_stale(&mut self) -> Vec<UiMutation> {
        let mut out = Vec::new();
        self.set_text(TextSlot::StreamState, "Offline".to_string(), &mut out);
        self.set_text(TextSlot::InferState, "Waiting".to_string(), &mut out);
        self.set_text(TextSlot::AudioState, "Standby".to_string(), &mut out);
        out
    }

    pub fn apply_connection(&mut self, status: ConnectionStatus) -> Vec<UiMutation> {
        let mut out = Vec::new();
        if self.connection != Some(status) {
            self.connection = Some(status);
            out.push(UiMutation::Connection { status });
        }
        if status == ConnectionStatus::Offline {
            self.set_light(Light::Inference, false, &mut out);
        }
        out
    }

    pub fn show_diagnostic(&mut self, message: &str) -> Vec<UiMutation> {
        self.diagnostic = Some(message.to_string());
        vec![UiMutation::Diagnostic {
            message: Some(message.to_string()),
        }]
    }

    pub fn clear_diagnostic(&mut self) -> Vec<UiMutation> {
        match self.diagnostic.take() {
            Some(_) => vec![UiMutation::Diagnostic { message: None }],
            None => Vec::new(),
        }
    }

    /// Point the video element at `{base_url}/video`.
    ///
    /// Skipped when the base URL is unchanged, unless `force` is set. The
    /// `ts` query parameter defeats caching of the stream.
    pub fn apply_video(&mut self, base_url: &str, force: bool, now_ms: i64) -> Vec<UiMutation> {
        if !force && self.last_video_base_url.as_deref() == Some(base_url) {
            return Vec::new();
        }
        self.last_video_base_url = Some(base_url.to_string());
        vec![UiMutation::VideoSource {
            url: video_url(base_url, now_ms),
        }]
    }

    /// Manual rotation by a quarter turn. Auto-rotation never fires after this
    /// if it already fired once; manual turns do not reset it.
    pub fn rotate(&mut self) -> Vec<UiMutation> {
        let mut out = Vec::new();
        self.rotate_step = (self.rotate_step + 1) % 4;
        out.push(UiMutation::Rotation {
            degrees: self.rotation_degrees(),
        });
        self.update_aspect(&mut out);
        out
    }

    fn update_aspect(&mut self, out: &mut Vec<UiMutation>) {
        let Some(shape) = self.last_shape else {
            return;
        };

        if shape.h > shape.w && !self.auto_rotated {
            self.rotate_step = 1;
            self.auto_rotated = true;
            out.push(UiMutation::Rotation {
                degrees: self.rotation_degrees(),
            });
        }

        let aspect = if self.rotate_step % 2 == 1 {
            (shape.h, shape.w)
        } else {
            (shape.w, shape.h)
        };

        if self.aspect != Some(aspect) {
            self.aspect = Some(aspect);
            out.push(UiMutation::AspectRatio {
                width: aspect.0,
                height: aspect.1,
            });
        }
    }

    fn apply_voice(&mut self, snapshot: &Snapshot, out: &mut Vec<UiMutation>) {
        let status = snapshot.voice_status;
        if self.voice_status != Some(status) {
            self.voice_status = Some(status);
            out.push(UiMutation::VoiceBadge {
                status,
                label: voice_label(status).to_string(),
            });
        }

        let Some(latest_ts) = snapshot.latest_voice_ts() else {
            return;
        };

        if latest_ts > self.last_voice_ts {
            self.last_voice_ts = latest_ts;
            let entries = snapshot
                .voice_log
                .iter()
                .map(|entry| VoiceLogLine {
                    role: entry.role,
                    time: format_local_time(entry.ts).unwrap_or_else(|| PLACEHOLDER.to_string()),
                    content: entry.content.clone(),
                })
                .collect();
            out.push(UiMutation::VoiceLog { entries });
        }
    }

    fn set_text(&mut self, slot: TextSlot, text: String, out: &mut Vec<UiMutation>) {
        if self.texts.get(&slot) == Some(&text) {
            return;
        }
        self.texts.insert(slot, text.clone());
        out.push(UiMutation::Text { slot, text });
    }

    fn set_light(&mut self, light: Light, active: bool, out: &mut Vec<UiMutation>) {
        if self.lights.get(&light) == Some(&active) {
            return;
        }
        self.lights.insert(light, active);
        out.push(UiMutation::Indicator { light, active });
    }
}

/// Diff `snapshot` against `state`, updating the cache and returning only the
/// mutations whose values changed.
pub fn diff_snapshot(state: &mut RenderState, snapshot: &Snapshot) -> Vec<UiMutation> {
    state.apply_snapshot(snapshot)
}

fn voice_label(status: VoiceStatus) -> &'static str {
    match status {
        VoiceStatus::Listening => "Listening",
        VoiceStatus::Processing => "Thinking...",
        VoiceStatus::Speaking => "Speaking",
        VoiceStatus::Idle => "Idle",
    }
}

/// `--` for anything that is not a finite number.
pub fn format_number(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    format!("{:.*}", digits, value)
}

/// Local `HH:MM:SS` for an epoch-seconds timestamp.
fn format_local_time(epoch_secs: f64) -> Option<String> {
    if !epoch_secs.is_finite() || epoch_secs < 0.0 {
        return None;
    }
    let millis = (epoch_secs * 1000.0) as i64;
    DateTime::from_timestamp_millis(millis)
        .map(|utc| utc.with_timezone(&Local).format("%H:%M:%S").to_string())
}
