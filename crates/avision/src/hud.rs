use std::io::Write;

use avision_core::HudSink;
use avision_core::reconcile::{ConnectionStatus, Light, TextSlot, UiMutation};
use avision_core::snapshot::VoiceRole;
use tracing::warn;

fn slot_label(slot: TextSlot) -> &'static str {
    match slot {
        TextSlot::Fps => "FPS",
        TextSlot::Delay => "Delay",
        TextSlot::Inference => "Inference",
        TextSlot::Count => "Objects",
        TextSlot::Shape => "Frame",
        TextSlot::Notify => "Notify",
        TextSlot::AudioState => "Audio",
        TextSlot::LastSend => "Last send",
        TextSlot::TargetMeta => "Target",
        TextSlot::StreamState => "Stream",
        TextSlot::InferState => "Detector",
        TextSlot::LastUpdate => "Updated",
    }
}

fn light_label(light: Light) -> &'static str {
    match light {
        Light::Inference => "inference",
        Light::Audio => "audio",
    }
}

/// Render a mutation as human-readable lines.
pub fn format_mutation(mutation: &UiMutation) -> Vec<String> {
    match mutation {
        UiMutation::Text { slot, text } => vec![format!("{:<10} {}", slot_label(*slot), text)],
        UiMutation::Indicator { light, active } => vec![format!(
            "{} {}",
            if *active { "●" } else { "○" },
            light_label(*light)
        )],
        UiMutation::Banner(banner) => vec![format!(
            "[{}] {} - {}",
            banner.header, banner.title, banner.description
        )],
        UiMutation::Rotation { degrees } => vec![format!("Rotation   {}°", degrees)],
        UiMutation::AspectRatio { width, height } => {
            vec![format!("Aspect     {}:{}", width, height)]
        }
        UiMutation::VoiceBadge { label, .. } => vec![format!("Voice      {}", label)],
        UiMutation::VoiceLog { entries } => {
            let mut lines = vec!["Voice log:".to_string()];
            for entry in entries {
                let role = match entry.role {
                    VoiceRole::User => "you",
                    VoiceRole::Assistant => "assistant",
                };
                lines.push(format!("  {} {:>9}: {}", entry.time, role, entry.content));
            }
            lines
        }
        UiMutation::VideoSource { url } => vec![format!("Video      {}", url)],
        UiMutation::Connection { status } => vec![match status {
            ConnectionStatus::Healthy => "Server     online".to_string(),
            ConnectionStatus::Offline => "Server     offline".to_string(),
        }],
        UiMutation::Diagnostic {
            message: Some(message),
        } => vec![format!("Error: {}", message)],
        UiMutation::Diagnostic { message: None } => Vec::new(),
    }
}

/// Prints each batch as a block of human-readable lines.
pub struct TerminalHud<W> {
    out: W,
}

impl<W: Write> TerminalHud<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_batch(&mut self, mutations: &[UiMutation]) -> std::io::Result<()> {
        for line in mutations.iter().flat_map(format_mutation) {
            writeln!(self.out, "{}", line)?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> HudSink for TerminalHud<W> {
    fn apply(&mut self, mutations: &[UiMutation]) {
        if let Err(e) = self.write_batch(mutations) {
            warn!(event = "cli.hud.write_failed", error = %e);
        }
    }
}

/// Emits one JSON object per mutation.
pub struct JsonLinesHud<W> {
    out: W,
}

impl<W: Write> JsonLinesHud<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_batch(&mut self, mutations: &[UiMutation]) -> std::io::Result<()> {
        for mutation in mutations {
            serde_json::to_writer(&mut self.out, mutation)?;
            writeln!(self.out)?;
        }
        self.out.flush()
    }
}

impl<W: Write> HudSink for JsonLinesHud<W> {
    fn apply(&mut self, mutations: &[UiMutation]) {
        if let Err(e) = self.write_batch(mutations) {
            warn!(event = "cli.hud.write_failed", error = %e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avision_core::reconcile::AlertBanner;

    #[test]
    fn test_terminal_hud_formats_batch() {
        let mut hud = TerminalHud::new(Vec::new());
        hud.apply(&[
            UiMutation::Text {
                slot: TextSlot::Fps,
                text: "30.0".to_string(),
            },
            UiMutation::Banner(AlertBanner::new(3, "car", 2)),
            UiMutation::Diagnostic { message: None },
        ]);

        let output = String::from_utf8(hud.into_inner()).unwrap();
        assert!(output.contains("FPS        30.0"));
        assert!(output.contains("[EMERGENCY] Danger detected - Stop now! car ahead (2 total)."));
        assert!(output.ends_with("\n\n"));
    }

    #[test]
    fn test_json_lines_hud_one_object_per_line() {
        let mut hud = JsonLinesHud::new(Vec::new());
        hud.apply(&[
            UiMutation::Rotation { degrees: 90 },
            UiMutation::Connection {
                status: ConnectionStatus::Offline,
            },
        ]);

        let output = String::from_utf8(hud.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["kind"], "rotation");
        assert_eq!(lines[0]["degrees"], 90);
        assert_eq!(lines[1]["status"], "offline");
    }

    #[test]
    fn test_cleared_diagnostic_prints_nothing() {
        assert!(format_mutation(&UiMutation::Diagnostic { message: None }).is_empty());
    }
}
