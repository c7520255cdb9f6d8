use clap::ArgMatches;
use tracing::error;

use avision_core::events;

pub mod helpers;

mod completions;
mod detect;
mod health;
mod video_url;
mod watch;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    match matches.subcommand() {
        Some(("watch", sub_matches)) => watch::handle_watch_command(sub_matches),
        Some(("detect", sub_matches)) => detect::handle_detect_command(sub_matches),
        Some(("health", sub_matches)) => health::handle_health_command(sub_matches),
        Some(("video-url", sub_matches)) => video_url::handle_video_url_command(sub_matches),
        Some(("completions", sub_matches)) => {
            completions::handle_completions_command(sub_matches)
        }
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}
