use clap::ArgMatches;
use tracing::info;

use avision_core::base_url::video_url;

use super::helpers::{load_config_with_warning, resolve_base_url};

pub(crate) fn handle_video_url_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_warning();
    let base_url = resolve_base_url(matches, &config)?;

    let url = video_url(&base_url, chrono::Utc::now().timestamp_millis());
    info!(event = "cli.video_url_completed", url = %url);

    println!("{}", url);
    Ok(())
}
