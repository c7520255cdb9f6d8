use clap::ArgMatches;
use tracing::{error, info};

use avision_core::events;
use avision_core::{HttpFetcher, HudReconciler, Reconciler};

use super::helpers::{build_runtime, load_config_with_warning, resolve_base_url};
use crate::hud::TerminalHud;

pub(crate) fn handle_detect_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let config = load_config_with_warning();
    let base_url = resolve_base_url(matches, &config)?;

    info!(
        event = "cli.detect_started",
        base_url = %base_url,
        json_output = json_output
    );

    let runtime = build_runtime()?;
    let fetcher = HttpFetcher::new()?;
    let snapshot = match runtime.block_on(fetcher.fetch_snapshot(&base_url)) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Failed to fetch snapshot: {}", e.diagnostic());
            error!(event = "cli.detect_failed", base_url = %base_url, error = %e);
            events::log_coded_error(&e);
            return Err(e.into());
        }
    };

    info!(
        event = "cli.detect_completed",
        count = snapshot.count,
        alert_level = snapshot.alert_level
    );

    if json_output {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        let mut hud = HudReconciler::new(TerminalHud::new(std::io::stdout()));
        hud.reconcile(&snapshot);
    }

    Ok(())
}
