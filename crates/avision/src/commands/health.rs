use clap::ArgMatches;
use serde::Serialize;
use tracing::{error, info};

use avision_core::events;
use avision_core::HttpFetcher;

use super::helpers::{build_runtime, load_config_with_warning, resolve_base_url};

#[derive(Serialize)]
struct HealthOutput<'a> {
    base_url: &'a str,
    ok: bool,
}

pub(crate) fn handle_health_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let config = load_config_with_warning();
    let base_url = resolve_base_url(matches, &config)?;

    info!(event = "cli.health_started", base_url = %base_url);

    let runtime = build_runtime()?;
    let fetcher = HttpFetcher::new()?;
    let ok = match runtime.block_on(fetcher.health(&base_url)) {
        Ok(ok) => ok,
        Err(e) => {
            eprintln!("Health check failed: {}", e.diagnostic());
            error!(event = "cli.health_failed", base_url = %base_url, error = %e);
            events::log_coded_error(&e);
            return Err(e.into());
        }
    };

    info!(event = "cli.health_completed", base_url = %base_url, ok = ok);

    if json_output {
        let output = HealthOutput {
            base_url: &base_url,
            ok,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if ok {
        println!("{} is healthy", base_url);
    } else {
        println!("{} reports unhealthy", base_url);
    }

    if !ok {
        return Err("Service reported unhealthy".into());
    }
    Ok(())
}
