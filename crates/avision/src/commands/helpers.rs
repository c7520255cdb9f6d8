use clap::ArgMatches;
use tokio::runtime::Runtime;
use tracing::warn;

use avision_core::base_url::normalize_base_url;
use avision_core::config::AvisionConfig;

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
pub fn load_config_with_warning() -> AvisionConfig {
    match AvisionConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.avision/config.toml and ./.avision/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            AvisionConfig::default()
        }
    }
}

/// Base URL for a command: `--base-url` if given, else the configured one,
/// else the default derived from the origin. Always normalized.
pub fn resolve_base_url(
    matches: &ArgMatches,
    config: &AvisionConfig,
) -> Result<String, Box<dyn std::error::Error>> {
    let default = config.default_base_url()?;
    let input = matches
        .get_one::<String>("base-url")
        .map(String::as_str)
        .or(config.server.base_url.as_deref())
        .unwrap_or("");
    Ok(normalize_base_url(input, &default))
}

/// Single-threaded runtime; polling is cooperative on one event loop.
pub fn build_runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
