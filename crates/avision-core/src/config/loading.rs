//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.avision/config.toml` (global user preferences)
//! 3. **Project config** - `./.avision/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority, applied by the CLI)

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::base_url::{normalize_base_url, resolve_default_base};
use crate::config::types::{AvisionConfig, PollConfig, ServerConfig};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

const CONFIG_DIR: &str = ".avision";
const CONFIG_FILE: &str = "config.toml";

/// Load configuration from the hierarchy of config files.
///
/// Missing files are not errors. Unreadable or malformed files are, and so
/// is a merged configuration that fails validation.
pub fn load_hierarchy() -> Result<AvisionConfig, ConfigError> {
    let user_dir = dirs::home_dir().map(|home| home.join(CONFIG_DIR));
    let project_dir = std::env::current_dir()?.join(CONFIG_DIR);
    load_hierarchy_from(user_dir.as_deref(), &project_dir)
}

/// Load and merge `config.toml` from a user directory and a project directory.
pub fn load_hierarchy_from(
    user_dir: Option<&Path>,
    project_dir: &Path,
) -> Result<AvisionConfig, ConfigError> {
    let mut config = AvisionConfig::default();

    let sources = user_dir
        .into_iter()
        .chain(std::iter::once(project_dir))
        .map(|dir| dir.join(CONFIG_FILE));

    for path in sources {
        match load_config_file(&path) {
            Ok(loaded) => {
                debug!(event = "core.config.file_loaded", path = %path.display());
                config = merge_configs(config, loaded);
            }
            Err(ConfigError::ConfigNotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    validate_config(&config)?;

    Ok(config)
}

/// Load a single configuration file.
pub fn load_config_file(path: &Path) -> Result<AvisionConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Merge two configurations, with override_config taking precedence.
///
/// Each field of the override replaces the base only if present.
pub fn merge_configs(base: AvisionConfig, override_config: AvisionConfig) -> AvisionConfig {
    AvisionConfig {
        server: ServerConfig {
            base_url: override_config.server.base_url.or(base.server.base_url),
            origin: override_config.server.origin.or(base.server.origin),
            dev_port: override_config.server.dev_port.or(base.server.dev_port),
            backend_port: override_config
                .server
                .backend_port
                .or(base.server.backend_port),
        },
        poll: PollConfig {
            base_interval_ms: override_config
                .poll
                .base_interval_ms
                .or(base.poll.base_interval_ms),
            background_interval_ms: override_config
                .poll
                .background_interval_ms
                .or(base.poll.background_interval_ms),
            backoff_base_ms: override_config
                .poll
                .backoff_base_ms
                .or(base.poll.backoff_base_ms),
            backoff_multiplier: override_config
                .poll
                .backoff_multiplier
                .or(base.poll.backoff_multiplier),
            backoff_ceiling_ms: override_config
                .poll
                .backoff_ceiling_ms
                .or(base.poll.backoff_ceiling_ms),
            stale_threshold_ms: override_config
                .poll
                .stale_threshold_ms
                .or(base.poll.stale_threshold_ms),
            offline_threshold_ms: override_config
                .poll
                .offline_threshold_ms
                .or(base.poll.offline_threshold_ms),
            diagnostic_ttl_ms: override_config
                .poll
                .diagnostic_ttl_ms
                .or(base.poll.diagnostic_ttl_ms),
        },
    }
}

/// The base URL the dashboard falls back to when the user gives none.
pub fn default_base_url(config: &AvisionConfig) -> Result<String, ConfigError> {
    resolve_default_base(
        config.server.origin(),
        config.server.dev_port(),
        config.server.backend_port(),
    )
}

/// The base URL to start polling with: the configured override, normalized,
/// or the derived default.
pub fn initial_base_url(config: &AvisionConfig) -> Result<String, ConfigError> {
    let default = default_base_url(config)?;
    let input = config.server.base_url.as_deref().unwrap_or("");
    Ok(normalize_base_url(input, &default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(CONFIG_FILE), content).unwrap();
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let temp = TempDir::new().unwrap();
        let config =
            load_hierarchy_from(Some(&temp.path().join("user")), &temp.path().join("proj"))
                .unwrap();
        assert_eq!(config.poll.base_interval_ms(), 250);
        assert_eq!(config.server.base_url, None);
    }

    #[test]
    fn test_project_overrides_user() {
        let temp = TempDir::new().unwrap();
        let user = temp.path().join("user");
        let project = temp.path().join("proj");

        write_config(
            &user,
            r#"
[server]
base_url = "http://user-host:5000"

[poll]
base_interval_ms = 400
backoff_ceiling_ms = 8000
"#,
        );
        write_config(
            &project,
            r#"
[poll]
base_interval_ms = 100
"#,
        );

        let config = load_hierarchy_from(Some(&user), &project).unwrap();
        assert_eq!(config.poll.base_interval_ms(), 100); // From project
        assert_eq!(config.poll.backoff_ceiling_ms(), 8000); // From user
        assert_eq!(
            config.server.base_url,
            Some("http://user-host:5000".to_string())
        );
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("proj");
        write_config(&project, "[poll\nbase_interval_ms = ");

        let result = load_hierarchy_from(None, &project);
        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_invalid_merged_config_is_error() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("proj");
        write_config(&project, "[poll]\nbackoff_multiplier = 0.2\n");

        let result = load_hierarchy_from(None, &project);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_config_file(&temp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_initial_base_url_prefers_override() {
        let mut config = AvisionConfig::default();
        config.server.base_url = Some("http://host:9000/".to_string());
        assert_eq!(initial_base_url(&config).unwrap(), "http://host:9000");
    }

    #[test]
    fn test_initial_base_url_from_dev_origin() {
        let mut config = AvisionConfig::default();
        config.server.origin = Some("http://192.168.1.20:5500".to_string());
        assert_eq!(
            initial_base_url(&config).unwrap(),
            "http://192.168.1.20:5000"
        );
    }

    #[test]
    fn test_initial_base_url_default() {
        let config = AvisionConfig::default();
        assert_eq!(initial_base_url(&config).unwrap(), "http://127.0.0.1:5000");
    }
}
