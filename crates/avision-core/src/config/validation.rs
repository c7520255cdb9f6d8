//! Configuration validation logic.

use reqwest::Url;

use crate::config::types::AvisionConfig;
use crate::errors::ConfigError;

/// Validate an AvisionConfig, returning an error if any values are invalid.
///
/// # Validation Rules
///
/// - Tick intervals and the backoff base must be positive
/// - The backoff multiplier must be finite and at least 1.0
/// - The backoff ceiling must not be below the backoff base
/// - `server.origin` and `server.base_url`, if set, must be absolute URLs
pub fn validate_config(config: &AvisionConfig) -> Result<(), ConfigError> {
    let poll = &config.poll;

    for (name, value) in [
        ("poll.base_interval_ms", poll.base_interval_ms()),
        ("poll.background_interval_ms", poll.background_interval_ms()),
        ("poll.backoff_base_ms", poll.backoff_base_ms()),
    ] {
        if value == 0 {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("{} must be greater than 0", name),
            });
        }
    }

    let multiplier = poll.backoff_multiplier();
    if !multiplier.is_finite() || multiplier < 1.0 {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "poll.backoff_multiplier must be at least 1.0, got {}",
                multiplier
            ),
        });
    }

    if poll.backoff_ceiling_ms() < poll.backoff_base_ms() {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "poll.backoff_ceiling_ms ({}) is below poll.backoff_base_ms ({})",
                poll.backoff_ceiling_ms(),
                poll.backoff_base_ms()
            ),
        });
    }

    validate_url(config.server.origin())?;

    if let Some(ref base_url) = config.server.base_url
        && !base_url.trim().is_empty()
    {
        validate_url(base_url.trim())?;
    }

    Ok(())
}

fn validate_url(url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            message: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AvisionConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = AvisionConfig::default();
        config.poll.base_interval_ms = Some(0);

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidConfiguration { ref message }) if message.contains("base_interval_ms")
        ));
    }

    #[test]
    fn test_shrinking_multiplier_rejected() {
        let mut config = AvisionConfig::default();
        config.poll.backoff_multiplier = Some(0.5);
        assert!(validate_config(&config).is_err());

        config.poll.backoff_multiplier = Some(f64::NAN);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_ceiling_below_base_rejected() {
        let mut config = AvisionConfig::default();
        config.poll.backoff_base_ms = Some(1000);
        config.poll.backoff_ceiling_ms = Some(500);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_bad_urls_rejected() {
        let mut config = AvisionConfig::default();
        config.server.base_url = Some("ftp://files.local".to_string());
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));

        let mut config = AvisionConfig::default();
        config.server.origin = Some("localhost".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_blank_base_url_allowed() {
        let mut config = AvisionConfig::default();
        config.server.base_url = Some("  ".to_string());
        assert!(validate_config(&config).is_ok());
    }
}
