//! Base URL handling for the detection service.
//!
//! The dashboard talks to `{base}/detect` (JSON), `{base}/video` (MJPEG
//! stream) and `{base}/health`. The base itself is either configured or
//! derived from the origin the dashboard is served from.

use reqwest::Url;

use crate::errors::ConfigError;

/// Normalize user input into a base URL.
///
/// Trims whitespace, falls back to `default` when the input is blank and
/// strips every trailing slash.
pub fn normalize_base_url(input: &str, default: &str) -> String {
    let trimmed = input.trim();
    let value = if trimmed.is_empty() {
        default.trim()
    } else {
        trimmed
    };
    value.trim_end_matches('/').to_string()
}

/// Derive the default base URL from the dashboard's origin.
///
/// When the origin is the local live-reload dev server (`dev_port`), the
/// backend runs on `backend_port` of the same host. Otherwise the backend
/// is same-origin.
pub fn resolve_default_base(
    origin: &str,
    dev_port: u16,
    backend_port: u16,
) -> Result<String, ConfigError> {
    let url = Url::parse(origin.trim()).map_err(|e| ConfigError::InvalidUrl {
        url: origin.to_string(),
        message: e.to_string(),
    })?;

    let host = url.host_str().ok_or_else(|| ConfigError::InvalidUrl {
        url: origin.to_string(),
        message: "missing host".to_string(),
    })?;

    if url.port() == Some(dev_port) {
        return Ok(format!("{}://{}:{}", url.scheme(), host, backend_port));
    }

    Ok(url.origin().ascii_serialization())
}

pub fn detect_url(base_url: &str) -> String {
    format!("{}/detect", base_url)
}

pub fn health_url(base_url: &str) -> String {
    format!("{}/health", base_url)
}

/// Video stream URL with a cache-busting timestamp (epoch milliseconds).
pub fn video_url(base_url: &str, ts_ms: i64) -> String {
    format!("{}/video?ts={}", base_url, ts_ms)
}

/// Base URL without its scheme, for compact status display.
pub fn display_host(base_url: &str) -> &str {
    base_url
        .strip_prefix("https://")
        .or_else(|| base_url.strip_prefix("http://"))
        .unwrap_or(base_url)
}
