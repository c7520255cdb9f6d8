use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::base_url::{detect_url, health_url};
use crate::fetcher::SnapshotSource;
use crate::fetcher::errors::FetchError;
use crate::snapshot::Snapshot;

/// HTTP client for the detection service.
///
/// Every request bypasses intermediate caches so each poll observes the
/// freshest server state. No request timeout is set beyond the transport's
/// own; staleness is judged by the scheduler.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    ok: bool,
}

impl HttpFetcher {
    /// Build the default client. Fails only when the TLS backend cannot
    /// be initialized.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("avision/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// `GET {base_url}/detect`, parsed as a [`Snapshot`].
    pub async fn fetch_snapshot(&self, base_url: &str) -> Result<Snapshot, FetchError> {
        let url = detect_url(base_url);
        debug!(event = "core.fetch.request_started", url = %url);

        let body = self.get_text(&url, base_url).await?;

        let snapshot = Snapshot::from_json(&body).map_err(|e| {
            warn!(event = "core.fetch.parse_failed", url = %url, error = %e);
            FetchError::parse(e.to_string(), base_url)
        })?;

        debug!(
            event = "core.fetch.request_completed",
            url = %url,
            count = snapshot.count,
            alert_level = snapshot.alert_level
        );

        Ok(snapshot)
    }

    /// `GET {base_url}/health`. Returns the service's `ok` flag.
    pub async fn health(&self, base_url: &str) -> Result<bool, FetchError> {
        let url = health_url(base_url);
        let body = self.get_text(&url, base_url).await?;
        let health: HealthResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::parse(e.to_string(), base_url))?;

        debug!(event = "core.fetch.health_completed", url = %url, ok = health.ok);

        Ok(health.ok)
    }

    async fn get_text(&self, url: &str, base_url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| {
                debug!(event = "core.fetch.network_failed", url = %url, error = %e);
                FetchError::network(e.to_string(), base_url)
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(
                event = "core.fetch.status_failed",
                url = %url,
                status = status.as_u16()
            );
            return Err(FetchError::http_status(status.as_u16(), base_url));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::network(e.to_string(), base_url))
    }
}

impl SnapshotSource for HttpFetcher {
    async fn poll(&self, base_url: &str) -> Result<Snapshot, FetchError> {
        self.fetch_snapshot(base_url).await
    }
}
