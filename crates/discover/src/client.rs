//! Production transport against the TMDB HTTP API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::DiscoverError;
use crate::fault::{self, FaultConfigSource, NoFaults};
use crate::transport::{QueryParams, Transport};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Client configuration. Plain struct-update style; `Default` gives the
/// public production endpoint with no credentials.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// v4 read-access token, sent as a bearer header when non-empty.
    pub read_access_token: String,
    /// Legacy v3 key, sent as an `api_key` query parameter only when no
    /// bearer token is configured.
    pub api_key: String,
    /// Default `language` query parameter added to every request.
    pub language: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            read_access_token: String::new(),
            api_key: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Thin reqwest wrapper implementing [`Transport`]. Holds a fault-config
/// source that is consulted once per request — never cached — so a debug
/// surface flipping the config takes effect on the next call.
pub struct TmdbClient {
    http: reqwest::Client,
    config: ClientConfig,
    faults: Arc<dyn FaultConfigSource>,
}

impl TmdbClient {
    pub fn new(config: ClientConfig) -> Result<Self, DiscoverError> {
        Self::with_fault_source(config, Arc::new(NoFaults))
    }

    pub fn with_fault_source(
        config: ClientConfig,
        faults: Arc<dyn FaultConfigSource>,
    ) -> Result<Self, DiscoverError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            faults,
        })
    }

    fn build_query(&self, params: &[(String, String)]) -> QueryParams {
        let mut query: QueryParams = vec![("language".into(), self.config.language.clone())];
        query.extend(params.iter().cloned());

        let no_bearer = self.config.read_access_token.trim().is_empty();
        let api_key = self.config.api_key.trim();
        if no_bearer && !api_key.is_empty() && !query.iter().any(|(k, _)| k == "api_key") {
            query.push(("api_key".into(), api_key.to_string()));
        }
        query
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[async_trait]
impl Transport for TmdbClient {
    async fn get(
        &self,
        path: &str,
        params: &[(String, String)],
        token: &CancellationToken,
    ) -> Result<Value, DiscoverError> {
        let path = normalize_path(path);
        let faults = self.faults.load();

        if faults.enabled && faults.delay_ms > 0 {
            tokio::select! {
                _ = token.cancelled() => return Err(DiscoverError::Cancelled),
                _ = tokio::time::sleep(Duration::from_millis(faults.delay_ms)) => {}
            }
        }
        if faults.enabled && faults.http_sim.enabled {
            let status = reqwest::StatusCode::from_u16(faults.http_sim.status)
                .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
            warn!(%path, %status, "simulating HTTP failure");
            return Err(DiscoverError::http_status(status, None));
        }

        let url = format!("{}{}", self.config.base_url, path);
        let query = self.build_query(params);
        let mut request = self
            .http
            .get(&url)
            .query(&query)
            .header(header::ACCEPT, "application/json");
        let bearer = self.config.read_access_token.trim();
        if !bearer.is_empty() {
            request = request.bearer_auth(bearer);
        }

        debug!(%path, "GET");
        let fetch = async move {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let detail = response.text().await.ok();
                return Err(DiscoverError::http_status(status, detail));
            }
            let payload: Value = response.json().await?;
            Ok(payload)
        };
        let payload = tokio::select! {
            _ = token.cancelled() => return Err(DiscoverError::Cancelled),
            result = fetch => result?,
        };

        if faults.is_active() {
            return Ok(fault::transform(&path, payload, &faults));
        }
        Ok(payload)
    }
}
