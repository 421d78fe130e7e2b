//! OSRM HTTP client.
//!
//! Asks an OSRM-compatible routing service for the drivable distance and
//! duration between two coordinates. One attempt per call, bounded by the
//! configured timeout; callers decide what to do on failure.

use std::time::Duration;

use tracing::debug;

use crate::domain::Coord;

use super::error::RoadError;
use super::source::{RoadDistanceSource, RoadRoute};
use super::types::OsrmResponse;

/// Default base URL (the public OSRM demo server).
const DEFAULT_BASE_URL: &str = "https://router.project-osrm.org";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration for the OSRM client.
#[derive(Debug, Clone, PartialEq)]
pub struct OsrmConfig {
    /// Base URL for the service, without a trailing slash
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OsrmConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (self-hosted instance, or tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Road-routing client for an OSRM `route` service.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    http: reqwest::Client,
    base_url: String,
}

impl OsrmClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OsrmConfig) -> Result<Self, RoadError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// URL of the driving route between two points. OSRM takes `lng,lat`.
    fn route_url(&self, from: Coord, to: Coord) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.base_url, from.lng, from.lat, to.lng, to.lat
        )
    }

    /// Fetch the driving route between two points.
    pub async fn route(&self, from: Coord, to: Coord) -> Result<RoadRoute, RoadError> {
        from.validate()?;
        to.validate()?;

        let url = self.route_url(from, to);
        debug!(url = %url, "requesting road route");

        let response = self
            .http
            .get(&url)
            .query(&[("overview", "false"), ("steps", "false")])
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(RoadError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: OsrmResponse = serde_json::from_str(&body).map_err(|e| RoadError::Json {
            message: e.to_string(),
        })?;

        parsed.into_route()
    }
}

impl RoadDistanceSource for OsrmClient {
    fn is_road_network(&self) -> bool {
        true
    }

    async fn road_route(&self, from: Coord, to: Coord) -> Result<RoadRoute, RoadError> {
        self.route(from, to).await
    }
}
