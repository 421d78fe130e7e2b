//! OSRM route service response DTOs.

use serde::Deserialize;

use super::error::RoadError;
use super::source::RoadRoute;

/// Response from `GET /route/v1/driving/...`.
#[derive(Debug, Clone, Deserialize)]
pub struct OsrmResponse {
    /// `"Ok"` on success, otherwise an error code such as `"NoRoute"`.
    pub code: String,

    /// Candidate routes, best first. Absent on error responses.
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

/// One route alternative.
#[derive(Debug, Clone, Deserialize)]
pub struct OsrmRoute {
    /// Metres.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
}

impl OsrmResponse {
    /// First route of a successful response.
    pub fn into_route(self) -> Result<RoadRoute, RoadError> {
        if self.code != "Ok" {
            return Err(RoadError::NoRoute { code: self.code });
        }
        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or(RoadError::NoRoute { code: self.code })?;

        Ok(RoadRoute {
            distance_km: route.distance / 1000.0,
            duration_secs: route.duration,
        })
    }
}
