//! Road-distance sources and the fallback policy.

use std::future::Future;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{Coord, InvalidCoord};
use crate::geo::distance_meters;

use super::error::RoadError;

/// Multiplier applied to great-circle distance to approximate road distance.
pub const ROAD_CORRECTION_FACTOR: f64 = 1.3;

/// Drivable distance and time between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoadRoute {
    pub distance_km: f64,
    pub duration_secs: f64,
}

/// Something that can report road distance between two coordinates.
pub trait RoadDistanceSource {
    /// Whether answers come from a real road network rather than an
    /// approximation.
    fn is_road_network(&self) -> bool;

    fn road_route(
        &self,
        from: Coord,
        to: Coord,
    ) -> impl Future<Output = Result<RoadRoute, RoadError>> + Send;
}

/// Local estimate: great-circle distance times [`ROAD_CORRECTION_FACTOR`].
///
/// Duration is derived from an assumed average speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightLineEstimate {
    pub avg_speed_kmh: f64,
}

impl StraightLineEstimate {
    pub fn new(avg_speed_kmh: f64) -> Self {
        Self { avg_speed_kmh }
    }

    pub fn estimate(&self, from: Coord, to: Coord) -> RoadRoute {
        let distance_km = distance_meters(from, to) / 1000.0 * ROAD_CORRECTION_FACTOR;
        RoadRoute {
            distance_km,
            duration_secs: distance_km / self.avg_speed_kmh * 3600.0,
        }
    }
}

impl Default for StraightLineEstimate {
    fn default() -> Self {
        Self::new(25.0)
    }
}

impl RoadDistanceSource for StraightLineEstimate {
    fn is_road_network(&self) -> bool {
        false
    }

    async fn road_route(&self, from: Coord, to: Coord) -> Result<RoadRoute, RoadError> {
        from.validate()?;
        to.validate()?;
        Ok(self.estimate(from, to))
    }
}

/// Distance with a flag saying whether it came from the road network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceEstimate {
    pub distance_km: f64,
    pub is_road_distance: bool,
}

/// Ask `source` once. Any failure is logged and reported as `None`.
pub async fn road_distance<S: RoadDistanceSource>(
    source: &S,
    from: Coord,
    to: Coord,
) -> Option<RoadRoute> {
    match source.road_route(from, to).await {
        Ok(route) => Some(route),
        Err(e) => {
            debug!(from = %from, to = %to, error = %e, "road distance unavailable");
            None
        }
    }
}

/// Road distance from `source`, or the corrected straight-line distance when
/// it is unavailable.
///
/// Endpoints are validated first; that is the only error. Once they are
/// valid, every source failure falls back to a finite estimate.
/// `is_road_distance` is true only when the answer came from a road-network
/// source.
pub async fn road_distance_with_fallback<S: RoadDistanceSource>(
    source: &S,
    from: Coord,
    to: Coord,
) -> Result<DistanceEstimate, InvalidCoord> {
    from.validate()?;
    to.validate()?;

    if let Some(route) = road_distance(source, from, to).await {
        return Ok(DistanceEstimate {
            distance_km: route.distance_km,
            is_road_distance: source.is_road_network(),
        });
    }

    warn!(from = %from, to = %to, "falling back to straight-line distance");
    Ok(DistanceEstimate {
        distance_km: StraightLineEstimate::default().estimate(from, to).distance_km,
        is_road_distance: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::road::{OsrmClient, OsrmConfig};

    /// Source that always answers with a fixed result.
    struct Fixed(Option<RoadRoute>);

    impl RoadDistanceSource for Fixed {
        fn is_road_network(&self) -> bool {
            true
        }

        async fn road_route(&self, _from: Coord, _to: Coord) -> Result<RoadRoute, RoadError> {
            self.0.ok_or(RoadError::NoRoute {
                code: "NoRoute".to_string(),
            })
        }
    }

    fn points() -> (Coord, Coord) {
        (Coord::new(27.7172, 85.3240), Coord::new(27.6710, 85.4298))
    }

    #[tokio::test]
    async fn uses_source_when_available() {
        let (a, b) = points();
        let source = Fixed(Some(RoadRoute {
            distance_km: 14.2,
            duration_secs: 1500.0,
        }));

        let estimate = road_distance_with_fallback(&source, a, b).await.unwrap();
        assert_eq!(
            estimate,
            DistanceEstimate {
                distance_km: 14.2,
                is_road_distance: true
            }
        );
    }

    #[tokio::test]
    async fn falls_back_when_source_fails() {
        let (a, b) = points();
        let estimate = road_distance_with_fallback(&Fixed(None), a, b).await.unwrap();

        assert!(!estimate.is_road_distance);
        let expected = distance_meters(a, b) / 1000.0 * 1.3;
        assert!((estimate.distance_km - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn falls_back_when_service_unreachable() {
        let (a, b) = points();
        let client = OsrmClient::new(
            OsrmConfig::new()
                .with_base_url("http://127.0.0.1:1")
                .with_timeout(2),
        )
        .unwrap();

        assert_eq!(road_distance(&client, a, b).await, None);

        let estimate = road_distance_with_fallback(&client, a, b).await.unwrap();
        assert!(!estimate.is_road_distance);
        let expected = distance_meters(a, b) / 1000.0 * 1.3;
        assert!((estimate.distance_km - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn straight_line_source_is_not_road_distance() {
        let (a, b) = points();
        let estimate = road_distance_with_fallback(&StraightLineEstimate::default(), a, b)
            .await
            .unwrap();

        assert!(!estimate.is_road_distance);
        let expected = distance_meters(a, b) / 1000.0 * 1.3;
        assert!((estimate.distance_km - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn malformed_endpoint_is_rejected() {
        let (a, _) = points();
        let bad = Coord::new(f64::NAN, 85.0);

        let result = road_distance_with_fallback(&Fixed(None), a, bad).await;
        assert!(matches!(result, Err(InvalidCoord::NotFinite(_))));

        let result = road_distance_with_fallback(&Fixed(None), Coord::new(95.0, 85.0), a).await;
        assert_eq!(result, Err(InvalidCoord::LatitudeOutOfRange(95.0)));
    }

    #[tokio::test]
    async fn straight_line_source() {
        let (a, b) = points();
        let route = StraightLineEstimate::new(30.0).road_route(a, b).await.unwrap();
        assert!((route.duration_secs - route.distance_km / 30.0 * 3600.0).abs() < 1e-9);

        let bad = StraightLineEstimate::default()
            .road_route(Coord::new(f64::NAN, 0.0), b)
            .await;
        assert!(matches!(bad, Err(RoadError::InvalidEndpoint(_))));
    }
}
