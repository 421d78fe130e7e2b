//! Routes and their stops.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::RouteError;
use super::{Coord, RouteId, StopId};
use tracing::warn;

use crate::geo::{Polyline, checked_distance_meters};
use crate::router::{GraphError, StopGraph};

/// A physical stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    #[serde(flatten)]
    pub coord: Coord,
}

impl Stop {
    pub fn new(id: StopId, name: impl Into<String>, coord: Coord) -> Self {
        Self {
            id,
            name: name.into(),
            coord,
        }
    }
}

/// A stop's place in a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    #[serde(flatten)]
    pub stop: Stop,

    /// Surveyed distance to the next stop in metres. When absent or zero the
    /// straight-line distance is used instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_to_next_m: Option<f64>,
}

impl RouteStop {
    pub fn new(stop: Stop) -> Self {
        Self {
            stop,
            distance_to_next_m: None,
        }
    }

    pub fn with_distance_to_next(mut self, meters: f64) -> Self {
        self.distance_to_next_m = Some(meters);
        self
    }
}

/// Serialized form of a route, validated into a [`Route`].
#[derive(Debug, Deserialize)]
struct RouteRecord {
    id: RouteId,
    name: String,
    stops: Vec<RouteStop>,
    #[serde(default)]
    polyline: Option<Polyline>,
    #[serde(default)]
    version: u64,
}

/// An ordered sequence of stops with optional path geometry.
///
/// Stops are unique within a route and stored distances are finite and
/// non-negative. `version` changes whenever the geometry changes, so
/// derived data can be cached per `(id, version)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    id: RouteId,
    name: String,
    stops: Vec<RouteStop>,
    polyline: Option<Polyline>,
    version: u64,
}

impl Route {
    pub fn new(
        id: RouteId,
        name: impl Into<String>,
        stops: Vec<RouteStop>,
    ) -> Result<Self, RouteError> {
        let mut seen = HashSet::new();
        for rs in &stops {
            if !seen.insert(rs.stop.id) {
                return Err(RouteError::DuplicateStop(rs.stop.id));
            }
            match rs.distance_to_next_m {
                Some(d) if !d.is_finite() || d < 0.0 => {
                    return Err(RouteError::InvalidDistance {
                        stop: rs.stop.id,
                        distance: d,
                    });
                }
                _ => {}
            }
        }

        Ok(Self {
            id,
            name: name.into(),
            stops,
            polyline: None,
            version: 0,
        })
    }

    /// Attach path geometry.
    pub fn with_polyline(mut self, polyline: Polyline) -> Self {
        self.polyline = Some(polyline);
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stops(&self) -> &[RouteStop] {
        &self.stops
    }

    pub fn polyline(&self) -> Option<&Polyline> {
        self.polyline.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn stop_ids(&self) -> Vec<StopId> {
        self.stops.iter().map(|rs| rs.stop.id).collect()
    }

    /// Index of `stop` in the route's order.
    pub fn position_of(&self, stop: StopId) -> Option<usize> {
        self.stops.iter().position(|rs| rs.stop.id == stop)
    }

    /// Distance from stop `i` to stop `i + 1`.
    ///
    /// `None` if either stop does not exist, or if there is no stored
    /// distance and one of the two coordinates is invalid.
    pub fn leg_distance_m(&self, i: usize) -> Option<f64> {
        let from = self.stops.get(i)?;
        let to = self.stops.get(i + 1)?;
        match from.distance_to_next_m {
            Some(d) if d != 0.0 => Some(d),
            _ => checked_distance_meters(from.stop.coord, to.stop.coord).ok(),
        }
    }

    /// The route's stop graph: one edge from each stop to the next.
    ///
    /// Every stop is a node. A leg whose distance cannot be computed has no
    /// edge, so only searches that would cross it are affected.
    pub fn stop_graph(&self) -> Result<StopGraph, GraphError> {
        let mut graph = StopGraph::new();
        for (i, rs) in self.stops.iter().enumerate() {
            graph.add_node(rs.stop.id);
            let Some(next) = self.stops.get(i + 1) else {
                continue;
            };
            match self.leg_distance_m(i) {
                Some(weight) => graph.add_edge(rs.stop.id, next.stop.id, weight)?,
                None => {
                    warn!(route = %self.id, from = %rs.stop.id, to = %next.stop.id, "leg has no usable distance");
                }
            }
        }
        Ok(graph)
    }

    /// Route length in metres: the polyline length when the route has one,
    /// otherwise the sum of stop-to-stop distances.
    pub fn route_length_m(&self) -> f64 {
        match &self.polyline {
            Some(p) if p.len() >= 2 => p.length_m(),
            _ => (0..self.stops.len().saturating_sub(1))
                .filter_map(|i| self.leg_distance_m(i))
                .sum(),
        }
    }
}

impl TryFrom<RouteRecord> for Route {
    type Error = RouteError;

    fn try_from(record: RouteRecord) -> Result<Self, Self::Error> {
        let mut route = Route::new(record.id, record.name, record.stops)?.with_version(record.version);
        route.polyline = record.polyline;
        Ok(route)
    }
}

/// Parse routes from a JSON array.
pub fn parse_routes(json: &str) -> Result<Vec<Route>, RouteError> {
    let records: Vec<RouteRecord> = serde_json::from_str(json)?;
    records.into_iter().map(Route::try_from).collect()
}

/// Load routes from a JSON file.
pub fn load_routes(path: impl AsRef<Path>) -> Result<Vec<Route>, RouteError> {
    let json = std::fs::read_to_string(path)?;
    parse_routes(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn stop(id: u64, lat: f64) -> RouteStop {
        RouteStop::new(Stop::new(StopId(id), format!("S{id}"), Coord::new(lat, 85.0)))
    }

    fn line_route() -> Route {
        Route::new(
            RouteId(1),
            "R1",
            vec![stop(1, 27.0), stop(2, 27.001), stop(3, 27.002)],
        )
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_stop() {
        let err = Route::new(RouteId(1), "R", vec![stop(1, 27.0), stop(1, 27.1)]).unwrap_err();
        assert!(matches!(err, RouteError::DuplicateStop(StopId(1))));
    }

    #[test]
    fn rejects_negative_distance() {
        let err = Route::new(
            RouteId(1),
            "R",
            vec![stop(1, 27.0).with_distance_to_next(-1.0), stop(2, 27.1)],
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::InvalidDistance { .. }));
    }

    #[test]
    fn stop_graph_chains_stops_in_order() {
        let graph = line_route().stop_graph().unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edges(&StopId(1)).len(), 1);
        assert_eq!(graph.edges(&StopId(1))[0].0, StopId(2));
        assert_eq!(graph.edges(&StopId(2))[0].0, StopId(3));
        assert!(graph.edges(&StopId(3)).is_empty());

        let w = graph.edges(&StopId(1))[0].1;
        assert!((w - 111.2).abs() < 0.5, "weight {w}");
    }

    #[test]
    fn stop_graph_prefers_stored_distance() {
        let route = Route::new(
            RouteId(1),
            "R",
            vec![
                stop(1, 27.0).with_distance_to_next(250.0),
                stop(2, 27.001).with_distance_to_next(0.0),
                stop(3, 27.002),
            ],
        )
        .unwrap();
        let graph = route.stop_graph().unwrap();

        assert_eq!(graph.edges(&StopId(1))[0].1, 250.0);
        // Zero means "unknown", so haversine is used.
        let w = graph.edges(&StopId(2))[0].1;
        assert!((w - 111.2).abs() < 0.5);
    }

    #[test]
    fn stop_graph_drops_legs_touching_malformed_stop() {
        let mut bad = stop(3, 27.002);
        bad.stop.coord.lat = f64::NAN;
        let route = Route::new(
            RouteId(1),
            "R",
            vec![stop(1, 27.0), stop(2, 27.001), bad, stop(4, 27.003)],
        )
        .unwrap();
        let graph = route.stop_graph().unwrap();

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.edges(&StopId(1)).len(), 1);
        assert!(graph.edges(&StopId(2)).is_empty());
        assert!(graph.edges(&StopId(3)).is_empty());
    }

    #[test]
    fn out_of_range_latitude_has_no_leg_distance() {
        let route = Route::new(RouteId(1), "R", vec![stop(1, 27.0), stop(2, 95.0)]).unwrap();
        assert_eq!(route.leg_distance_m(0), None);
        assert!(route.stop_graph().unwrap().edges(&StopId(1)).is_empty());
    }

    #[test]
    fn stored_distance_survives_malformed_coordinate() {
        let mut bad = stop(2, 27.001);
        bad.stop.coord.lat = f64::NAN;
        let route = Route::new(
            RouteId(1),
            "R",
            vec![stop(1, 27.0).with_distance_to_next(140.0), bad],
        )
        .unwrap();
        assert_eq!(route.leg_distance_m(0), Some(140.0));
    }

    #[test]
    fn position_and_ids() {
        let route = line_route();
        assert_eq!(route.stop_ids(), vec![StopId(1), StopId(2), StopId(3)]);
        assert_eq!(route.position_of(StopId(3)), Some(2));
        assert_eq!(route.position_of(StopId(9)), None);
    }

    #[test]
    fn route_length_without_polyline() {
        let len = line_route().route_length_m();
        assert!((len - 222.4).abs() < 1.0, "length {len}");
    }

    #[test]
    fn route_length_with_polyline() {
        let route = line_route().with_polyline(Polyline::new(vec![
            Coord::new(27.0, 85.0),
            Coord::new(27.0, 85.01),
        ]));
        let len = route.route_length_m();
        assert!((len - 991.0).abs() < 5.0, "length {len}");
    }

    #[test]
    fn parse_routes_json() {
        let json = r#"[
            {
                "id": 7,
                "name": "Ring Road",
                "version": 2,
                "stops": [
                    {"id": 1, "name": "Balkhu", "lat": 27.684, "lng": 85.298, "distance_to_next_m": 900.0},
                    {"id": 2, "name": "Kalanki", "lat": 27.693, "lng": 85.281}
                ],
                "polyline": [{"lat": 27.684, "lng": 85.298}, {"lat": 27.693, "lng": 85.281}]
            }
        ]"#;

        let routes = parse_routes(json).unwrap();
        assert_eq!(routes.len(), 1);

        let route = &routes[0];
        assert_eq!(route.id(), RouteId(7));
        assert_eq!(route.name(), "Ring Road");
        assert_eq!(route.version(), 2);
        assert_eq!(route.stops()[0].stop.name, "Balkhu");
        assert_eq!(route.stops()[0].distance_to_next_m, Some(900.0));
        assert_eq!(route.stops()[1].distance_to_next_m, None);
        assert_eq!(route.polyline().map(Polyline::len), Some(2));
    }

    #[test]
    fn load_routes_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 1, "name": "R", "stops": [{{"id": 1, "name": "A", "lat": 1.0, "lng": 2.0}}]}}]"#
        )
        .unwrap();

        let routes = load_routes(file.path()).unwrap();
        assert_eq!(routes[0].stops().len(), 1);
        assert!(routes[0].polyline().is_none());
    }

    #[test]
    fn load_routes_missing_file() {
        let err = load_routes("/nonexistent/routes.json").unwrap_err();
        assert!(matches!(err, RouteError::Io(_)));
    }
}
