//! Precomputed geometry for polyline-backed routes.

use tracing::warn;

use crate::domain::{Coord, Route};
use crate::geo::{CumulativeDistances, Polyline, distance_along_route};

/// Where a vehicle sits on its route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Located {
    /// Distance from the start of the polyline to the projected position.
    pub distance_along_m: f64,
    /// Stop whose own distance-along-route is closest to the vehicle's.
    pub nearest_stop_index: usize,
    /// How far the raw fix is from the path.
    pub offset_from_path_m: f64,
}

/// A route's polyline with its cumulative distance table and the
/// distance-along-route of every stop.
#[derive(Debug, Clone)]
pub struct RouteGeometry {
    polyline: Polyline,
    cumulative: CumulativeDistances,
    /// `None` for stops whose coordinates could not be projected.
    stop_offsets: Vec<Option<f64>>,
}

impl RouteGeometry {
    /// Build geometry for `route`, or `None` if it has no usable polyline.
    pub fn build(route: &Route) -> Option<Self> {
        let polyline = route.polyline()?.clone();
        if polyline.len() < 2 {
            return None;
        }
        let cumulative = polyline.cumulative_distances();

        let stop_offsets = route
            .stops()
            .iter()
            .map(|rs| {
                if let Err(e) = rs.stop.coord.validate() {
                    warn!(route = %route.id(), stop = %rs.stop.id, error = %e, "stop not projected");
                    return None;
                }
                polyline.project(rs.stop.coord).map(|p| {
                    distance_along_route(&polyline, &cumulative, p.segment_index, p.t)
                })
            })
            .collect();

        Some(Self {
            polyline,
            cumulative,
            stop_offsets,
        })
    }

    pub fn polyline(&self) -> &Polyline {
        &self.polyline
    }

    pub fn cumulative(&self) -> &CumulativeDistances {
        &self.cumulative
    }

    pub fn length_m(&self) -> f64 {
        self.cumulative.total()
    }

    /// Distance-along-route of stop `i`.
    pub fn stop_offset(&self, i: usize) -> Option<f64> {
        self.stop_offsets.get(i).copied().flatten()
    }

    /// Project `position` onto the route and find the nearest stop by
    /// along-route distance. Earlier stops win ties.
    pub fn locate(&self, position: Coord) -> Option<Located> {
        let proj = self.polyline.project(position)?;
        let along = distance_along_route(&self.polyline, &self.cumulative, proj.segment_index, proj.t);

        let mut nearest: Option<(usize, f64)> = None;
        for (i, offset) in self.stop_offsets.iter().enumerate() {
            let Some(offset) = offset else { continue };
            let gap = (offset - along).abs();
            if nearest.is_none_or(|(_, best)| gap < best) {
                nearest = Some((i, gap));
            }
        }

        let (nearest_stop_index, _) = nearest?;
        Some(Located {
            distance_along_m: along,
            nearest_stop_index,
            offset_from_path_m: proj.distance_m,
        })
    }
}
