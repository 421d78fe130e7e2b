//! Polyline projection and distance-along-route.
//!
//! Projection scans every segment, so each query costs O(n) in the number of
//! vertices. That is fine for bus routes of tens to a few hundred vertices;
//! longer geometries would want a spatial index over the segments.

use serde::{Deserialize, Serialize};

use super::{distance_meters, project_onto_segment};
use crate::domain::Coord;

/// An ordered path of coordinates describing a route's physical shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline(Vec<Coord>);

impl Polyline {
    pub fn new(points: Vec<Coord>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Coord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments (one fewer than vertices).
    pub fn segment_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Length of segment `i` in metres, or `None` past the last segment.
    pub fn segment_length(&self, i: usize) -> Option<f64> {
        let a = self.0.get(i)?;
        let b = self.0.get(i + 1)?;
        Some(distance_meters(*a, *b))
    }

    /// Total length in metres.
    pub fn length_m(&self) -> f64 {
        self.0
            .windows(2)
            .map(|w| distance_meters(w[0], w[1]))
            .sum()
    }

    /// Running distance from the first vertex to each vertex.
    pub fn cumulative_distances(&self) -> CumulativeDistances {
        let mut table = Vec::with_capacity(self.0.len());
        if self.0.is_empty() {
            return CumulativeDistances(table);
        }

        let mut running = 0.0;
        table.push(running);
        for w in self.0.windows(2) {
            running += distance_meters(w[0], w[1]);
            table.push(running);
        }
        CumulativeDistances(table)
    }

    /// Find the closest point on the polyline to `point`.
    ///
    /// Returns `None` when there are fewer than two vertices. On ties the
    /// earliest segment wins.
    pub fn project(&self, point: Coord) -> Option<ProjectionResult> {
        let mut best: Option<ProjectionResult> = None;

        for (i, w) in self.0.windows(2).enumerate() {
            let seg = project_onto_segment(point, w[0], w[1]);
            let d = distance_meters(point, seg.point);

            let better = match &best {
                None => true,
                Some(b) => d < b.distance_m,
            };
            if better {
                best = Some(ProjectionResult {
                    segment_index: i,
                    t: seg.t,
                    distance_m: d,
                    point: seg.point,
                });
            }
        }

        best
    }
}

impl From<Vec<Coord>> for Polyline {
    fn from(points: Vec<Coord>) -> Self {
        Self(points)
    }
}

/// Cumulative distances in metres, aligned index-for-index with a polyline's
/// vertices. The first entry is zero and the sequence never decreases.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CumulativeDistances(Vec<f64>);

impl CumulativeDistances {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, i: usize) -> Option<f64> {
        self.0.get(i).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total path length, or zero for an empty table.
    pub fn total(&self) -> f64 {
        self.0.last().copied().unwrap_or(0.0)
    }
}

/// Closest location on a polyline to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionResult {
    /// Index of the segment `(i, i + 1)` holding the projection.
    pub segment_index: usize,
    /// Fraction along that segment, in `[0, 1]`.
    pub t: f64,
    /// Great-circle distance from the query point to the projection.
    pub distance_m: f64,
    /// The projected coordinate.
    pub point: Coord,
}

/// Distance from the start of the polyline to a point at fraction `t` of
/// segment `segment_index`.
///
/// An index at or past the end of the table yields the total length. An
/// index naming the final vertex (no segment follows it) yields that
/// vertex's cumulative distance.
pub fn distance_along_route(
    polyline: &Polyline,
    table: &CumulativeDistances,
    segment_index: usize,
    t: f64,
) -> f64 {
    let Some(start) = table.get(segment_index) else {
        return table.total();
    };
    let seg_len = polyline.segment_length(segment_index).unwrap_or(0.0);
    start + seg_len * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Polyline {
        Polyline::new(vec![
            Coord::new(27.0, 85.0),
            Coord::new(27.0, 85.01),
            Coord::new(27.01, 85.01),
        ])
    }

    #[test]
    fn cumulative_distances_start_at_zero() {
        let table = line().cumulative_distances();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0), Some(0.0));
        assert!(table.get(1).unwrap() > 0.0);
        assert!(table.get(2).unwrap() > table.get(1).unwrap());
        assert!((table.total() - line().length_m()).abs() < 1e-9);
    }

    #[test]
    fn cumulative_distances_empty_and_single() {
        assert!(Polyline::default().cumulative_distances().is_empty());

        let single = Polyline::new(vec![Coord::new(1.0, 1.0)]);
        assert_eq!(single.cumulative_distances().as_slice(), &[0.0]);
    }

    #[test]
    fn project_needs_two_vertices() {
        assert!(Polyline::default().project(Coord::new(0.0, 0.0)).is_none());
        let single = Polyline::new(vec![Coord::new(1.0, 1.0)]);
        assert!(single.project(Coord::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn project_onto_second_segment() {
        let p = Coord::new(27.005, 85.0105);
        let proj = line().project(p).unwrap();

        assert_eq!(proj.segment_index, 1);
        assert!((proj.t - 0.5).abs() < 1e-3, "t = {}", proj.t);
        assert!(proj.distance_m < 60.0);
    }

    #[test]
    fn project_tie_prefers_earliest_segment() {
        // A repeated first vertex makes a zero-length segment that touches
        // the query point exactly, as does the start of the next segment.
        let a = Coord::new(27.0, 85.0);
        let poly = Polyline::new(vec![a, a, Coord::new(27.0, 85.01)]);
        let proj = poly.project(a).unwrap();
        assert_eq!(proj.segment_index, 0);
        assert_eq!(proj.distance_m, 0.0);
    }

    #[test]
    fn distance_along_route_interpolates() {
        let poly = line();
        let table = poly.cumulative_distances();
        let seg0 = poly.segment_length(0).unwrap();

        let d = distance_along_route(&poly, &table, 0, 0.5);
        assert!((d - seg0 / 2.0).abs() < 1e-9);

        let d = distance_along_route(&poly, &table, 1, 0.0);
        assert!((d - seg0).abs() < 1e-9);
    }

    #[test]
    fn distance_along_route_clamps_t() {
        let poly = line();
        let table = poly.cumulative_distances();

        assert_eq!(distance_along_route(&poly, &table, 0, -1.0), 0.0);
        let d = distance_along_route(&poly, &table, 0, 2.0);
        assert!((d - table.get(1).unwrap()).abs() < 1e-9);
    }

    #[test]
    fn distance_along_route_out_of_bounds() {
        let poly = line();
        let table = poly.cumulative_distances();

        assert_eq!(distance_along_route(&poly, &table, 10, 0.5), table.total());
        // Final vertex has no following segment.
        assert_eq!(distance_along_route(&poly, &table, 2, 0.5), table.total());
    }

    #[test]
    fn serde_as_list_of_points() {
        let poly: Polyline =
            serde_json::from_str(r#"[{"lat": 1.0, "lng": 2.0}, {"lat": 3.0, "lng": 4.0}]"#)
                .unwrap();
        assert_eq!(poly.len(), 2);
        assert_eq!(poly.points()[1], Coord::new(3.0, 4.0));
    }
}
