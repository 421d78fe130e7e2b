//! Geometry kernel.
//!
//! Great-circle distance and a local planar projection of a point onto a
//! segment. The projection uses an equirectangular approximation around the
//! mean latitude of the three points involved, which is accurate enough for
//! segments up to a few kilometres long.

mod polyline;

pub use polyline::{CumulativeDistances, Polyline, ProjectionResult, distance_along_route};

use crate::domain::{Coord, InvalidCoord};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres per degree of longitude at the equator.
const METERS_PER_DEG_LNG: f64 = 111_320.0;

/// Metres per degree of latitude.
const METERS_PER_DEG_LAT: f64 = 110_540.0;

/// Haversine great-circle distance in metres.
///
/// # Examples
///
/// ```
/// use route_engine::domain::Coord;
/// use route_engine::geo::distance_meters;
///
/// let a = Coord::new(27.0, 85.0);
/// let b = Coord::new(27.001, 85.0);
/// let d = distance_meters(a, b);
/// assert!((d - 111.2).abs() < 0.5);
/// assert_eq!(distance_meters(a, a), 0.0);
/// ```
pub fn distance_meters(a: Coord, b: Coord) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi * 0.5).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda * 0.5).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Like [`distance_meters`], but rejects malformed coordinates instead of
/// returning `NaN`.
pub fn checked_distance_meters(a: Coord, b: Coord) -> Result<f64, InvalidCoord> {
    a.validate()?;
    b.validate()?;
    Ok(distance_meters(a, b))
}

/// Result of projecting a point onto a single segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Fraction along `a -> b`, clamped to `[0, 1]`.
    pub t: f64,
    /// The projected point.
    pub point: Coord,
}

/// Project `p` onto the segment `a -> b`.
///
/// A zero-length segment projects everything onto `a` with `t = 0`.
pub fn project_onto_segment(p: Coord, a: Coord, b: Coord) -> SegmentProjection {
    let mean_lat = ((a.lat + b.lat + p.lat) / 3.0).to_radians();
    let kx = mean_lat.cos() * METERS_PER_DEG_LNG;
    let ky = METERS_PER_DEG_LAT;

    let (ax, ay) = (a.lng * kx, a.lat * ky);
    let (bx, by) = (b.lng * kx, b.lat * ky);
    let (px, py) = (p.lng * kx, p.lat * ky);

    let (vx, vy) = (bx - ax, by - ay);
    let (wx, wy) = (px - ax, py - ay);

    let denom = vx * vx + vy * vy;
    if denom == 0.0 {
        return SegmentProjection { t: 0.0, point: a };
    }

    let t = ((wx * vx + wy * vy) / denom).clamp(0.0, 1.0);
    let proj_x = ax + t * vx;
    let proj_y = ay + t * vy;

    SegmentProjection {
        t,
        point: Coord::new(proj_y / ky, proj_x / kx),
    }
}
