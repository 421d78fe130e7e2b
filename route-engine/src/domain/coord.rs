//! Geographic coordinate type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::InvalidCoord;

/// A WGS-84 coordinate in decimal degrees.
///
/// Coordinates arrive from outside the core (stored stops, GPS fixes) and are
/// not validated on construction. Call [`Coord::validate`] where a malformed
/// coordinate must be detected rather than silently producing `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

impl Coord {
    #[inline]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that both components are finite and within range.
    ///
    /// # Examples
    ///
    /// ```
    /// use route_engine::domain::Coord;
    ///
    /// assert!(Coord::new(27.7, 85.3).validate().is_ok());
    /// assert!(Coord::new(f64::NAN, 85.3).validate().is_err());
    /// assert!(Coord::new(91.0, 0.0).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), InvalidCoord> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(InvalidCoord::NotFinite(*self));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(InvalidCoord::LatitudeOutOfRange(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(InvalidCoord::LongitudeOutOfRange(self.lng));
        }
        Ok(())
    }

    /// Parse a `"lat,lng"` pair, as typed into a pickup field.
    pub fn parse_pair(s: &str) -> Result<Self, InvalidCoord> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| InvalidCoord::Unparsable(s.to_string()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| InvalidCoord::Unparsable(s.to_string()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| InvalidCoord::Unparsable(s.to_string()))?;
        let coord = Coord::new(lat, lng);
        coord.validate()?;
        Ok(coord)
    }
}

impl FromStr for Coord {
    type Err = InvalidCoord;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Coord::parse_pair(s)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}
