//! Domain error types.
//!
//! These errors represent validation failures at the boundary of the core.
//! Search and geometry code never returns them: it encodes "no answer" as
//! sentinel values instead.

use super::{Coord, StopId};

/// A coordinate that cannot take part in distance computations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidCoord {
    #[error("coordinate {0:?} is not finite")]
    NotFinite(Coord),

    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("cannot parse {0:?} as \"lat,lng\"")]
    Unparsable(String),
}

/// Errors from building or loading routes.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The same stop appears twice in one route.
    #[error("stop {0} appears more than once in route")]
    DuplicateStop(StopId),

    /// A stored inter-stop distance is negative or not a number.
    #[error("invalid distance {distance} after stop {stop}")]
    InvalidDistance { stop: StopId, distance: f64 },

    /// Reading the routes file failed.
    #[error("failed to read routes: {0}")]
    Io(#[from] std::io::Error),

    /// The routes file is not valid JSON.
    #[error("failed to parse routes: {0}")]
    Json(#[from] serde_json::Error),
}
