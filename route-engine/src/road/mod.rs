//! Road-distance adapter.
//!
//! Distances come from a [`RoadDistanceSource`]: either a remote OSRM
//! service ([`OsrmClient`]) or a local [`StraightLineEstimate`].
//! [`road_distance_with_fallback`] tries a source once and substitutes the
//! local estimate when it fails, so valid endpoints always get a number.
//! Each source says whether its answers come from a road network.

mod client;
mod error;
mod source;
mod types;

pub use client::{OsrmClient, OsrmConfig};
pub use error::RoadError;
pub use source::{
    DistanceEstimate, ROAD_CORRECTION_FACTOR, RoadDistanceSource, RoadRoute, StraightLineEstimate,
    road_distance, road_distance_with_fallback,
};
pub use types::{OsrmResponse, OsrmRoute};
