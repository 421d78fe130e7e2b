//! Domain types for route tracking.
//!
//! Identifiers, coordinates, stops and routes. Types that come from outside
//! the core are validated where they enter it (route construction, coordinate
//! checks), so the search and geometry code can assume well-formed input.

mod coord;
mod error;
mod ids;
mod route;

pub use coord::Coord;
pub use error::{InvalidCoord, RouteError};
pub use ids::{RouteId, StopId, VehicleId};
pub use route::{Route, RouteStop, Stop, load_routes, parse_routes};
