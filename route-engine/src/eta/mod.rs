//! Vehicle ETA estimation.
//!
//! [`EtaEstimator`] turns one GPS fix plus the previous [`EtaState`] into a
//! new state; [`VehicleTracker`] keeps that state per vehicle and serializes
//! updates for the same vehicle.

mod config;
mod estimator;
mod geometry;
mod state;
mod tracker;

pub use config::{ConfigError, EtaConfig};
pub use estimator::{EtaEstimator, EtaSkip, EtaUpdate, next_passed_counter, raw_eta_secs, smooth};
pub use geometry::{Located, RouteGeometry};
pub use state::{ArrivalStatus, EtaState, EtaTarget, VehiclePosition, eta_minutes};
pub use tracker::{Observation, VehicleTracker};
