//! ETA estimation with exponential smoothing and passed-point hysteresis.
//!
//! Each position update goes through the same steps:
//!
//! 1. Locate the vehicle: project onto the route polyline when the route has
//!    one, otherwise scan every stop for the nearest by straight-line
//!    distance. Stops with malformed coordinates are skipped.
//! 2. Turn the remaining distance into a raw ETA at the configured average
//!    speed, never below one second.
//! 3. Smooth the raw ETA with an exponential moving average.
//! 4. Count consecutive updates whose smoothed ETA is within the passed
//!    threshold; any update above it resets the count.
//!
//! Steps 3 and 4 start cold whenever the route or target differs from the
//! one the previous state was measured to.
//!
//! An update that cannot locate the vehicle at all leaves the state as it
//! was.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::config::EtaConfig;
use super::geometry::RouteGeometry;
use super::state::{ArrivalStatus, EtaState, EtaTarget, VehiclePosition};
use crate::domain::{Coord, InvalidCoord, Route};
use crate::geo::checked_distance_meters;
use crate::router::shortest_path;

/// Why an update produced no new state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EtaSkip {
    #[error("observation at {observed_at} is older than last update at {last_update}")]
    Stale {
        observed_at: DateTime<Utc>,
        last_update: DateTime<Utc>,
    },

    #[error("invalid vehicle position: {0}")]
    InvalidPosition(#[from] InvalidCoord),

    #[error("no stop could be evaluated")]
    NoEvaluableStops,

    #[error("target stop {0} is not on the route")]
    TargetOutOfRange(usize),

    #[error("target stop {0} cannot be reached along the route")]
    TargetUnreachable(usize),
}

/// Result of a successful update.
#[derive(Debug, Clone, PartialEq)]
pub struct EtaUpdate {
    /// The state to store for the next update.
    pub state: EtaState,
    /// Distance still to travel to the target, in metres.
    pub remaining_m: f64,
    /// Display classification.
    pub status: ArrivalStatus,
    /// Whether the hysteresis counter has reached the configured
    /// confirmations.
    pub passed: bool,
}

/// Raw ETA in seconds for `remaining_m` at `speed_mps`, at least one second.
pub fn raw_eta_secs(remaining_m: f64, speed_mps: f64) -> f64 {
    (remaining_m / speed_mps).max(1.0)
}

/// Exponential moving average. The first observation is taken as is.
///
/// # Examples
///
/// ```
/// use route_engine::eta::smooth;
///
/// assert_eq!(smooth(None, 50.0, 0.3), 50.0);
/// assert!((smooth(Some(100.0), 50.0, 0.3) - 85.0).abs() < 1e-9);
/// ```
pub fn smooth(previous: Option<f64>, raw: f64, alpha: f64) -> f64 {
    match previous {
        None => raw,
        Some(prev) => alpha * raw + (1.0 - alpha) * prev,
    }
}

/// Next value of the consecutive-passed counter.
pub fn next_passed_counter(counter: u32, smoothed_secs: f64, threshold_secs: f64) -> u32 {
    if smoothed_secs <= threshold_secs {
        counter.saturating_add(1)
    } else {
        0
    }
}

/// Vehicle progress relative to the target for one update.
#[derive(Debug, Clone, Copy)]
struct Progress {
    nearest_stop_index: usize,
    remaining_m: f64,
    target_passed: bool,
}

/// Computes new ETA state from a position update.
#[derive(Debug, Clone, Default)]
pub struct EtaEstimator {
    config: EtaConfig,
}

impl EtaEstimator {
    pub fn new(config: EtaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EtaConfig {
        &self.config
    }

    /// Apply one position update to `state`.
    ///
    /// `geometry` must have been built from `route`; pass `None` for routes
    /// without a polyline to use the nearest-stop scan.
    pub fn update(
        &self,
        state: &EtaState,
        route: &Route,
        geometry: Option<&RouteGeometry>,
        position: &VehiclePosition,
        target: EtaTarget,
    ) -> Result<EtaUpdate, EtaSkip> {
        match state.updated_at {
            Some(last_update) if position.observed_at < last_update => {
                return Err(EtaSkip::Stale {
                    observed_at: position.observed_at,
                    last_update,
                });
            }
            _ => {}
        }
        position.coord.validate()?;

        match target {
            EtaTarget::Stop(i) if i >= route.stops().len() => {
                return Err(EtaSkip::TargetOutOfRange(i));
            }
            _ => {}
        }

        let progress = match geometry {
            Some(g) => along_polyline(g, position.coord, target)?,
            None => by_nearest_stop(route, position.coord, target)?,
        };

        let (previous, counter) = if state.measures(route.id(), target) {
            (state.smoothed_eta_secs, state.passed_counter)
        } else {
            (None, 0)
        };

        let raw = raw_eta_secs(progress.remaining_m, self.config.avg_speed_mps());
        let smoothed = smooth(previous, raw, self.config.smoothing_alpha);
        let counter = next_passed_counter(counter, smoothed, self.config.passed_threshold_secs);

        let next = EtaState {
            raw_eta_secs: Some(raw),
            smoothed_eta_secs: Some(smoothed),
            passed_counter: counter,
            updated_at: Some(position.observed_at),
            nearest_stop_index: Some(progress.nearest_stop_index),
            route_id: Some(route.id()),
            target: Some(target),
        };

        debug!(
            route = %route.id(),
            nearest = progress.nearest_stop_index,
            remaining_m = progress.remaining_m,
            raw,
            smoothed,
            counter,
            "ETA updated"
        );

        Ok(EtaUpdate {
            passed: next.has_passed(self.config.passed_confirmations),
            state: next,
            remaining_m: progress.remaining_m,
            status: ArrivalStatus::classify(progress.target_passed, smoothed),
        })
    }
}

fn along_polyline(
    geometry: &RouteGeometry,
    position: Coord,
    target: EtaTarget,
) -> Result<Progress, EtaSkip> {
    let located = geometry.locate(position).ok_or(EtaSkip::NoEvaluableStops)?;
    let nearest = located.nearest_stop_index;

    match target {
        EtaTarget::NearestStop => {
            let offset = geometry
                .stop_offset(nearest)
                .ok_or(EtaSkip::NoEvaluableStops)?;
            Ok(Progress {
                nearest_stop_index: nearest,
                remaining_m: (offset - located.distance_along_m).abs(),
                target_passed: false,
            })
        }
        EtaTarget::Stop(i) => {
            let offset = geometry
                .stop_offset(i)
                .ok_or(EtaSkip::TargetUnreachable(i))?;
            Ok(Progress {
                nearest_stop_index: nearest,
                remaining_m: (offset - located.distance_along_m).max(0.0),
                target_passed: nearest > i,
            })
        }
    }
}

/// Nearest stop by straight-line distance. Earlier stops win ties; stops
/// with malformed coordinates are skipped.
fn nearest_stop(route: &Route, position: Coord) -> Option<(usize, f64)> {
    let mut nearest: Option<(usize, f64)> = None;

    for (i, rs) in route.stops().iter().enumerate() {
        match checked_distance_meters(position, rs.stop.coord) {
            Ok(d) => {
                if nearest.is_none_or(|(_, best)| d < best) {
                    nearest = Some((i, d));
                }
            }
            Err(e) => {
                warn!(route = %route.id(), stop = %rs.stop.id, error = %e, "skipping stop");
            }
        }
    }

    nearest
}

fn by_nearest_stop(route: &Route, position: Coord, target: EtaTarget) -> Result<Progress, EtaSkip> {
    let (nearest, to_nearest_m) =
        nearest_stop(route, position).ok_or(EtaSkip::NoEvaluableStops)?;

    let target_idx = match target {
        EtaTarget::NearestStop => {
            return Ok(Progress {
                nearest_stop_index: nearest,
                remaining_m: to_nearest_m,
                target_passed: false,
            });
        }
        EtaTarget::Stop(i) => i,
    };

    if nearest > target_idx {
        return Ok(Progress {
            nearest_stop_index: nearest,
            remaining_m: 0.0,
            target_passed: true,
        });
    }
    if nearest == target_idx {
        return Ok(Progress {
            nearest_stop_index: nearest,
            remaining_m: to_nearest_m,
            target_passed: false,
        });
    }

    // Straight line to the nearest stop, then along the route to the target.
    let graph = route.stop_graph().map_err(|e| {
        warn!(route = %route.id(), error = %e, "cannot build stop graph");
        EtaSkip::TargetUnreachable(target_idx)
    })?;
    let stops = route.stops();
    let along = shortest_path(&graph, &stops[nearest].stop.id, &stops[target_idx].stop.id);
    if !along.is_found() {
        return Err(EtaSkip::TargetUnreachable(target_idx));
    }

    Ok(Progress {
        nearest_stop_index: nearest,
        remaining_m: to_nearest_m + along.distance,
        target_passed: false,
    })
}
