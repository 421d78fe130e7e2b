//! Per-vehicle ETA state and arrival classification.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Coord, RouteId};

/// A raw GPS fix for one vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehiclePosition {
    pub coord: Coord,
    pub observed_at: DateTime<Utc>,
}

impl VehiclePosition {
    pub fn new(coord: Coord, observed_at: DateTime<Utc>) -> Self {
        Self { coord, observed_at }
    }
}

/// ETA state carried between position updates for one vehicle.
///
/// Starts empty. Each successful update produces a new state from the
/// previous one; nothing else mutates it. Smoothing and the passed counter
/// only carry over between updates measured on the same route to the same
/// target.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EtaState {
    /// Unsmoothed ETA from the latest update, in seconds (at least 1).
    pub raw_eta_secs: Option<f64>,

    /// Exponentially smoothed ETA in seconds. `None` until the first update.
    pub smoothed_eta_secs: Option<f64>,

    /// Consecutive updates whose smoothed ETA was at or below the passed
    /// threshold.
    pub passed_counter: u32,

    /// Observation time of the latest applied update.
    pub updated_at: Option<DateTime<Utc>>,

    /// Index (in route order) of the stop nearest the vehicle.
    pub nearest_stop_index: Option<usize>,

    /// Route the latest update was measured on.
    pub route_id: Option<RouteId>,

    /// Target the latest update was measured to.
    pub target: Option<EtaTarget>,
}

impl EtaState {
    /// Whether the counter has reached `confirmations` consecutive
    /// at-threshold updates.
    pub fn has_passed(&self, confirmations: u32) -> bool {
        self.passed_counter >= confirmations
    }

    /// Whether this state was measured on `route` to `target`.
    pub fn measures(&self, route: RouteId, target: EtaTarget) -> bool {
        self.route_id == Some(route) && self.target == Some(target)
    }
}

/// What the ETA is measured to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EtaTarget {
    /// Whichever stop is currently nearest the vehicle.
    #[default]
    NearestStop,

    /// A specific stop, by index in route order (e.g. a pickup point).
    Stop(usize),
}

/// Display classification of a vehicle relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalStatus {
    /// The vehicle is already beyond the target stop.
    Passed,
    /// Two minutes or less away.
    ArrivingSoon,
    /// Ten minutes or less away.
    Catchable,
    Far,
}

impl ArrivalStatus {
    pub fn classify(target_passed: bool, eta_secs: f64) -> Self {
        if target_passed {
            return ArrivalStatus::Passed;
        }
        match eta_minutes(eta_secs) {
            0..=2 => ArrivalStatus::ArrivingSoon,
            3..=10 => ArrivalStatus::Catchable,
            _ => ArrivalStatus::Far,
        }
    }
}

/// Whole minutes for display, never less than one.
pub fn eta_minutes(eta_secs: f64) -> u32 {
    let mins = (eta_secs / 60.0).floor();
    if mins.is_nan() || mins < 1.0 {
        1
    } else if mins >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        mins as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_empty() {
        let state = EtaState::default();
        assert_eq!(state.raw_eta_secs, None);
        assert_eq!(state.smoothed_eta_secs, None);
        assert_eq!(state.passed_counter, 0);
        assert_eq!(state.updated_at, None);
        assert_eq!(state.nearest_stop_index, None);
        assert!(!state.has_passed(1));
        assert!(state.has_passed(0));
    }

    #[test]
    fn eta_minutes_floors_with_minimum_one() {
        assert_eq!(eta_minutes(0.0), 1);
        assert_eq!(eta_minutes(59.0), 1);
        assert_eq!(eta_minutes(179.0), 2);
        assert_eq!(eta_minutes(600.0), 10);
        assert_eq!(eta_minutes(f64::NAN), 1);
    }

    #[test]
    fn classify() {
        assert_eq!(ArrivalStatus::classify(true, 10.0), ArrivalStatus::Passed);
        assert_eq!(ArrivalStatus::classify(false, 30.0), ArrivalStatus::ArrivingSoon);
        assert_eq!(ArrivalStatus::classify(false, 179.0), ArrivalStatus::ArrivingSoon);
        assert_eq!(ArrivalStatus::classify(false, 180.0), ArrivalStatus::Catchable);
        assert_eq!(ArrivalStatus::classify(false, 659.0), ArrivalStatus::Catchable);
        assert_eq!(ArrivalStatus::classify(false, 660.0), ArrivalStatus::Far);
    }

    #[test]
    fn measures_route_and_target() {
        let state = EtaState {
            route_id: Some(RouteId(1)),
            target: Some(EtaTarget::Stop(2)),
            ..EtaState::default()
        };
        assert!(state.measures(RouteId(1), EtaTarget::Stop(2)));
        assert!(!state.measures(RouteId(1), EtaTarget::NearestStop));
        assert!(!state.measures(RouteId(2), EtaTarget::Stop(2)));
        assert!(!EtaState::default().measures(RouteId(1), EtaTarget::NearestStop));
    }

    #[test]
    fn state_serializes() {
        use chrono::TimeZone;

        let state = EtaState {
            raw_eta_secs: Some(12.0),
            smoothed_eta_secs: Some(15.5),
            passed_counter: 1,
            updated_at: Some(Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap()),
            nearest_stop_index: Some(2),
            route_id: Some(RouteId(4)),
            target: Some(EtaTarget::Stop(3)),
        };
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["updated_at"], "2024-03-15T08:00:00Z");
        assert_eq!(json["route_id"], 4);
        assert_eq!(json["target"], serde_json::json!({"stop": 3}));
        assert_eq!(
            serde_json::to_value(EtaTarget::NearestStop).unwrap(),
            "nearest_stop"
        );
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ArrivalStatus::ArrivingSoon).unwrap(),
            "\"arriving_soon\""
        );
    }
}
