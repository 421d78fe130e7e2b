//! Concurrent per-vehicle ETA tracking.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::estimator::{EtaEstimator, EtaSkip, EtaUpdate};
use super::state::{EtaState, EtaTarget, VehiclePosition};
use crate::cache::GeometryCache;
use crate::domain::{Route, VehicleId};

type Slot = Arc<Mutex<EtaState>>;

/// One position update to apply.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    pub vehicle: VehicleId,
    pub route: &'a Route,
    pub position: VehiclePosition,
    pub target: EtaTarget,
}

/// Holds ETA state for every tracked vehicle.
///
/// Updates for the same vehicle are applied one at a time in arrival order;
/// updates for different vehicles proceed in parallel. Cloning is cheap and
/// clones share state.
#[derive(Clone)]
pub struct VehicleTracker {
    estimator: EtaEstimator,
    geometry: GeometryCache,
    states: Arc<RwLock<HashMap<VehicleId, Slot>>>,
}

impl VehicleTracker {
    pub fn new(estimator: EtaEstimator, geometry: GeometryCache) -> Self {
        Self {
            estimator,
            geometry,
            states: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Apply a position update for `vehicle` on `route`.
    ///
    /// On a skip the stored state is left untouched. An update racing with
    /// [`stop_tracking`](Self::stop_tracking) lands in the fresh state that
    /// follows it.
    pub async fn observe(
        &self,
        vehicle: VehicleId,
        route: &Route,
        position: VehiclePosition,
        target: EtaTarget,
    ) -> Result<EtaUpdate, EtaSkip> {
        let geometry = self.geometry.geometry_for(route).await;

        let mut state = loop {
            let slot = self.slot(vehicle).await;
            let state = Arc::clone(&slot).lock_owned().await;
            // The slot may have been removed while we waited for its lock.
            if self.is_current(vehicle, &slot).await {
                break state;
            }
        };

        match self
            .estimator
            .update(&state, route, geometry.as_deref(), &position, target)
        {
            Ok(update) => {
                *state = update.state.clone();
                Ok(update)
            }
            Err(skip) => {
                debug!(vehicle = %vehicle, route = %route.id(), reason = %skip, "update skipped");
                Err(skip)
            }
        }
    }

    /// Apply a batch of updates concurrently. Results are returned in input
    /// order.
    pub async fn observe_many<'a>(
        &self,
        observations: impl IntoIterator<Item = Observation<'a>>,
    ) -> Vec<(VehicleId, Result<EtaUpdate, EtaSkip>)> {
        let futures = observations.into_iter().map(|o| async move {
            let result = self.observe(o.vehicle, o.route, o.position, o.target).await;
            (o.vehicle, result)
        });
        join_all(futures).await
    }

    /// Current state for a vehicle, if it is tracked.
    pub async fn snapshot(&self, vehicle: VehicleId) -> Option<EtaState> {
        let slot = self.states.read().await.get(&vehicle).cloned()?;
        let state = slot.lock().await;
        Some(state.clone())
    }

    /// Forget a vehicle. Its next update starts from an empty state.
    ///
    /// Returns whether the vehicle was tracked.
    pub async fn stop_tracking(&self, vehicle: VehicleId) -> bool {
        let removed = self.states.write().await.remove(&vehicle).is_some();
        if removed {
            debug!(vehicle = %vehicle, "stopped tracking");
        }
        removed
    }

    /// Get the number of tracked vehicles.
    pub async fn tracked_count(&self) -> usize {
        self.states.read().await.len()
    }

    async fn is_current(&self, vehicle: VehicleId, slot: &Slot) -> bool {
        self.states
            .read()
            .await
            .get(&vehicle)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    async fn slot(&self, vehicle: VehicleId) -> Slot {
        if let Some(slot) = self.states.read().await.get(&vehicle) {
            return Arc::clone(slot);
        }
        let mut guard = self.states.write().await;
        Arc::clone(guard.entry(vehicle).or_default())
    }
}

impl Default for VehicleTracker {
    fn default() -> Self {
        Self::new(EtaEstimator::default(), GeometryCache::default())
    }
}
