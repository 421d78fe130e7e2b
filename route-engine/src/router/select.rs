//! Picking the best route between two stops.

use std::borrow::Borrow;
use std::hash::Hash;

use tracing::{debug, warn};

use super::dijkstra::shortest_path;
use super::graph::StopGraph;
use crate::domain::{Route, StopId};

/// The winning candidate of a cross-route search.
///
/// When no candidate connects the two stops, `route` is `None`, the
/// distance is infinite and the path is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct BestRoute<'a, R, N> {
    pub route: Option<&'a R>,
    pub distance: f64,
    pub path: Vec<N>,
}

impl<R, N> BestRoute<'_, R, N> {
    pub fn none() -> Self {
        Self {
            route: None,
            distance: f64::INFINITY,
            path: Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.route.is_some()
    }
}

/// Run a shortest-path search on every candidate graph containing both stops
/// and keep the strictly shortest. Earlier candidates win ties.
pub fn best_route_between<'a, R, N, G, I>(candidates: I, pickup: &N, dest: &N) -> BestRoute<'a, R, N>
where
    I: IntoIterator<Item = (&'a R, G)>,
    G: Borrow<StopGraph<N>>,
    N: Eq + Hash + Clone,
{
    let mut best = BestRoute::none();

    for (route, graph) in candidates {
        let graph = graph.borrow();
        if !graph.contains(pickup) || !graph.contains(dest) {
            continue;
        }

        let result = shortest_path(graph, pickup, dest);
        if result.distance < best.distance {
            best = BestRoute {
                route: Some(route),
                distance: result.distance,
                path: result.path,
            };
        }
    }

    best
}

/// True iff both stops are in `stops` and `pickup` comes strictly before
/// `dest`.
///
/// # Examples
///
/// ```
/// use route_engine::router::is_route_order_valid;
///
/// let stops = ["S1", "S2", "S3"];
/// assert!(is_route_order_valid(&stops, &"S1", &"S3"));
/// assert!(!is_route_order_valid(&stops, &"S2", &"S1"));
/// assert!(!is_route_order_valid(&stops, &"S2", &"S2"));
/// ```
pub fn is_route_order_valid<N: PartialEq>(stops: &[N], pickup: &N, dest: &N) -> bool {
    let pickup_idx = stops.iter().position(|s| s == pickup);
    let dest_idx = stops.iter().position(|s| s == dest);
    matches!((pickup_idx, dest_idx), (Some(p), Some(d)) if p < d)
}

/// Best route from `pickup` to `dest` among `routes`.
///
/// Routes whose stop order puts the destination before the pickup are
/// discarded before any graph is built.
pub fn plan_trip(routes: &[Route], pickup: StopId, dest: StopId) -> BestRoute<'_, Route, StopId> {
    let mut candidates = Vec::new();

    for route in routes {
        if !is_route_order_valid(&route.stop_ids(), &pickup, &dest) {
            debug!(route = %route.id(), %pickup, %dest, "route skipped: wrong stop order");
            continue;
        }
        match route.stop_graph() {
            Ok(graph) => candidates.push((route, graph)),
            Err(e) => {
                warn!(route = %route.id(), error = %e, "route skipped: bad stop graph");
            }
        }
    }

    let best = best_route_between(candidates, &pickup, &dest);
    match best.route {
        Some(route) => debug!(
            route = %route.id(),
            distance = best.distance,
            stops = best.path.len(),
            "best route chosen"
        ),
        None => debug!(%pickup, %dest, "no route connects stops"),
    }
    best
}
