//! Route search over per-route stop graphs.
//!
//! Two searches are provided: weighted shortest path (Dijkstra) for
//! choosing routes and measuring along-route distance, and a cheap
//! unweighted reachability search for when only connectivity matters.
//!
//! "No answer" is data here, not an error: missing stops and unreachable
//! destinations come back as an infinite distance with an empty path.

mod bfs;
mod dijkstra;
mod graph;
mod select;


pub use bfs::{Adjacency, find_any_path};
pub use dijkstra::{ShortestPath, shortest_path};
pub use graph::{GraphError, StopGraph};
pub use select::{BestRoute, best_route_between, is_route_order_valid, plan_trip};
