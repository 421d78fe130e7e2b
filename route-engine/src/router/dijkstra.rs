//! Dijkstra shortest path over a stop graph.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::hash::Hash;

use super::graph::StopGraph;

/// Result of a shortest-path query.
///
/// "Not found" and "unreachable" are both encoded as an infinite distance
/// with an empty path.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath<N> {
    pub distance: f64,
    pub path: Vec<N>,
}

impl<N> ShortestPath<N> {
    pub fn unreachable() -> Self {
        Self {
            distance: f64::INFINITY,
            path: Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.distance.is_finite() && !self.path.is_empty()
    }
}

/// Heap entry ordered by tentative distance, then by push order, so equal
/// distances pop first-in first-out.
struct QueueEntry<N> {
    distance: f64,
    seq: u64,
    node: N,
}

impl<N> PartialEq for QueueEntry<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N> Eq for QueueEntry<N> {}

impl<N> PartialOrd for QueueEntry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N> Ord for QueueEntry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Shortest path from `start` to `end`.
///
/// A node is finalised when it is popped with its best distance; the search
/// stops as soon as `end` is finalised.
///
/// # Examples
///
/// ```
/// use route_engine::router::{StopGraph, shortest_path};
///
/// let graph = StopGraph::from_adjacency([
///     ("A", vec![("B", 1.0), ("C", 4.0)]),
///     ("B", vec![("C", 1.0)]),
///     ("C", vec![]),
/// ])
/// .unwrap();
///
/// let result = shortest_path(&graph, &"A", &"C");
/// assert_eq!(result.distance, 2.0);
/// assert_eq!(result.path, vec!["A", "B", "C"]);
/// ```
pub fn shortest_path<N>(graph: &StopGraph<N>, start: &N, end: &N) -> ShortestPath<N>
where
    N: Eq + Hash + Clone,
{
    if !graph.contains(start) || !graph.contains(end) {
        return ShortestPath::unreachable();
    }

    if start == end {
        return ShortestPath {
            distance: 0.0,
            path: vec![start.clone()],
        };
    }

    let mut distances: HashMap<N, f64> = HashMap::new();
    let mut previous: HashMap<N, N> = HashMap::new();
    let mut visited: HashSet<N> = HashSet::new();
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    distances.insert(start.clone(), 0.0);
    heap.push(Reverse(QueueEntry {
        distance: 0.0,
        seq,
        node: start.clone(),
    }));

    while let Some(Reverse(QueueEntry { distance, node, .. })) = heap.pop() {
        if !visited.insert(node.clone()) {
            continue;
        }

        if &node == end {
            break;
        }

        for (neighbour, weight) in graph.edges(&node) {
            let candidate = distance + weight;
            let best = distances.get(neighbour).copied().unwrap_or(f64::INFINITY);

            if candidate < best {
                distances.insert(neighbour.clone(), candidate);
                previous.insert(neighbour.clone(), node.clone());
                seq += 1;
                heap.push(Reverse(QueueEntry {
                    distance: candidate,
                    seq,
                    node: neighbour.clone(),
                }));
            }
        }
    }

    let Some(&distance) = distances.get(end) else {
        return ShortestPath::unreachable();
    };

    // Walk predecessors back from the destination. A chain longer than the
    // graph means the predecessor map is inconsistent.
    let mut path = vec![end.clone()];
    let mut current = end;
    while let Some(prev) = previous.get(current) {
        if path.len() > graph.len() {
            return ShortestPath::unreachable();
        }
        path.push(prev.clone());
        current = prev;
    }
    path.reverse();

    if path.first() != Some(start) {
        return ShortestPath::unreachable();
    }

    ShortestPath { distance, path }
}
