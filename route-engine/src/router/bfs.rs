//! Unweighted reachability search.
//!
//! Answers "is there any connection from A to B" without paying for
//! weighted search. The returned path is whichever one the breadth-first
//! exploration discovers first; use [`shortest_path`](super::shortest_path)
//! when the distance matters.
//!
//! A node is marked visited only after all of its neighbours have been
//! enqueued, so a node can be enqueued more than once before it is expanded.
//! Expansion itself happens at most once per node.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

use super::graph::StopGraph;

/// Anything that can list a node's neighbours in a stable order.
pub trait Adjacency<N> {
    fn neighbours(&self, node: &N) -> Vec<N>;
}

impl<N: Eq + Hash + Clone> Adjacency<N> for StopGraph<N> {
    fn neighbours(&self, node: &N) -> Vec<N> {
        self.edges(node).iter().map(|(n, _)| n.clone()).collect()
    }
}

impl<N: Eq + Hash + Clone> Adjacency<N> for HashMap<N, Vec<N>> {
    fn neighbours(&self, node: &N) -> Vec<N> {
        self.get(node).cloned().unwrap_or_default()
    }
}

/// First path from `start` to `end` found by breadth-first exploration, or
/// an empty vector when `end` cannot be reached.
///
/// The search returns as soon as `end` is enqueued.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use route_engine::router::find_any_path;
///
/// let graph = HashMap::from([
///     ("A", vec!["B", "C"]),
///     ("B", vec!["D"]),
///     ("C", vec!["D"]),
/// ]);
///
/// assert_eq!(find_any_path(&graph, &"A", &"D"), vec!["A", "B", "D"]);
/// assert!(find_any_path(&graph, &"D", &"A").is_empty());
/// ```
pub fn find_any_path<N, G>(graph: &G, start: &N, end: &N) -> Vec<N>
where
    N: Eq + Hash + Clone,
    G: Adjacency<N>,
{
    if start == end {
        return vec![start.clone()];
    }

    let mut visited: HashSet<N> = HashSet::new();
    let mut queue: VecDeque<Vec<N>> = VecDeque::new();
    queue.push_back(vec![start.clone()]);

    while let Some(path) = queue.pop_front() {
        let Some(node) = path.last() else {
            continue;
        };
        if visited.contains(node) {
            continue;
        }

        for neighbour in graph.neighbours(node) {
            let mut next = path.clone();
            next.push(neighbour.clone());

            if &neighbour == end {
                return next;
            }
            queue.push_back(next);
        }
        visited.insert(node.clone());
    }

    Vec::new()
}
