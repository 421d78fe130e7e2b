//! Weighted stop graph.

use std::collections::HashMap;
use std::hash::Hash;

use crate::domain::StopId;

/// Error returned when an edge weight cannot be used for shortest-path search.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("edge weight {0} is negative")]
    NegativeWeight(f64),

    #[error("edge weight {0} is not finite")]
    NonFiniteWeight(f64),
}

/// Directed graph over the stops of one route.
///
/// Each node maps to its outgoing edges in insertion order. Weights are
/// validated on insertion, so every graph that exists has finite,
/// non-negative weights and Dijkstra is correct over it.
#[derive(Debug, Clone)]
pub struct StopGraph<N = StopId> {
    adjacency: HashMap<N, Vec<(N, f64)>>,
}

impl<N> Default for StopGraph<N> {
    fn default() -> Self {
        Self {
            adjacency: HashMap::new(),
        }
    }
}

impl<N: Eq + Hash + Clone> StopGraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an adjacency mapping, rejecting bad weights.
    ///
    /// Neighbours that have no entry of their own become nodes without
    /// outgoing edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use route_engine::router::StopGraph;
    ///
    /// let graph = StopGraph::from_adjacency([
    ///     ("A", vec![("B", 1.0), ("C", 4.0)]),
    ///     ("B", vec![("C", 1.0)]),
    /// ])
    /// .unwrap();
    /// assert_eq!(graph.len(), 3);
    ///
    /// assert!(StopGraph::from_adjacency([("A", vec![("B", -1.0)])]).is_err());
    /// ```
    pub fn from_adjacency<I>(adjacency: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (N, Vec<(N, f64)>)>,
    {
        let mut graph = Self::new();
        for (node, edges) in adjacency {
            graph.add_node(node.clone());
            for (to, weight) in edges {
                graph.add_edge(node.clone(), to, weight)?;
            }
        }
        Ok(graph)
    }

    /// Add a node with no edges. Existing nodes are left untouched.
    pub fn add_node(&mut self, node: N) {
        self.adjacency.entry(node).or_default();
    }

    /// Add a directed edge, creating either endpoint if needed.
    pub fn add_edge(&mut self, from: N, to: N, weight: f64) -> Result<(), GraphError> {
        if !weight.is_finite() {
            return Err(GraphError::NonFiniteWeight(weight));
        }
        if weight < 0.0 {
            return Err(GraphError::NegativeWeight(weight));
        }
        self.add_node(to.clone());
        self.adjacency.entry(from).or_default().push((to, weight));
        Ok(())
    }

    pub fn contains(&self, node: &N) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Outgoing edges of `node`, in insertion order. Unknown nodes have none.
    pub fn edges(&self, node: &N) -> &[(N, f64)] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.adjacency.keys()
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}
