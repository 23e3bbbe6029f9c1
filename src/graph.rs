//! Directed graphs over values and their reachability closure.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A directed graph whose nodes are values and whose edges are node-index
/// pairs.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphValue {
    /// Node values, indexed by position.
    pub nodes: Vec<Value>,

    /// Directed edges as `(from, to)` node indices.
    pub edges: Vec<(usize, usize)>,
}

impl GraphValue {
    /// Creates a graph from nodes and `(from, to)` index edges.
    pub fn new<N, E>(nodes: N, edges: E) -> Self
    where
        N: IntoIterator<Item = Value>,
        E: IntoIterator<Item = (usize, usize)>,
    {
        Self {
            nodes: nodes.into_iter().collect(),
            edges: edges.into_iter().collect(),
        }
    }

    /// Returns the adjacency matrix of the graph.
    pub fn adjacency_matrix(&self) -> Vec<Vec<bool>> {
        let n = self.nodes.len();
        let mut adj = vec![vec![false; n]; n];
        for &(from, to) in &self.edges {
            adj[from][to] = true;
        }
        adj
    }

    /// Returns the reachability matrix of the graph: the transitive closure
    /// of `I + A`, computed by repeated boolean squaring to a fixed point.
    pub fn reachability_matrix(&self) -> Vec<Vec<bool>> {
        let n = self.nodes.len();
        let mut reach = self.adjacency_matrix();
        for (i, row) in reach.iter_mut().enumerate() {
            row[i] = true;
        }
        loop {
            let squared = bool_matmul(&reach);
            if squared == reach {
                return reach;
            }
            reach = squared;
        }
    }
}

fn bool_matmul(m: &[Vec<bool>]) -> Vec<Vec<bool>> {
    let n = m.len();
    let mut out = vec![vec![false; n]; n];
    for i in 0..n {
        for k in 0..n {
            if m[i][k] {
                for j in 0..n {
                    out[i][j] |= m[k][j];
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> GraphValue {
        let nodes = (0..n as i64).map(Value::from);
        let edges = (1..n).map(|i| (i - 1, i));
        GraphValue::new(nodes, edges)
    }

    #[test]
    fn test_adjacency_matrix() {
        let graph = chain(3);
        assert_eq!(
            graph.adjacency_matrix(),
            vec![
                vec![false, true, false],
                vec![false, false, true],
                vec![false, false, false],
            ]
        );
    }

    #[test]
    fn test_reachability_matrix_chain() {
        let graph = chain(4);
        let reach = graph.reachability_matrix();
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(reach[i][j], i <= j, "reach[{i}][{j}]");
            }
        }
    }

    #[test]
    fn test_reachability_matrix_cycle() {
        let graph = GraphValue::new(
            (0..3).map(Value::from),
            [(0, 1), (1, 2), (2, 0)],
        );
        let reach = graph.reachability_matrix();
        assert!(reach.iter().all(|row| row.iter().all(|&r| r)));
    }

    #[test]
    fn test_reachability_matrix_empty() {
        let graph = GraphValue::new([], []);
        assert!(graph.reachability_matrix().is_empty());
    }
}
