//! Graph matching: align two directed graphs consistently with reachability.
use std::sync::Arc;

use crate::constraint::MatchingKind;
use crate::errors::Result;
use crate::errors::SimatchError;
use crate::graph::GraphValue;
use crate::matching::Matching;
use crate::metric::Metric;
use crate::solvers::ilp::IlpMatchingProblem;
use crate::value::Value;

/// A metric derived from the matching of two graphs (including trees and
/// DAGs).
///
/// Node pairs are weighed by the inner metric; the matching is solved as a
/// 0/1 program under the cardinality constraint plus reachability
/// monotonicity: two candidate pairs cannot both be selected when one side
/// can reach between its nodes and the other cannot.
pub struct GraphMatchingMetric {
    inner: Arc<dyn Metric>,
    kind: MatchingKind,
}

impl GraphMatchingMetric {
    /// Creates a graph matching metric from an inner metric and a
    /// constraint.
    pub fn new(inner: Arc<dyn Metric>, kind: MatchingKind) -> Self {
        Self { inner, kind }
    }
}

fn graph_of(value: &Value) -> Result<&GraphValue> {
    match value {
        Value::Graph(graph) => Ok(graph),
        _ => Err(SimatchError::TypeMismatch(format!(
            "Graph matching requires a graph value, but got {value:?}"
        ))),
    }
}

impl Metric for GraphMatchingMetric {
    fn compute(&self, x: &Value, y: &Value) -> Result<(f64, Matching)> {
        let gx = graph_of(x)?;
        let gy = graph_of(y)?;
        match (gx.nodes.is_empty(), gy.nodes.is_empty()) {
            (true, true) => return Ok((1.0, Matching::single_root(x.clone(), y.clone(), 1.0))),
            (true, false) | (false, true) => return Ok((0.0, Matching::empty())),
            _ => {}
        }
        let gram = self.inner.gram_matrix(&gx.nodes, &gy.nodes)?;
        let x_reach = gx.reachability_matrix();
        let y_reach = gy.reachability_matrix();
        let mut problem = IlpMatchingProblem::new(gram, 0, 0);
        problem.add_matching_constraint(self.kind);
        problem.add_monotonicity_constraint(&x_reach, &y_reach);
        let (score, triples) = problem.solve()?;
        Ok((
            score,
            Matching::from_index_triples(x, y, score, &gx.nodes, &gy.nodes, &triples),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::DiscreteMetric;
    use approx::assert_relative_eq;

    fn graph(nodes: &[i64], edges: &[(usize, usize)]) -> Value {
        Value::Graph(GraphValue::new(
            nodes.iter().copied().map(Value::from),
            edges.iter().copied(),
        ))
    }

    fn discrete() -> GraphMatchingMetric {
        GraphMatchingMetric::new(Arc::new(DiscreteMetric), MatchingKind::OneToOne)
    }

    #[test]
    fn test_identical_graphs() {
        let m = discrete();
        let g = graph(&[1, 2, 3], &[(0, 1), (1, 2)]);
        assert_relative_eq!(m.score(&g, &g).unwrap(), 3.0);
    }

    #[test]
    fn test_reversed_edge_limits_matching() {
        let m = discrete();
        // Same nodes, opposite edge orientation: matching both endpoints
        // would violate monotonicity, so only one node pair survives.
        let x = graph(&[1, 2], &[(0, 1)]);
        let y = graph(&[1, 2], &[(1, 0)]);
        assert_relative_eq!(m.score(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_edge_against_no_edge() {
        let m = discrete();
        let x = graph(&[1, 2], &[(0, 1)]);
        let y = graph(&[1, 2], &[]);
        assert_relative_eq!(m.score(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_chain_against_chain_with_extra_node() {
        let m = discrete();
        let x = graph(&[1, 2, 3], &[(0, 1), (1, 2)]);
        let y = graph(&[1, 2, 3, 4], &[(0, 1), (1, 2), (2, 3)]);
        assert_relative_eq!(m.score(&x, &y).unwrap(), 3.0);
    }

    #[test]
    fn test_empty_graphs() {
        let m = discrete();
        let empty = graph(&[], &[]);
        let g = graph(&[1], &[]);
        assert_relative_eq!(m.score(&empty, &empty).unwrap(), 1.0);
        assert_relative_eq!(m.score(&empty, &g).unwrap(), 0.0);
        assert_relative_eq!(m.score(&g, &empty).unwrap(), 0.0);
    }

    #[test]
    fn test_type_mismatch() {
        let m = discrete();
        assert!(matches!(
            m.score(&Value::from(1), &graph(&[1], &[])),
            Err(SimatchError::TypeMismatch(_))
        ));
    }
}
