//! Set matching: align two collections without regard to order.
use std::collections::HashMap;
use std::sync::Arc;

use crate::constraint::MatchingKind;
use crate::errors::Result;
use crate::errors::SimatchError;
use crate::matching::Match;
use crate::matching::Matching;
use crate::metric::Metric;
use crate::path::Path;
use crate::solvers::assignment::solve_assignment;
use crate::value::Value;

/// A metric derived from the matching of two sets.
///
/// Both empty scores 1; exactly one empty scores 0. A discrete inner metric
/// under the one-to-one constraint short-circuits to counting the distinct
/// common values; every other configuration builds the gram matrix and
/// solves the assignment problem for the constraint.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::sync::Arc;
/// use simatch::matchers::SetMatchingMetric;
/// use simatch::{DiscreteMetric, MatchingKind, Metric, Value};
///
/// let m = SetMatchingMetric::new(Arc::new(DiscreteMetric), MatchingKind::OneToOne);
/// let x = Value::set([1, 2, 2].map(Value::from));
/// let y = Value::set([1, 1, 1, 2].map(Value::from));
/// assert_eq!(m.score(&x, &y)?, 2.0);
/// # Ok(())
/// # }
/// ```
pub struct SetMatchingMetric {
    inner: Arc<dyn Metric>,
    kind: MatchingKind,
}

impl SetMatchingMetric {
    /// Creates a set matching metric from an inner metric and a constraint.
    pub fn new(inner: Arc<dyn Metric>, kind: MatchingKind) -> Self {
        Self { inner, kind }
    }
}

pub(crate) fn elements_of(value: &Value) -> Result<&[Value]> {
    value.as_elements().ok_or_else(|| {
        SimatchError::TypeMismatch(format!(
            "Collection matching requires a collection value, but got {value:?}"
        ))
    })
}

// Counts the distinct values common to both slices and pairs up their
// occurrence indices, in first-occurrence order on the prediction side.
fn discrete_intersection(xs: &[Value], ys: &[Value]) -> (f64, Vec<(usize, usize, f64)>) {
    let mut x_indices: HashMap<&Value, Vec<usize>> = HashMap::new();
    let mut x_order = Vec::new();
    for (i, u) in xs.iter().enumerate() {
        let slot = x_indices.entry(u).or_default();
        if slot.is_empty() {
            x_order.push(u);
        }
        slot.push(i);
    }
    let mut y_indices: HashMap<&Value, Vec<usize>> = HashMap::new();
    for (j, v) in ys.iter().enumerate() {
        y_indices.entry(v).or_default().push(j);
    }
    let mut score = 0.0;
    let mut triples = Vec::new();
    for u in x_order {
        if let Some(y_slots) = y_indices.get(u) {
            score += 1.0;
            for (&i, &j) in x_indices[u].iter().zip(y_slots) {
                triples.push((i, j, 1.0));
            }
        }
    }
    (score, triples)
}

impl Metric for SetMatchingMetric {
    fn compute(&self, x: &Value, y: &Value) -> Result<(f64, Matching)> {
        let xs = elements_of(x)?;
        let ys = elements_of(y)?;
        match (xs.is_empty(), ys.is_empty()) {
            (true, true) => return Ok((1.0, Matching::single_root(x.clone(), y.clone(), 1.0))),
            (true, false) | (false, true) => return Ok((0.0, Matching::empty())),
            _ => {}
        }
        if self.inner.is_discrete() && self.kind == MatchingKind::OneToOne {
            let (score, triples) = discrete_intersection(xs, ys);
            let mut matches = Vec::with_capacity(triples.len() + 1);
            matches.push(Match::at_root(x.clone(), y.clone(), score));
            for (i, j, s) in triples {
                matches.push(Match {
                    pred_path: Path::root().prepend(i),
                    pred: xs[i].clone(),
                    gold_path: Path::root().prepend(j),
                    gold: ys[j].clone(),
                    score: s,
                });
            }
            return Ok((score, Matching::new(matches)));
        }
        let gram = self.inner.gram_matrix(xs, ys)?;
        let (score, triples) = solve_assignment(&gram, self.kind);
        Ok((
            score,
            Matching::from_index_triples(x, y, score, xs, ys, &triples),
        ))
    }

    fn score_self(&self, x: &Value) -> Result<f64> {
        let xs = elements_of(x)?;
        if xs.is_empty() {
            return Ok(1.0);
        }
        match self.kind {
            MatchingKind::ManyToMany => {
                let gram = self.inner.gram_matrix(xs, xs)?;
                Ok(gram.iter().flatten().sum())
            }
            MatchingKind::OneToOne => {
                let mut total = 0.0;
                for u in xs {
                    total += self.inner.score_self(u)?;
                }
                Ok(total)
            }
            _ => self.score(x, x),
        }
    }
}
