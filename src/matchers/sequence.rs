//! Sequence matching: order-preserving alignment of two sequences.
use std::sync::Arc;

use crate::constraint::MatchingKind;
use crate::errors::Result;
use crate::matchers::set::elements_of;
use crate::matching::Matching;
use crate::metric::Metric;
use crate::value::Value;

/// A metric derived from the order-preserving alignment of two sequences.
///
/// The score is computed by dynamic programming over an
/// `(nx + 1) × (ny + 1)` table: a cell takes the best of aligning the
/// current elements or skipping either one, and the asymmetric constraints
/// additionally let one element cover a run on the other side. The witness
/// is empty.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::sync::Arc;
/// use simatch::matchers::SequenceMatchingMetric;
/// use simatch::{DiscreteMetric, MatchingKind, Metric, Value};
///
/// let m = SequenceMatchingMetric::new(Arc::new(DiscreteMetric), MatchingKind::OneToOne);
/// let x = Value::seq([1, 3, 2].map(Value::from));
/// let y = Value::seq([1, 2, 3].map(Value::from));
/// // Order matters: only one of 3, 2 can be kept in order next to 1.
/// assert_eq!(m.score(&x, &y)?, 2.0);
/// # Ok(())
/// # }
/// ```
pub struct SequenceMatchingMetric {
    inner: Arc<dyn Metric>,
    kind: MatchingKind,
}

impl SequenceMatchingMetric {
    /// Creates a sequence matching metric from an inner metric and a
    /// constraint.
    pub fn new(inner: Arc<dyn Metric>, kind: MatchingKind) -> Self {
        Self { inner, kind }
    }
}

impl Metric for SequenceMatchingMetric {
    fn compute(&self, x: &Value, y: &Value) -> Result<(f64, Matching)> {
        let xs = elements_of(x)?;
        let ys = elements_of(y)?;
        let gram = self.inner.gram_matrix(xs, ys)?;
        let nx = xs.len();
        let ny = ys.len();
        let mut f = vec![vec![0.0_f64; ny + 1]; nx + 1];
        for i in 1..=nx {
            for j in 1..=ny {
                let mut best = (f[i - 1][j - 1] + gram[i - 1][j - 1])
                    .max(f[i - 1][j])
                    .max(f[i][j - 1]);
                if matches!(
                    self.kind,
                    MatchingKind::OneToMany | MatchingKind::ManyToMany
                ) {
                    best = best.max(f[i][j - 1] + gram[i - 1][j - 1]);
                }
                if matches!(
                    self.kind,
                    MatchingKind::ManyToOne | MatchingKind::ManyToMany
                ) {
                    best = best.max(f[i - 1][j] + gram[i - 1][j - 1]);
                }
                f[i][j] = best;
            }
        }
        Ok((f[nx][ny], Matching::empty()))
    }

    fn score_self(&self, x: &Value) -> Result<f64> {
        if self.kind == MatchingKind::OneToOne {
            let xs = elements_of(x)?;
            let mut total = 0.0;
            for u in xs {
                total += self.inner.score_self(u)?;
            }
            Ok(total)
        } else {
            self.score(x, x)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::DiscreteMetric;
    use approx::assert_relative_eq;
    use rstest::*;

    fn ints(values: &[i64]) -> Value {
        Value::seq(values.iter().copied().map(Value::from))
    }

    fn discrete(kind: MatchingKind) -> SequenceMatchingMetric {
        SequenceMatchingMetric::new(Arc::new(DiscreteMetric), kind)
    }

    #[rstest]
    #[case::identical(&[1, 2, 3], &[1, 2, 3], 3.0)]
    #[case::swap(&[1, 3, 2], &[1, 2, 3], 2.0)]
    #[case::subsequence(&[1, 3], &[1, 2, 3], 2.0)]
    #[case::disjoint(&[4, 5], &[1, 2, 3], 0.0)]
    fn test_one_to_one_alignment(
        #[case] xs: &[i64],
        #[case] ys: &[i64],
        #[case] expected: f64,
    ) {
        let m = discrete(MatchingKind::OneToOne);
        assert_relative_eq!(m.score(&ints(xs), &ints(ys)).unwrap(), expected);
    }

    #[rstest]
    // One prediction element may cover a run of reference elements.
    #[case::one_to_many(MatchingKind::OneToMany, &[1, 2], &[1, 1, 2, 2], 4.0)]
    // And symmetrically for the reference side.
    #[case::many_to_one(MatchingKind::ManyToOne, &[1, 1, 2, 2], &[1, 2], 4.0)]
    #[case::many_to_many(MatchingKind::ManyToMany, &[1, 2], &[1, 1, 2, 2], 4.0)]
    fn test_asymmetric_alignment(
        #[case] kind: MatchingKind,
        #[case] xs: &[i64],
        #[case] ys: &[i64],
        #[case] expected: f64,
    ) {
        let m = discrete(kind);
        assert_relative_eq!(m.score(&ints(xs), &ints(ys)).unwrap(), expected);
    }

    #[test]
    fn test_one_to_one_does_not_reuse_elements() {
        let m = discrete(MatchingKind::OneToOne);
        assert_relative_eq!(m.score(&ints(&[1]), &ints(&[1, 1, 1])).unwrap(), 1.0);
    }

    #[test]
    fn test_score_self() {
        let m = discrete(MatchingKind::OneToOne);
        assert_relative_eq!(m.score_self(&ints(&[1, 2, 2])).unwrap(), 3.0);
        let m = discrete(MatchingKind::ManyToMany);
        // [1, 2, 2] against itself: the alignment stays order-monotone, so
        // only one off-diagonal cell of the 2-block can be added.
        assert_relative_eq!(m.score_self(&ints(&[1, 2, 2])).unwrap(), 4.0);
    }

    #[test]
    fn test_witness_is_empty() {
        let m = discrete(MatchingKind::OneToOne);
        let (_, matching) = m.compute(&ints(&[1, 2]), &ints(&[1, 2])).unwrap();
        assert!(matching.is_empty());
    }
}
