//! Reductions from a metric state to a dictionary of aggregate scores.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::normalizers::Normalizer;
use crate::state::SingleMetricState;

/// A function merging extra derived entries into a computed score map.
pub type ExtraFn =
    Arc<dyn Fn(&BTreeMap<String, f64>) -> BTreeMap<String, f64> + Send + Sync>;

/// Describes how the per-sample score triples are reduced to aggregate
/// scores. Pure and stateless.
#[derive(Clone)]
pub enum Reduction {
    /// Sum the triples over all samples, then normalize once.
    MicroAverage(Vec<Normalizer>),

    /// Normalize each sample, then average per normalizer.
    MacroAverage(Vec<Normalizer>),

    /// Several reductions over the same state, with prefixed names.
    Multiple(Vec<(String, Reduction)>),

    /// A reduction followed by a function deriving extra entries.
    WithExtra {
        /// The underlying reduction.
        inner: Box<Reduction>,

        /// Derives extra entries from the computed scores; the results are
        /// merged in, overwriting on collision.
        extra: ExtraFn,
    },
}

impl Reduction {
    /// Builds a micro-average reduction over normalizers.
    pub fn micro_average<I: IntoIterator<Item = Normalizer>>(normalizers: I) -> Self {
        Self::MicroAverage(normalizers.into_iter().collect())
    }

    /// Builds a macro-average reduction over normalizers.
    pub fn macro_average<I: IntoIterator<Item = Normalizer>>(normalizers: I) -> Self {
        Self::MacroAverage(normalizers.into_iter().collect())
    }

    /// Builds a reduction running several reductions with prefixed names.
    pub fn multiple<I, S>(reductions: I) -> Self
    where
        I: IntoIterator<Item = (S, Reduction)>,
        S: Into<String>,
    {
        Self::Multiple(
            reductions
                .into_iter()
                .map(|(name, reduction)| (name.into(), reduction))
                .collect(),
        )
    }

    /// Equips this reduction with a function deriving extra entries.
    pub fn with_extra<F>(self, extra: F) -> Self
    where
        F: Fn(&BTreeMap<String, f64>) -> BTreeMap<String, f64> + Send + Sync + 'static,
    {
        Self::WithExtra {
            inner: Box::new(self),
            extra: Arc::new(extra),
        }
    }

    /// Computes the aggregate scores from a state.
    pub fn compute(&self, state: &SingleMetricState) -> BTreeMap<String, f64> {
        match self {
            Self::MicroAverage(normalizers) => {
                let sxy: f64 = state.matches().iter().sum();
                let sxx: f64 = state.preds().iter().sum();
                let syy: f64 = state.golds().iter().sum();
                normalized_entries(normalizers, sxy, sxx, syy)
            }
            Self::MacroAverage(normalizers) => {
                let n = state.len();
                let mut totals: BTreeMap<String, f64> = normalizers
                    .iter()
                    .map(|normalizer| (normalizer.name(), 0.0))
                    .collect();
                for i in 0..n {
                    let sample = normalized_entries(
                        normalizers,
                        state.matches()[i],
                        state.preds()[i],
                        state.golds()[i],
                    );
                    for (name, value) in sample {
                        *totals.get_mut(&name).expect("sample keys match") += value;
                    }
                }
                if n > 0 {
                    for value in totals.values_mut() {
                        *value /= n as f64;
                    }
                }
                totals
            }
            Self::Multiple(reductions) => {
                let mut joined = BTreeMap::new();
                for (prefix, reduction) in reductions {
                    for (name, value) in reduction.compute(state) {
                        joined.insert(join_names(prefix, &name), value);
                    }
                }
                joined
            }
            Self::WithExtra { inner, extra } => {
                let mut scores = inner.compute(state);
                scores.extend(extra(&scores));
                scores
            }
        }
    }
}

fn normalized_entries(
    normalizers: &[Normalizer],
    sxy: f64,
    sxx: f64,
    syy: f64,
) -> BTreeMap<String, f64> {
    normalizers
        .iter()
        .map(|normalizer| (normalizer.name(), normalizer.normalize(sxy, sxx, syy)))
        .collect()
}

/// Joins a prefix and a sub-name; empty sub-names keep the bare prefix.
pub(crate) fn join_names(prefix: &str, name: &str) -> String {
    if name.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}-{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::MatchingKind;
    use crate::matchers::SetMatchingMetric;
    use crate::metric::DiscreteMetric;
    use crate::value::Value;
    use approx::assert_relative_eq;
    use maplit::btreemap;

    fn ints(values: &[i64]) -> Value {
        Value::set(values.iter().copied().map(Value::from))
    }

    fn filled_state() -> SingleMetricState {
        let metric = std::sync::Arc::new(SetMatchingMetric::new(
            std::sync::Arc::new(DiscreteMetric),
            MatchingKind::OneToOne,
        ));
        let mut state = SingleMetricState::new(metric);
        let preds = [ints(&[0, 1]), ints(&[2]), ints(&[1, 2])];
        let golds = [ints(&[0, 1, 2, 3]), ints(&[2, 3]), ints(&[1, 2, 3])];
        state.update_batch(&preds, &golds, None).unwrap();
        state
    }

    fn normalizers() -> Vec<Normalizer> {
        ["precision", "recall", "f1"]
            .map(|s| s.parse::<Normalizer>().unwrap())
            .to_vec()
    }

    #[test]
    fn test_micro_average() {
        let scores = Reduction::micro_average(normalizers()).compute(&filled_state());
        assert_relative_eq!(scores["precision"], 1.0);
        assert_relative_eq!(scores["recall"], 5.0 / 9.0);
        assert_relative_eq!(scores["f1"], 10.0 / 14.0);
    }

    #[test]
    fn test_macro_average() {
        let scores = Reduction::macro_average(normalizers()).compute(&filled_state());
        assert_relative_eq!(scores["precision"], 1.0);
        assert_relative_eq!(scores["recall"], (0.5 + 0.5 + 2.0 / 3.0) / 3.0);
        assert_relative_eq!(scores["f1"], (2.0 / 3.0 + 2.0 / 3.0 + 0.8) / 3.0);
    }

    #[test]
    fn test_identity_normalizer_emits_empty_key() {
        let scores =
            Reduction::micro_average([Normalizer::None]).compute(&filled_state());
        assert_relative_eq!(scores[""], 5.0);
    }

    #[test]
    fn test_multiple_reductions_prefix_names() {
        let reduction = Reduction::multiple([
            ("micro", Reduction::micro_average([Normalizer::Precision])),
            ("raw", Reduction::micro_average([Normalizer::None])),
        ]);
        let scores = reduction.compute(&filled_state());
        assert_eq!(
            scores.keys().collect::<Vec<_>>(),
            vec!["micro-precision", "raw"]
        );
    }

    #[test]
    fn test_with_extra_merges_entries() {
        let reduction = Reduction::micro_average([Normalizer::Precision, Normalizer::Recall])
            .with_extra(|scores| {
                btreemap! {
                    "sum".to_string() => scores["precision"] + scores["recall"],
                }
            });
        let scores = reduction.compute(&filled_state());
        assert_relative_eq!(scores["sum"], 1.0 + 5.0 / 9.0);
    }

    #[test]
    fn test_empty_state_reduces_to_zeros() {
        let metric = std::sync::Arc::new(DiscreteMetric);
        let state = SingleMetricState::new(metric);
        let micro = Reduction::micro_average([Normalizer::Precision]).compute(&state);
        assert_relative_eq!(micro["precision"], 0.0);
        let macro_ = Reduction::macro_average([Normalizer::Precision]).compute(&state);
        assert_relative_eq!(macro_["precision"], 0.0);
    }
}
