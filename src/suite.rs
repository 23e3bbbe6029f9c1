//! Metric suites: metric families evaluated together over one stream.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::matching::Hooks;
use crate::metric::Metric;
use crate::reduction::join_names;
use crate::reduction::ExtraFn;
use crate::reduction::Reduction;
use crate::state::SingleMetricState;
use crate::value::Value;

/// A composite of one or more metric families sharing the update/reset/
/// compute interface.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::sync::Arc;
/// use approx::assert_abs_diff_eq;
/// use simatch::matchers::SetMatchingMetric;
/// use simatch::{DiscreteMetric, MatchingKind, MetricSuite, Reduction, Value};
///
/// let metric = Arc::new(SetMatchingMetric::new(
///     Arc::new(DiscreteMetric),
///     MatchingKind::OneToOne,
/// ));
/// let suite = MetricSuite::family(
///     metric,
///     Reduction::micro_average([
///         "precision".parse()?,
///         "recall".parse()?,
///         "f1".parse()?,
///     ]),
/// );
///
/// let mut agg = suite.aggregator(None);
/// agg.update_single(
///     &Value::set([0, 1].map(Value::from)),
///     &Value::set([0, 1, 2, 3].map(Value::from)),
/// )?;
/// let scores = agg.compute();
/// assert_abs_diff_eq!(scores["precision"], 1.0);
/// assert_abs_diff_eq!(scores["recall"], 0.5);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub enum MetricSuite {
    /// One metric and one reduction sharing a single state.
    Family {
        /// The metric evaluated per sample.
        metric: Arc<dyn Metric>,

        /// The reduction producing the aggregate scores.
        reduction: Reduction,
    },

    /// Named sub-suites with separate states; score names are prefix-joined.
    Multiple(Vec<(String, MetricSuite)>),

    /// A suite followed by a function deriving extra entries.
    WithExtra {
        /// The underlying suite.
        inner: Box<MetricSuite>,

        /// Derives extra entries from the computed scores.
        extra: ExtraFn,
    },
}

impl MetricSuite {
    /// Builds a single metric family.
    pub fn family(metric: Arc<dyn Metric>, reduction: Reduction) -> Self {
        Self::Family { metric, reduction }
    }

    /// Builds a suite of named sub-suites.
    pub fn multiple<I, S>(suites: I) -> Self
    where
        I: IntoIterator<Item = (S, MetricSuite)>,
        S: Into<String>,
    {
        Self::Multiple(
            suites
                .into_iter()
                .map(|(name, suite)| (name.into(), suite))
                .collect(),
        )
    }

    /// Equips this suite with a function deriving extra entries.
    pub fn with_extra<F>(self, extra: F) -> Self
    where
        F: Fn(&BTreeMap<String, f64>) -> BTreeMap<String, f64> + Send + Sync + 'static,
    {
        Self::WithExtra {
            inner: Box::new(self),
            extra: Arc::new(extra),
        }
    }

    /// Creates an aggregator with fresh states for this suite, optionally
    /// observing matchings through hooks.
    pub fn aggregator<'a>(&self, hooks: Option<Hooks<'a>>) -> Aggregator<'a> {
        Aggregator {
            node: AggregatorNode::for_suite(self),
            hooks,
        }
    }
}

/// Owns the per-family states of one evaluation stream and routes updates
/// across them.
pub struct Aggregator<'a> {
    node: AggregatorNode,
    hooks: Option<Hooks<'a>>,
}

enum AggregatorNode {
    Family {
        state: SingleMetricState,
        reduction: Reduction,
    },
    Multiple(Vec<(String, AggregatorNode)>),
    WithExtra {
        inner: Box<AggregatorNode>,
        extra: ExtraFn,
    },
}

impl AggregatorNode {
    fn for_suite(suite: &MetricSuite) -> Self {
        match suite {
            MetricSuite::Family { metric, reduction } => Self::Family {
                state: SingleMetricState::new(Arc::clone(metric)),
                reduction: reduction.clone(),
            },
            MetricSuite::Multiple(suites) => Self::Multiple(
                suites
                    .iter()
                    .map(|(name, suite)| (name.clone(), Self::for_suite(suite)))
                    .collect(),
            ),
            MetricSuite::WithExtra { inner, extra } => Self::WithExtra {
                inner: Box::new(Self::for_suite(inner)),
                extra: Arc::clone(extra),
            },
        }
    }

    fn update_single(
        &mut self,
        pred: &Value,
        gold: &Value,
        mut hooks: Option<&mut Hooks<'_>>,
    ) -> Result<()> {
        match self {
            Self::Family { state, .. } => state.update_single(pred, gold, hooks),
            Self::Multiple(nodes) => {
                for (_, node) in nodes {
                    node.update_single(pred, gold, hooks.as_deref_mut())?;
                }
                Ok(())
            }
            Self::WithExtra { inner, .. } => inner.update_single(pred, gold, hooks),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Family { state, .. } => state.reset(),
            Self::Multiple(nodes) => {
                for (_, node) in nodes {
                    node.reset();
                }
            }
            Self::WithExtra { inner, .. } => inner.reset(),
        }
    }

    fn compute(&self) -> BTreeMap<String, f64> {
        match self {
            Self::Family { state, reduction } => reduction.compute(state),
            Self::Multiple(nodes) => {
                let mut joined = BTreeMap::new();
                for (prefix, node) in nodes {
                    for (name, value) in node.compute() {
                        joined.insert(join_names(prefix, &name), value);
                    }
                }
                joined
            }
            Self::WithExtra { inner, extra } => {
                let mut scores = inner.compute();
                scores.extend(extra(&scores));
                scores
            }
        }
    }
}

impl Aggregator<'_> {
    /// Scores one prediction/gold pair into every family's state.
    pub fn update_single(&mut self, pred: &Value, gold: &Value) -> Result<()> {
        self.node.update_single(pred, gold, self.hooks.as_mut())
    }

    /// Scores a batch of pairs in order.
    ///
    /// # Errors
    ///
    /// * [`crate::errors::SimatchError::InvalidConfiguration`] if the inputs
    ///   have different lengths.
    pub fn update_batch(&mut self, preds: &[Value], golds: &[Value]) -> Result<()> {
        if preds.len() != golds.len() {
            return Err(crate::errors::SimatchError::InvalidConfiguration(format!(
                "Batch inputs must have equal lengths, but got {} predictions and {} golds",
                preds.len(),
                golds.len()
            )));
        }
        for (pred, gold) in preds.iter().zip(golds) {
            self.update_single(pred, gold)?;
        }
        Ok(())
    }

    /// Resets every family's state.
    pub fn reset(&mut self) {
        self.node.reset();
    }

    /// Computes the aggregate scores of every family, prefix-joined, with
    /// extras merged last.
    pub fn compute(&self) -> BTreeMap<String, f64> {
        self.node.compute()
    }
}
