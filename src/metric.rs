//! The metric capability and its structural combinators.
//!
//! A [`Metric`] scores a pair of values and explains the score with a
//! [`Matching`] witness. Metrics compose by structure: products over record
//! fields, unions over case types, preprocessing, discrete equality.
//! Collection-shaped composition lives in [`crate::matchers`].
use std::sync::Arc;

use crate::errors::Result;
use crate::errors::SimatchError;
use crate::matching::Matching;
use crate::schema::Schema;
use crate::value::Value;

/// A similarity function between pairs of values.
///
/// Implementors are immutable and reentrant: a metric is constructed once
/// and shared across many evaluations.
pub trait Metric: Send + Sync {
    /// Scores two values and produces the matching witness.
    fn compute(&self, x: &Value, y: &Value) -> Result<(f64, Matching)>;

    /// Scores a value against itself.
    ///
    /// Returns the same value as `compute(x, x)` but may take a fast path.
    fn score_self(&self, x: &Value) -> Result<f64> {
        Ok(self.compute(x, x)?.0)
    }

    /// Scores two values, discarding the witness.
    fn score(&self, x: &Value, y: &Value) -> Result<f64> {
        Ok(self.compute(x, y)?.0)
    }

    /// Computes the dense table of pairwise scores.
    fn gram_matrix(&self, xs: &[Value], ys: &[Value]) -> Result<Vec<Vec<f64>>> {
        xs.iter()
            .map(|x| ys.iter().map(|y| self.score(x, y)).collect())
            .collect()
    }

    /// Returns true for the discrete equality metric, enabling counting fast
    /// paths in collection matching.
    fn is_discrete(&self) -> bool {
        false
    }
}

/// Creates a metric from a binary scoring function.
pub fn from_fn<F>(f: F) -> Arc<dyn Metric>
where
    F: Fn(&Value, &Value) -> f64 + Send + Sync + 'static,
{
    Arc::new(FromFnMetric::new(f))
}

/// A metric wrapped from a function. The witness is a single root match.
pub struct FromFnMetric<F> {
    f: F,
}

impl<F> FromFnMetric<F>
where
    F: Fn(&Value, &Value) -> f64 + Send + Sync,
{
    /// Creates a metric from a binary scoring function.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Metric for FromFnMetric<F>
where
    F: Fn(&Value, &Value) -> f64 + Send + Sync,
{
    fn compute(&self, x: &Value, y: &Value) -> Result<(f64, Matching)> {
        let score = (self.f)(x, y);
        Ok((score, Matching::single_root(x.clone(), y.clone(), score)))
    }
}

/// A preprocessing function applied to one side of a comparison.
pub type PreFn = dyn Fn(&Value) -> Value + Send + Sync;

/// A metric contramapped by preprocessing functions, optionally asymmetric
/// between the prediction and gold sides.
pub struct ContramappedMetric {
    inner: Arc<dyn Metric>,
    pred_fn: Arc<PreFn>,
    gold_fn: Arc<PreFn>,
}

impl ContramappedMetric {
    /// Preprocesses both sides with the same function.
    pub fn new<F>(inner: Arc<dyn Metric>, f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        let f: Arc<PreFn> = Arc::new(f);
        Self {
            inner,
            pred_fn: Arc::clone(&f),
            gold_fn: f,
        }
    }

    /// Preprocesses the prediction and gold sides with distinct functions.
    pub fn asymmetric<F, G>(inner: Arc<dyn Metric>, pred_fn: F, gold_fn: G) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
        G: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self {
            inner,
            pred_fn: Arc::new(pred_fn),
            gold_fn: Arc::new(gold_fn),
        }
    }
}

impl Metric for ContramappedMetric {
    fn compute(&self, x: &Value, y: &Value) -> Result<(f64, Matching)> {
        self.inner.compute(&(self.pred_fn)(x), &(self.gold_fn)(y))
    }

    fn score_self(&self, x: &Value) -> Result<f64> {
        self.inner.score_self(&(self.pred_fn)(x))
    }
}

/// The discrete equality metric: 1 if the values are equal, 0 otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscreteMetric;

impl Metric for DiscreteMetric {
    fn compute(&self, x: &Value, y: &Value) -> Result<(f64, Matching)> {
        if x == y {
            Ok((1.0, Matching::single_root(x.clone(), y.clone(), 1.0)))
        } else {
            Ok((0.0, Matching::empty()))
        }
    }

    fn score_self(&self, _x: &Value) -> Result<f64> {
        Ok(1.0)
    }

    fn is_discrete(&self) -> bool {
        true
    }
}

/// The multiplicative combination of per-field metrics on a record type.
///
/// The score is the product of the field scores, so a zero on any field
/// zeroes the whole product. The witness is a root match carrying the
/// product, followed by every field's sub-matches with the field name
/// prepended to their paths.
pub struct ProductMetric {
    field_metrics: Vec<(String, Arc<dyn Metric>)>,
}

impl ProductMetric {
    /// Creates a product metric over the given field metrics. The field set
    /// is fixed at construction.
    pub fn new<I, F>(field_metrics: I) -> Self
    where
        I: IntoIterator<Item = (F, Arc<dyn Metric>)>,
        F: Into<String>,
    {
        Self {
            field_metrics: field_metrics
                .into_iter()
                .map(|(name, metric)| (name.into(), metric))
                .collect(),
        }
    }

    fn record_field<'a>(value: &'a Value, field: &str) -> Result<&'a Value> {
        let record = value.as_record().ok_or_else(|| {
            SimatchError::TypeMismatch(format!(
                "Product metric requires a record value, but got {value:?}"
            ))
        })?;
        record.field(field).ok_or_else(|| {
            SimatchError::TypeMismatch(format!(
                "Record {} has no field {field}",
                record.type_name
            ))
        })
    }
}

impl Metric for ProductMetric {
    fn compute(&self, x: &Value, y: &Value) -> Result<(f64, Matching)> {
        let mut product = 1.0;
        let mut matches = Vec::new();
        for (field, metric) in &self.field_metrics {
            let x_field = Self::record_field(x, field)?;
            let y_field = Self::record_field(y, field)?;
            let (score, matching) = metric.compute(x_field, y_field)?;
            product *= score;
            for mut m in matching {
                m.pred_path = m.pred_path.prepend(field.as_str());
                m.gold_path = m.gold_path.prepend(field.as_str());
                matches.push(m);
            }
        }
        let mut all = Vec::with_capacity(matches.len() + 1);
        all.push(crate::matching::Match::at_root(x.clone(), y.clone(), product));
        all.extend(matches);
        Ok((product, Matching::new(all)))
    }

    fn score_self(&self, x: &Value) -> Result<f64> {
        let mut product = 1.0;
        for (field, metric) in &self.field_metrics {
            product *= metric.score_self(Self::record_field(x, field)?)?;
        }
        Ok(product)
    }
}

/// A metric over a closed set of case types, discriminating at runtime.
///
/// Values falling in different cases score 0; values of the same case are
/// delegated to that case's metric.
pub struct UnionMetric {
    case_metrics: Vec<(Schema, Arc<dyn Metric>)>,
}

impl UnionMetric {
    /// Creates a union metric over `(case schema, metric)` pairs.
    pub fn new<I>(case_metrics: I) -> Self
    where
        I: IntoIterator<Item = (Schema, Arc<dyn Metric>)>,
    {
        Self {
            case_metrics: case_metrics.into_iter().collect(),
        }
    }

    fn case_of(&self, value: &Value) -> Result<usize> {
        self.case_metrics
            .iter()
            .position(|(schema, _)| schema.admits(value))
            .ok_or_else(|| {
                SimatchError::TypeMismatch(format!("Value fits no case of the union: {value:?}"))
            })
    }
}

impl Metric for UnionMetric {
    fn compute(&self, x: &Value, y: &Value) -> Result<(f64, Matching)> {
        let x_case = self.case_of(x)?;
        let y_case = self.case_of(y)?;
        if x_case != y_case {
            return Ok((0.0, Matching::empty()));
        }
        self.case_metrics[x_case].1.compute(x, y)
    }

    fn score_self(&self, _x: &Value) -> Result<f64> {
        Ok(1.0)
    }
}

/// The metric attached to the variable nominal: constantly 1.
///
/// Variables match freely on their own; binding consistency is enforced by
/// the latent matching constraints, not here.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableMetric;

impl Metric for VariableMetric {
    fn compute(&self, x: &Value, y: &Value) -> Result<(f64, Matching)> {
        Ok((1.0, Matching::single_root(x.clone(), y.clone(), 1.0)))
    }

    fn score_self(&self, _x: &Value) -> Result<f64> {
        Ok(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mention(left: i64, right: i64) -> Value {
        Value::record(
            "Mention",
            [("left", Value::from(left)), ("right", Value::from(right))],
        )
    }

    #[test]
    fn test_discrete_metric() {
        let m = DiscreteMetric;
        assert_relative_eq!(m.score(&Value::from(1), &Value::from(1)).unwrap(), 1.0);
        assert_relative_eq!(m.score(&Value::from(1), &Value::from(2)).unwrap(), 0.0);
        assert_relative_eq!(m.score_self(&Value::from(7)).unwrap(), 1.0);
        assert!(m.is_discrete());
        let (_, matching) = m.compute(&Value::from(1), &Value::from(1)).unwrap();
        assert_eq!(matching.len(), 1);
        assert!(matching.matches()[0].is_root());
    }

    #[test]
    fn test_from_fn_metric() {
        let m = from_fn(|x, y| {
            let (Value::Int(a), Value::Int(b)) = (x, y) else {
                return 0.0;
            };
            if (a - b).abs() <= 1 {
                1.0
            } else {
                0.0
            }
        });
        assert_relative_eq!(m.score(&Value::from(3), &Value::from(4)).unwrap(), 1.0);
        assert_relative_eq!(m.score(&Value::from(3), &Value::from(5)).unwrap(), 0.0);
    }

    #[test]
    fn test_contramapped_metric() {
        let first_field = |value: &Value| {
            value
                .as_record()
                .and_then(|record| record.field("left"))
                .cloned()
                .unwrap_or(Value::Int(0))
        };
        let m = ContramappedMetric::new(Arc::new(DiscreteMetric), first_field);
        assert_relative_eq!(m.score(&mention(1, 2), &mention(1, 9)).unwrap(), 1.0);
        assert_relative_eq!(m.score(&mention(1, 2), &mention(2, 2)).unwrap(), 0.0);
        assert_relative_eq!(m.score_self(&mention(1, 2)).unwrap(), 1.0);
    }

    #[test]
    fn test_product_metric() {
        let m = ProductMetric::new([
            ("left", Arc::new(DiscreteMetric) as Arc<dyn Metric>),
            ("right", Arc::new(DiscreteMetric) as Arc<dyn Metric>),
        ]);
        assert_relative_eq!(m.score(&mention(1, 2), &mention(1, 2)).unwrap(), 1.0);
        assert_relative_eq!(m.score(&mention(1, 2), &mention(1, 3)).unwrap(), 0.0);
        assert_relative_eq!(m.score_self(&mention(1, 2)).unwrap(), 1.0);

        let (score, matching) = m.compute(&mention(1, 2), &mention(1, 2)).unwrap();
        assert_relative_eq!(score, 1.0);
        assert!(matching.matches()[0].is_root());
        let paths: Vec<String> = matching
            .iter()
            .map(|m| format!("{}", m.pred_path))
            .collect();
        assert_eq!(paths, vec!["@", "left", "right"]);
    }

    #[test]
    fn test_product_metric_type_mismatch() {
        let m = ProductMetric::new([("left", Arc::new(DiscreteMetric) as Arc<dyn Metric>)]);
        assert!(matches!(
            m.score(&Value::from(1), &Value::from(1)),
            Err(SimatchError::TypeMismatch(_))
        ));
        assert!(matches!(
            m.score(&mention(1, 2), &Value::record("Mention", [("l", Value::from(1))])),
            Err(SimatchError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_union_metric() {
        let m = UnionMetric::new([
            (
                Schema::Variable,
                Arc::new(VariableMetric) as Arc<dyn Metric>,
            ),
            (Schema::Atom, Arc::new(DiscreteMetric) as Arc<dyn Metric>),
        ]);
        // Same case: delegate.
        assert_relative_eq!(m.score(&Value::from("a"), &Value::from("a")).unwrap(), 1.0);
        assert_relative_eq!(m.score(&Value::from("a"), &Value::from("b")).unwrap(), 0.0);
        assert_relative_eq!(m.score(&Value::var("a"), &Value::var("z")).unwrap(), 1.0);
        // Different cases score zero.
        assert_relative_eq!(m.score(&Value::var("a"), &Value::from("a")).unwrap(), 0.0);
        assert_relative_eq!(m.score_self(&Value::from("a")).unwrap(), 1.0);
    }

    #[test]
    fn test_union_metric_no_case() {
        let m = UnionMetric::new([(Schema::Atom, Arc::new(DiscreteMetric) as Arc<dyn Metric>)]);
        assert!(matches!(
            m.score(&Value::set([]), &Value::from(1)),
            Err(SimatchError::TypeMismatch(_))
        ));
    }
}
