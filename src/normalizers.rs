//! Normalizers mapping a raw score triple to a bounded summary.
//!
//! A normalizer is a pure function of `(sxy, sxx, syy)`, the scores of the
//! pair, of the prediction with itself, and of the gold with itself.
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use regex::Regex;

use crate::errors::Result;
use crate::errors::SimatchError;
use crate::matching::Match;
use crate::matching::Matching;
use crate::metric::Metric;
use crate::value::Value;

/// Normalizers for raw similarity scores.
///
/// # Supported normalizers
///
/// | Normalizer | Repr. | Definition |
/// | ---------- | ----- | ---------- |
/// | [`Normalizer::None`] | `none`, `` | `sxy` |
/// | [`Normalizer::Precision`] | `precision`, `p` | `sxy / sxx` |
/// | [`Normalizer::Recall`] | `recall`, `r` | `sxy / syy` |
/// | [`Normalizer::Jaccard`] | `jaccard`, `j` | `sxy / (sxx + syy - sxy)` |
/// | [`Normalizer::FScore`] | `f1`, `f0.5`, `dice`, … | `(1 + β²)·sxy / (β²·syy + sxx)` |
///
/// # Conversion from/into string representation
///
/// ```rust
/// use simatch::Normalizer;
///
/// assert_eq!("precision".parse::<Normalizer>(), Ok(Normalizer::Precision));
/// assert_eq!("dice".parse::<Normalizer>(), Ok(Normalizer::FScore { beta: 1.0 }));
/// assert_eq!("f2".parse::<Normalizer>(), Ok(Normalizer::FScore { beta: 2.0 }));
/// assert!("f".parse::<Normalizer>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalizer {
    /// The identity: emits the raw `sxy` under an empty name.
    None,

    /// Ratio of the pair score to the prediction self-score.
    Precision,

    /// Ratio of the pair score to the gold self-score.
    Recall,

    /// Ratio of the pair score to the score mass of the union.
    Jaccard,

    /// Weighted harmonic mean of precision and recall; `beta` weighs recall.
    FScore {
        /// The recall weight. `beta = 1` is the balanced F1 (Dice) score.
        beta: f64,
    },
}

impl Normalizer {
    /// Maps the score triple to the normalized score.
    ///
    /// A zero denominator yields `0.0`: the pair shares nothing scoreable.
    pub fn normalize(&self, sxy: f64, sxx: f64, syy: f64) -> f64 {
        match *self {
            Self::None => sxy,
            Self::Precision => ratio(sxy, sxx),
            Self::Recall => ratio(sxy, syy),
            Self::Jaccard => ratio(sxy, sxx + syy - sxy),
            Self::FScore { beta } => {
                if sxy > 0.0 {
                    ratio((1.0 + beta * beta) * sxy, beta * beta * syy + sxx)
                } else {
                    0.0
                }
            }
        }
    }

    /// Returns the output name of the normalizer. The identity normalizer
    /// has the empty name.
    pub fn name(&self) -> String {
        match *self {
            Self::None => String::new(),
            Self::Precision => "precision".to_string(),
            Self::Recall => "recall".to_string(),
            Self::Jaccard => "jaccard".to_string(),
            Self::FScore { beta } => {
                if beta.fract() == 0.0 {
                    format!("f{}", beta as i64)
                } else {
                    format!("f{beta}")
                }
            }
        }
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

impl Display for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            _ => write!(f, "{}", self.name()),
        }
    }
}

impl FromStr for Normalizer {
    type Err = SimatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "none" => Ok(Self::None),
            "p" | "precision" => Ok(Self::Precision),
            "r" | "recall" => Ok(Self::Recall),
            "j" | "jaccard" => Ok(Self::Jaccard),
            "dice" | "f1" => Ok(Self::FScore { beta: 1.0 }),
            _ => {
                let re = Regex::new(r"^f(?<beta>\d+(\.\d+)?)$").unwrap();
                let caps = re.captures(s).ok_or_else(|| {
                    SimatchError::InvalidConfiguration(format!("Unknown normalizer: {s}"))
                })?;
                let beta = caps
                    .name("beta")
                    .unwrap()
                    .as_str()
                    .parse::<f64>()
                    .map_err(|_| {
                        SimatchError::InvalidConfiguration(format!("Unknown normalizer: {s}"))
                    })?;
                Ok(Self::FScore { beta })
            }
        }
    }
}

/// A metric wrapping another metric so that its root score is normalized.
///
/// The inner metric is computed once for the pair and once per side; the
/// root matches of the witness are replaced with the normalized score, and
/// all other matches pass through unchanged.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::sync::Arc;
/// use approx::assert_abs_diff_eq;
/// use simatch::matchers::SetMatchingMetric;
/// use simatch::{DiscreteMetric, MatchingKind, Metric, NormalizedMetric, Value};
///
/// let inner = SetMatchingMetric::new(Arc::new(DiscreteMetric), MatchingKind::OneToOne);
/// let f1 = NormalizedMetric::new(Arc::new(inner), "f1".parse()?);
///
/// let x = Value::set([Value::from(0), Value::from(1)]);
/// let y = Value::set([Value::from(1), Value::from(2), Value::from(3)]);
/// assert_abs_diff_eq!(f1.score(&x, &y)?, 0.4, epsilon = 1e-9);
/// assert_abs_diff_eq!(f1.score_self(&x)?, 1.0);
/// # Ok(())
/// # }
/// ```
pub struct NormalizedMetric {
    inner: Arc<dyn Metric>,
    normalizer: Normalizer,
}

impl NormalizedMetric {
    /// Wraps a metric with a normalizer.
    pub fn new(inner: Arc<dyn Metric>, normalizer: Normalizer) -> Self {
        Self { inner, normalizer }
    }
}

impl Metric for NormalizedMetric {
    fn compute(&self, x: &Value, y: &Value) -> Result<(f64, Matching)> {
        let (sxy, inner_matching) = self.inner.compute(x, y)?;
        let sxx = self.inner.score_self(x)?;
        let syy = self.inner.score_self(y)?;
        let normalized = self.normalizer.normalize(sxy, sxx, syy);
        let matches = inner_matching.into_iter().map(|m| {
            if m.is_root() {
                Match::at_root(x.clone(), y.clone(), normalized)
            } else {
                m
            }
        });
        Ok((normalized, Matching::new(matches)))
    }

    fn score_self(&self, _x: &Value) -> Result<f64> {
        Ok(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    #[case::empty("", Normalizer::None)]
    #[case::none("none", Normalizer::None)]
    #[case::precision("precision", Normalizer::Precision)]
    #[case::precision_short("p", Normalizer::Precision)]
    #[case::recall("recall", Normalizer::Recall)]
    #[case::recall_short("r", Normalizer::Recall)]
    #[case::jaccard("jaccard", Normalizer::Jaccard)]
    #[case::jaccard_short("j", Normalizer::Jaccard)]
    #[case::dice("dice", Normalizer::FScore { beta: 1.0 })]
    #[case::f1("f1", Normalizer::FScore { beta: 1.0 })]
    #[case::f2("f2", Normalizer::FScore { beta: 2.0 })]
    #[case::f05("f0.5", Normalizer::FScore { beta: 0.5 })]
    fn test_normalizer_from_str(#[case] input: &str, #[case] expected: Normalizer) {
        assert_eq!(input.parse::<Normalizer>(), Ok(expected));
    }

    #[rstest]
    #[case::bare_f("f")]
    #[case::unknown("accuracy")]
    #[case::trailing("f1x")]
    #[case::negative("f-1")]
    fn test_normalizer_from_str_invalid(#[case] input: &str) {
        assert!(matches!(
            input.parse::<Normalizer>(),
            Err(SimatchError::InvalidConfiguration(_))
        ));
    }

    #[rstest]
    #[case(Normalizer::FScore { beta: 1.0 }, "f1")]
    #[case(Normalizer::FScore { beta: 2.0 }, "f2")]
    #[case(Normalizer::FScore { beta: 0.5 }, "f0.5")]
    #[case(Normalizer::Precision, "precision")]
    fn test_normalizer_name(#[case] normalizer: Normalizer, #[case] expected: &str) {
        assert_eq!(normalizer.name(), expected);
    }

    #[test]
    fn test_normalizer_none_name_is_empty() {
        assert_eq!(Normalizer::None.name(), "");
        assert_eq!(format!("{}", Normalizer::None), "none");
    }

    #[rstest]
    #[case(Normalizer::None, 5.0)]
    #[case(Normalizer::Precision, 1.0)]
    #[case(Normalizer::Recall, 5.0 / 9.0)]
    #[case(Normalizer::Jaccard, 5.0 / 9.0)]
    #[case(Normalizer::FScore { beta: 1.0 }, 2.0 * 5.0 / 14.0)]
    #[case(Normalizer::FScore { beta: 0.5 }, 1.25 * 5.0 / (0.25 * 9.0 + 5.0))]
    #[case(Normalizer::FScore { beta: 2.0 }, 5.0 * 5.0 / (4.0 * 9.0 + 5.0))]
    fn test_normalize(#[case] normalizer: Normalizer, #[case] expected: f64) {
        assert_relative_eq!(normalizer.normalize(5.0, 5.0, 9.0), expected);
    }

    #[rstest]
    #[case(Normalizer::Precision)]
    #[case(Normalizer::Recall)]
    #[case(Normalizer::Jaccard)]
    #[case(Normalizer::FScore { beta: 1.0 })]
    fn test_normalize_zero_denominator(#[case] normalizer: Normalizer) {
        assert_relative_eq!(normalizer.normalize(0.0, 0.0, 0.0), 0.0);
    }
}
