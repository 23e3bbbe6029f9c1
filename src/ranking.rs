//! Metrics over ranked lists and their per-cutoff normalizers.
//!
//! A ranked-list metric compares two rankings (descending order assumed) and
//! produces a vector of cumulative matched mass, one entry per cutoff `k`.
//! Ranking normalizers then map the cumulative triple to `precision@k` /
//! `recall@k` vectors or to an average-precision scalar.
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::Result;
use crate::errors::SimatchError;
use crate::matching::Matching;
use crate::metric::Metric;
use crate::solvers::assignment::IterativeMatching;
use crate::value::Value;

/// The result of a ranking normalizer: a value per cutoff, or one scalar
/// summary.
#[derive(Debug, Clone, PartialEq)]
pub enum RankedScore {
    /// One scalar summary over the whole ranking.
    Scalar(f64),

    /// One value per cutoff `k`.
    Vector(Vec<f64>),
}

/// A metric derived from the ranking of a set of objects.
///
/// The weighted constructor attaches a weight to every element; the weight
/// scales the element's contribution to the matched mass (it is *not* the
/// ranking score). The plain entry points weigh every element 1.
pub struct RankedListMetric {
    inner: Arc<dyn Metric>,
    max_k: usize,
}

impl RankedListMetric {
    /// Creates a ranked-list metric evaluating cutoffs `1..=max_k`.
    pub fn new(inner: Arc<dyn Metric>, max_k: usize) -> Self {
        Self { inner, max_k }
    }

    /// Compares two rankings, returning the best cumulative matched mass at
    /// each cutoff. The witness is empty.
    pub fn compute(&self, x: &[Value], y: &[Value]) -> Result<(Vec<f64>, Matching)> {
        let x: Vec<(Value, f64)> = x.iter().map(|u| (u.clone(), 1.0)).collect();
        let y: Vec<(Value, f64)> = y.iter().map(|v| (v.clone(), 1.0)).collect();
        self.compute_weighted(&x, &y)
    }

    /// Compares two weighted rankings.
    pub fn compute_weighted(
        &self,
        x: &[(Value, f64)],
        y: &[(Value, f64)],
    ) -> Result<(Vec<f64>, Matching)> {
        let x_trunc = &x[..x.len().min(self.max_k)];
        let mut cumulative = vec![0.0; self.max_k];
        if self.inner.is_discrete() {
            let y_weights: HashMap<&Value, f64> =
                y.iter().map(|(v, w)| (v, *w)).collect();
            let mut total = 0.0;
            for (k, slot) in cumulative.iter_mut().enumerate() {
                if let Some((u, u_weight)) = x_trunc.get(k) {
                    total += y_weights.get(u).copied().unwrap_or(0.0) * u_weight;
                }
                *slot = total;
            }
        } else {
            let xs: Vec<Value> = x_trunc.iter().map(|(u, _)| u.clone()).collect();
            let ys: Vec<Value> = y.iter().map(|(v, _)| v.clone()).collect();
            let mut gram = self.inner.gram_matrix(&xs, &ys)?;
            for (i, row) in gram.iter_mut().enumerate() {
                for (j, cell) in row.iter_mut().enumerate() {
                    *cell *= x_trunc[i].1 * y[j].1;
                }
            }
            for (k, (total, _)) in IterativeMatching::new(&gram).enumerate() {
                cumulative[k] = total;
            }
            // Cutoffs past the truncated prediction length repeat the value
            // at the last prediction slot. When the reference side is the
            // shorter one, the slots between the two lengths stay zero; see
            // the tail-behavior note in DESIGN.md.
            if !x_trunc.is_empty() {
                let carry = cumulative[x_trunc.len() - 1];
                for slot in cumulative.iter_mut().skip(x_trunc.len()) {
                    *slot = carry;
                }
            }
        }
        Ok((cumulative, Matching::empty()))
    }

    /// Cumulative self-mass of a ranking at each cutoff.
    pub fn score_self(&self, x: &[Value]) -> Result<Vec<f64>> {
        let x: Vec<(Value, f64)> = x.iter().map(|u| (u.clone(), 1.0)).collect();
        self.score_self_weighted(&x)
    }

    /// Cumulative self-mass of a weighted ranking at each cutoff. Weights
    /// enter squared, once per side.
    pub fn score_self_weighted(&self, x: &[(Value, f64)]) -> Result<Vec<f64>> {
        let x_trunc = &x[..x.len().min(self.max_k)];
        let mut cumulative = vec![0.0; self.max_k];
        let mut total = 0.0;
        for (k, slot) in cumulative.iter_mut().enumerate() {
            if let Some((u, w)) = x_trunc.get(k) {
                total += self.inner.score_self(u)? * w * w;
            }
            *slot = total;
        }
        Ok(cumulative)
    }
}

/// Normalizers over cumulative ranking triples.
///
/// # Conversion from string representation
///
/// ```rust
/// use simatch::ranking::RankingNormalizer;
///
/// assert_eq!("p@k".parse::<RankingNormalizer>(), Ok(RankingNormalizer::PrecisionAtK));
/// assert_eq!("recall@k".parse::<RankingNormalizer>(), Ok(RankingNormalizer::RecallAtK));
/// assert!("p@".parse::<RankingNormalizer>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankingNormalizer {
    /// Matched mass over prediction self-mass, per cutoff.
    PrecisionAtK,

    /// Matched mass over total gold mass, per cutoff.
    RecallAtK,

    /// Mass-weighted average of precision at the cutoffs where new matched
    /// mass arrives, over the total gold mass.
    RankingAp,
}

impl RankingNormalizer {
    /// Maps the cumulative triple to the normalized result.
    pub fn normalize(&self, sxy: &[f64], sxx: &[f64], syy: &[f64]) -> RankedScore {
        let gold_total = syy.last().copied().unwrap_or(0.0);
        match self {
            Self::PrecisionAtK => RankedScore::Vector(
                sxy.iter()
                    .zip(sxx)
                    .map(|(&xy, &xx)| safe_ratio(xy, xx))
                    .collect(),
            ),
            Self::RecallAtK => RankedScore::Vector(
                sxy.iter().map(|&xy| safe_ratio(xy, gold_total)).collect(),
            ),
            Self::RankingAp => {
                let mut ap = 0.0;
                let mut prev = 0.0;
                for (k, &xy) in sxy.iter().enumerate() {
                    let gain = xy - prev;
                    if gain > 0.0 {
                        ap += gain * safe_ratio(xy, sxx[k]);
                    }
                    prev = xy;
                }
                RankedScore::Scalar(safe_ratio(ap, gold_total))
            }
        }
    }
}

fn safe_ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

impl Display for RankingNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::PrecisionAtK => write!(f, "precision@k"),
            Self::RecallAtK => write!(f, "recall@k"),
            Self::RankingAp => write!(f, "ranking_ap"),
        }
    }
}

impl FromStr for RankingNormalizer {
    type Err = SimatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "p@k" | "precision@k" => Ok(Self::PrecisionAtK),
            "r@k" | "recall@k" => Ok(Self::RecallAtK),
            "ranking_ap" => Ok(Self::RankingAp),
            _ => Err(SimatchError::InvalidConfiguration(format!(
                "Unknown ranking normalizer: {s}"
            ))),
        }
    }
}
