//! Per-sample state of an evaluation stream.
use std::sync::Arc;

use crate::errors::Result;
use crate::errors::SimatchError;
use crate::matching::Hooks;
use crate::metric::Metric;
use crate::value::Value;

/// The running record of one evaluation stream: for every prediction/gold
/// pair seen so far, the self-scores of both sides and the pair score.
///
/// The three sequences always have the same length.
pub struct SingleMetricState {
    metric: Arc<dyn Metric>,
    preds: Vec<f64>,
    golds: Vec<f64>,
    matches: Vec<f64>,
}

impl SingleMetricState {
    /// Creates an empty state for a metric.
    pub fn new(metric: Arc<dyn Metric>) -> Self {
        Self {
            metric,
            preds: Vec::new(),
            golds: Vec::new(),
            matches: Vec::new(),
        }
    }

    /// Scores one prediction/gold pair and appends the triple. When hooks
    /// are given, the matching witness is replayed through them with the
    /// current sample index as the data id.
    pub fn update_single(
        &mut self,
        pred: &Value,
        gold: &Value,
        hooks: Option<&mut Hooks<'_>>,
    ) -> Result<()> {
        let sxx = self.metric.score_self(pred)?;
        let syy = self.metric.score_self(gold)?;
        let (sxy, matching) = self.metric.compute(pred, gold)?;
        if let Some(hooks) = hooks {
            matching.run_with_hooks(hooks, self.len());
        }
        self.preds.push(sxx);
        self.golds.push(syy);
        self.matches.push(sxy);
        Ok(())
    }

    /// Scores a batch of pairs in order.
    ///
    /// # Errors
    ///
    /// * [`SimatchError::InvalidConfiguration`] if the inputs have different
    ///   lengths. Lengths are checked up front, so the state is untouched on
    ///   this error.
    pub fn update_batch(
        &mut self,
        preds: &[Value],
        golds: &[Value],
        mut hooks: Option<&mut Hooks<'_>>,
    ) -> Result<()> {
        if preds.len() != golds.len() {
            return Err(SimatchError::InvalidConfiguration(format!(
                "Batch inputs must have equal lengths, but got {} predictions and {} golds",
                preds.len(),
                golds.len()
            )));
        }
        for (pred, gold) in preds.iter().zip(golds) {
            self.update_single(pred, gold, hooks.as_deref_mut())?;
        }
        Ok(())
    }

    /// Clears the state.
    pub fn reset(&mut self) {
        self.preds.clear();
        self.golds.clear();
        self.matches.clear();
    }

    /// Returns the number of pairs aggregated.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Returns true if no pairs were aggregated.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Per-sample prediction self-scores.
    pub fn preds(&self) -> &[f64] {
        &self.preds
    }

    /// Per-sample gold self-scores.
    pub fn golds(&self) -> &[f64] {
        &self.golds
    }

    /// Per-sample pair scores.
    pub fn matches(&self) -> &[f64] {
        &self.matches
    }
}
