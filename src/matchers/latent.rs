//! Latent set matching: align collections whose elements reference
//! existentially-quantified variables.
use std::collections::HashMap;
use std::sync::Arc;

use crate::constraint::MatchingKind;
use crate::errors::Result;
use crate::errors::SimatchError;
use crate::matchers::set::elements_of;
use crate::matchers::set::SetMatchingMetric;
use crate::matching::Matching;
use crate::metric::Metric;
use crate::schema::Schema;
use crate::solvers::ilp::IlpMatchingProblem;
use crate::value::Value;
use crate::value::Variable;

/// A metric matching two collections of records while binding the variables
/// they reference.
///
/// Items are matched under the cardinality constraint; variables are bound
/// one-to-one on their own; and matching two items forces binding the
/// variables held in their corresponding record fields. The inner metric
/// weighs item pairs, typically treating variables as freely matching.
pub struct LatentSetMatchingMetric {
    // Field names of the element record type, checked for variable pairs.
    fields: Vec<String>,
    inner: Arc<dyn Metric>,
    kind: MatchingKind,
}

impl LatentSetMatchingMetric {
    /// Creates a latent set matching metric for elements of the given record
    /// schema.
    ///
    /// # Errors
    ///
    /// * [`SimatchError::TypeMismatch`] if the element schema is neither a
    ///   record nor the variable nominal.
    pub fn new(elem_schema: &Schema, inner: Arc<dyn Metric>, kind: MatchingKind) -> Result<Self> {
        let fields = match elem_schema {
            Schema::Variable => Vec::new(),
            _ => elem_schema
                .record_fields()
                .ok_or_else(|| {
                    SimatchError::TypeMismatch(format!(
                        "Latent set matching requires a record element type, but got {elem_schema:?}"
                    ))
                })?
                .into_iter()
                .map(str::to_string)
                .collect(),
        };
        Ok(Self {
            fields,
            inner,
            kind,
        })
    }

    // Implication quadruples: for every candidate item pair and every field
    // holding a variable on both sides, matching the items forces binding
    // the variables.
    fn implications(
        &self,
        xs: &[Value],
        ys: &[Value],
        gram: &[Vec<f64>],
        x_var_ids: &HashMap<Variable, usize>,
        y_var_ids: &HashMap<Variable, usize>,
    ) -> Vec<(usize, usize, usize, usize)> {
        let mut implications = Vec::new();
        for (i, a) in xs.iter().enumerate() {
            for (j, b) in ys.iter().enumerate() {
                if gram[i][j] <= 0.0 {
                    continue;
                }
                for field in &self.fields {
                    let a_field = a.as_record().and_then(|r| r.field(field));
                    let b_field = b.as_record().and_then(|r| r.field(field));
                    if let (Some(Value::Var(p)), Some(Value::Var(q))) = (a_field, b_field) {
                        implications.push((i, j, x_var_ids[p], y_var_ids[q]));
                    }
                }
            }
        }
        implications
    }
}

fn variable_ids(value: &Value) -> HashMap<Variable, usize> {
    value
        .variables()
        .into_iter()
        .enumerate()
        .map(|(i, var)| (var, i))
        .collect()
}

impl Metric for LatentSetMatchingMetric {
    fn compute(&self, x: &Value, y: &Value) -> Result<(f64, Matching)> {
        let xs = elements_of(x)?;
        let ys = elements_of(y)?;
        match (xs.is_empty(), ys.is_empty()) {
            (true, true) => return Ok((1.0, Matching::single_root(x.clone(), y.clone(), 1.0))),
            (true, false) | (false, true) => return Ok((0.0, Matching::empty())),
            _ => {}
        }
        let gram = self.inner.gram_matrix(xs, ys)?;
        let x_var_ids = variable_ids(x);
        let y_var_ids = variable_ids(y);
        let implications = self.implications(xs, ys, &gram, &x_var_ids, &y_var_ids);
        let mut problem = IlpMatchingProblem::new(gram, x_var_ids.len(), y_var_ids.len());
        problem.add_matching_constraint(self.kind);
        problem.add_variable_matching_constraint();
        problem.add_latent_variable_constraint(&implications);
        let (score, triples) = problem.solve()?;
        Ok((
            score,
            Matching::from_index_triples(x, y, score, xs, ys, &triples),
        ))
    }

    fn score_self(&self, x: &Value) -> Result<f64> {
        SetMatchingMetric::new(Arc::clone(&self.inner), self.kind).score_self(x)
    }
}
