//! Deriving a composite metric from a structural type description.
use std::sync::Arc;

use crate::constraint::MatchingKind;
use crate::errors::Result;
use crate::errors::SimatchError;
use crate::matchers::LatentSetMatchingMetric;
use crate::matchers::SetMatchingMetric;
use crate::metric::DiscreteMetric;
use crate::metric::Metric;
use crate::metric::ProductMetric;
use crate::metric::UnionMetric;
use crate::metric::VariableMetric;
use crate::schema::Schema;

/// Derives a metric from a structural type description under a matching
/// constraint.
///
/// The rules apply in order: an annotated schema uses its attached metric; a
/// record derives a product over its fields; a union derives a case
/// discriminator; a collection derives a latent set matching when its
/// element type may contain variables and a plain set matching otherwise; the
/// variable nominal matches freely; an atom compares by equality.
///
/// # Errors
///
/// * [`SimatchError::UnderivableType`] if no rule applies (e.g. a union with
///   no cases).
/// * [`SimatchError::TypeMismatch`] if a collection element type containing
///   variables is not a record.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use simatch::{derive_metric, MatchingKind, Metric, Schema, Value};
///
/// let mention = Schema::record("Mention", [("left", Schema::Atom), ("right", Schema::Atom)]);
/// let mentions = Schema::collection(mention);
/// let m = derive_metric(&mentions, MatchingKind::OneToOne)?;
///
/// let span = |l: i64, r: i64| {
///     Value::record("Mention", [("left", Value::from(l)), ("right", Value::from(r))])
/// };
/// let x = Value::set([span(0, 1), span(2, 3)]);
/// let y = Value::set([span(2, 3), span(4, 5)]);
/// assert_eq!(m.score(&x, &y)?, 1.0);
/// # Ok(())
/// # }
/// ```
pub fn derive_metric(schema: &Schema, kind: MatchingKind) -> Result<Arc<dyn Metric>> {
    match schema {
        Schema::Annotated { metric, .. } => Ok(Arc::clone(metric)),
        Schema::Record { fields, .. } => {
            let mut field_metrics = Vec::with_capacity(fields.len());
            for (name, field_schema) in fields {
                field_metrics.push((name.clone(), derive_metric(field_schema, kind)?));
            }
            Ok(Arc::new(ProductMetric::new(field_metrics)))
        }
        Schema::Union(cases) => {
            if cases.is_empty() {
                return Err(SimatchError::UnderivableType(
                    "Cannot derive a metric from a union with no cases".to_string(),
                ));
            }
            let mut case_metrics = Vec::with_capacity(cases.len());
            for case in cases {
                case_metrics.push((case.clone(), derive_metric(case, kind)?));
            }
            Ok(Arc::new(UnionMetric::new(case_metrics)))
        }
        Schema::Collection(elem) => {
            let inner = derive_metric(elem, kind)?;
            if elem.may_contain_variable() {
                Ok(Arc::new(LatentSetMatchingMetric::new(elem, inner, kind)?))
            } else {
                Ok(Arc::new(SetMatchingMetric::new(inner, kind)))
            }
        }
        Schema::Variable => Ok(Arc::new(VariableMetric)),
        Schema::Atom => Ok(Arc::new(DiscreteMetric)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::from_fn;
    use crate::normalizers::NormalizedMetric;
    use crate::value::Value;
    use approx::assert_abs_diff_eq;
    use approx::assert_relative_eq;

    fn amr_schema() -> Schema {
        Schema::record(
            "Amr",
            [(
                "props",
                Schema::collection(Schema::record(
                    "Prop",
                    [
                        ("subj", Schema::Variable),
                        ("pred", Schema::Atom),
                        ("obj", Schema::union([Schema::Variable, Schema::Atom])),
                    ],
                )),
            )],
        )
    }

    fn prop(subj: &str, pred: &str, obj: Value) -> Value {
        Value::record(
            "Prop",
            [
                ("subj", Value::var(subj)),
                ("pred", Value::from(pred)),
                ("obj", obj),
            ],
        )
    }

    fn amr(props: Vec<Value>) -> Value {
        Value::record("Amr", [("props", Value::set(props))])
    }

    #[test]
    fn test_derive_atom_is_discrete() {
        let m = derive_metric(&Schema::Atom, MatchingKind::OneToOne).unwrap();
        assert_relative_eq!(m.score(&Value::from(1), &Value::from(1)).unwrap(), 1.0);
        assert_relative_eq!(m.score(&Value::from(1), &Value::from(2)).unwrap(), 0.0);
        assert!(m.is_discrete());
    }

    #[test]
    fn test_derive_annotated_uses_attached_metric() {
        let attached = from_fn(|_, _| 0.25);
        let schema = Schema::annotated(Schema::Atom, attached);
        let m = derive_metric(&schema, MatchingKind::OneToOne).unwrap();
        assert_relative_eq!(m.score(&Value::from(1), &Value::from(2)).unwrap(), 0.25);
    }

    #[test]
    fn test_derive_empty_union_fails() {
        let err = match derive_metric(&Schema::union([]), MatchingKind::OneToOne) {
            Err(e) => e,
            Ok(_) => panic!("expected derive_metric to fail on an empty union"),
        };
        assert!(matches!(err, SimatchError::UnderivableType(_)));
    }

    #[test]
    fn test_derive_collection_with_variables_is_latent() {
        // Two AMR-shaped inputs from Cai and Knight (2013): the derived
        // metric under F1 normalization reproduces the Smatch score.
        let m = derive_metric(&amr_schema(), MatchingKind::OneToOne).unwrap();
        let smatch = NormalizedMetric::new(m, "f1".parse().unwrap());

        let x = amr(vec![
            prop("a", "instance", Value::from("want-01")),
            prop("b", "instance", Value::from("boy")),
            prop("c", "instance", Value::from("go-01")),
            prop("a", "ARG0", Value::var("b")),
            prop("a", "ARG1", Value::var("c")),
            prop("c", "ARG0", Value::var("b")),
        ]);
        let y = amr(vec![
            prop("x", "instance", Value::from("want-01")),
            prop("y", "instance", Value::from("boy")),
            prop("z", "instance", Value::from("football")),
            prop("x", "ARG0", Value::var("y")),
            prop("x", "ARG1", Value::var("z")),
        ]);

        assert_abs_diff_eq!(smatch.score(&x, &y).unwrap(), 0.73, epsilon = 0.01);
        assert_abs_diff_eq!(smatch.score_self(&x).unwrap(), 1.0);
    }

    #[test]
    fn test_derived_metric_is_symmetric_for_one_to_one() {
        let m = derive_metric(&amr_schema(), MatchingKind::OneToOne).unwrap();
        let x = amr(vec![
            prop("a", "instance", Value::from("boy")),
            prop("b", "instance", Value::from("girl")),
            prop("a", "ARG0", Value::var("b")),
        ]);
        let y = amr(vec![
            prop("u", "instance", Value::from("boy")),
            prop("v", "instance", Value::from("want-01")),
        ]);
        assert_relative_eq!(m.score(&x, &y).unwrap(), m.score(&y, &x).unwrap());
    }
}
