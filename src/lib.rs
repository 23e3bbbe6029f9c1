//! # Simatch: similarity scoring for structured objects
//!
//! Simatch computes similarity scores between pairs of structured objects
//! (semantic graphs, event sets, coreference clusters, …) by decomposing the
//! comparison along the structure of the compared values and solving a
//! combinatorial matching problem at every collection boundary.
//!
//! ## Features
//!
//! * **Composable**:
//!     Metrics form a small algebra ([`Metric`]) closed under products over
//!     record fields, unions over case types, preprocessing, and the
//!     collection matchers in [`matchers`].
//! * **Exact matching**:
//!     Collection comparisons are solved exactly: Hungarian assignment for
//!     one-to-one sets, dynamic programming for sequences, and 0/1 integer
//!     linear programming for graphs and latent-variable matching
//!     ([`solvers`]).
//! * **Derivable**:
//!     [`derive_metric`] maps a structural type description ([`Schema`]) to
//!     the appropriate composite metric.
//! * **Explainable**:
//!     Every score comes with a [`Matching`] witness of which sub-objects
//!     were paired at which score, observable through [`Hooks`] along path
//!     selectors.
//!
//! ## Example: scoring and aggregating set overlaps
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use approx::assert_abs_diff_eq;
//! use simatch::matchers::SetMatchingMetric;
//! use simatch::{DiscreteMetric, MatchingKind, Metric, MetricSuite, Reduction, Value};
//!
//! // A one-to-one matching over discrete elements counts the overlap.
//! let metric = Arc::new(SetMatchingMetric::new(
//!     Arc::new(DiscreteMetric),
//!     "1:1".parse::<MatchingKind>()?,
//! ));
//! let x = Value::set([1, 2, 2].map(Value::from));
//! let y = Value::set([1, 1, 1, 2].map(Value::from));
//! assert_abs_diff_eq!(metric.score(&x, &y)?, 2.0);
//!
//! // Aggregate a stream of pairs into micro-averaged scores.
//! let suite = MetricSuite::family(
//!     metric,
//!     Reduction::micro_average(["precision".parse()?, "recall".parse()?, "f1".parse()?]),
//! );
//! let mut agg = suite.aggregator(None);
//! agg.update_single(&x, &y)?;
//! let scores = agg.compute();
//! assert_abs_diff_eq!(scores["precision"], 2.0 / 3.0, epsilon = 1e-9);
//! assert_abs_diff_eq!(scores["recall"], 0.5, epsilon = 1e-9);
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: deriving Smatch from a schema
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use approx::assert_abs_diff_eq;
//! use simatch::{derive_metric, Metric, NormalizedMetric, Schema, Value};
//!
//! // A proposition relates a subject variable to a string or a variable.
//! let prop = Schema::record("Prop", [
//!     ("subj", Schema::Variable),
//!     ("pred", Schema::Atom),
//!     ("obj", Schema::union([Schema::Variable, Schema::Atom])),
//! ]);
//! let metric = derive_metric(&Schema::collection(prop), "1:1".parse()?)?;
//! let smatch = NormalizedMetric::new(metric, "f1".parse()?);
//!
//! let prop = |subj: &str, pred: &str, obj: Value| {
//!     Value::record("Prop", [
//!         ("subj", Value::var(subj)),
//!         ("pred", Value::from(pred)),
//!         ("obj", obj),
//!     ])
//! };
//! let x = Value::set([
//!     prop("a", "instance", Value::from("boy")),
//!     prop("b", "instance", Value::from("run-01")),
//!     prop("b", "ARG0", Value::var("a")),
//! ]);
//! let y = Value::set([
//!     prop("p", "instance", Value::from("boy")),
//!     prop("q", "instance", Value::from("run-01")),
//!     prop("q", "ARG0", Value::var("p")),
//! ]);
//! assert_abs_diff_eq!(smatch.score(&x, &y)?, 1.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate features
//!
//! * `serde` - Enables (de)serialization of [`Value`] and [`Path`] using
//!   Serde.
#![deny(missing_docs)]

pub mod constraint;
pub mod derive;
pub mod errors;
pub mod graph;
pub mod matchers;
pub mod matching;
pub mod metric;
pub mod normalizers;
pub mod path;
pub mod ranking;
pub mod reduction;
pub mod schema;
pub mod solvers;
pub mod state;
pub mod suite;
pub mod value;

pub use constraint::MatchingKind;
pub use derive::derive_metric;
pub use errors::SimatchError;
pub use graph::GraphValue;
pub use matching::Hook;
pub use matching::Hooks;
pub use matching::Match;
pub use matching::Matching;
pub use metric::from_fn;
pub use metric::ContramappedMetric;
pub use metric::DiscreteMetric;
pub use metric::Metric;
pub use metric::ProductMetric;
pub use metric::UnionMetric;
pub use metric::VariableMetric;
pub use normalizers::NormalizedMetric;
pub use normalizers::Normalizer;
pub use path::Path;
pub use path::PathComponent;
pub use reduction::Reduction;
pub use schema::Schema;
pub use state::SingleMetricState;
pub use suite::Aggregator;
pub use suite::MetricSuite;
pub use value::Record;
pub use value::Value;
pub use value::Variable;
