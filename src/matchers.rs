//! Metrics derived from matching two collections.
//!
//! All four matchers wrap an inner metric and a [`crate::MatchingKind`]
//! cardinality constraint, and delegate the combinatorial core to
//! [`crate::solvers`].
pub(crate) mod graph;
pub(crate) mod latent;
pub(crate) mod sequence;
pub(crate) mod set;

pub use graph::GraphMatchingMetric;
pub use latent::LatentSetMatchingMetric;
pub use sequence::SequenceMatchingMetric;
pub use set::SetMatchingMetric;
