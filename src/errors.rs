//! Error handling for Simatch.
use thiserror::Error;

/// Error types for Simatch.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SimatchError {
    /// Error when a string form or a configuration value is invalid.
    #[error("{0}")]
    InvalidConfiguration(String),

    /// Error when a metric is applied to a value of the wrong shape.
    #[error("{0}")]
    TypeMismatch(String),

    /// Error when no derivation rule applies to a schema.
    #[error("{0}")]
    UnderivableType(String),

    /// Error reported by the matching solver back-end.
    #[error("{0}")]
    SolverFailure(String),
}

/// Specialized result type for Simatch.
pub type Result<T> = std::result::Result<T, SimatchError>;
