/**
 * @file zen-gwm/src/errors.rs
 * @brief Error types for the GIN-GWM fingerprint network
 *
 * Every shape contract of the network is checked up front and reported
 * through `GNNError` instead of panicking inside ndarray.
 *
 * @version 1.0.0-alpha.1
 */

use thiserror::Error;

/// Result alias used throughout the crate
pub type GNNResult<T> = Result<T, GNNError>;

/// GNN-specific error types
#[derive(Debug, Error)]
pub enum GNNError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Array shape error: {0}")]
    ShapeError(#[from] ndarray::ShapeError),

    #[cfg(feature = "serde")]
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GNNError {
    /// Shorthand for a dimension mismatch between an expected and an actual size
    pub(crate) fn mismatch(what: &str, expected: usize, actual: usize) -> Self {
        GNNError::DimensionMismatch(format!(
            "{} mismatch: expected {}, got {}",
            what, expected, actual
        ))
    }
}
