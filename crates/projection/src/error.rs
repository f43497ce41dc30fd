//! Error types for CRS operations.

use thiserror::Error;

/// Errors raised while constructing or applying coordinate transforms.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// No transformation path exists between two CRSs.
    #[error("no transform available from {source_crs} to {target_crs}: {reason}")]
    TransformUnavailable {
        source_crs: String,
        target_crs: String,
        reason: String,
    },

    /// A transform could not be applied, e.g. at a projection singularity.
    #[error("transform failed: {0}")]
    TransformFailed(String),

    /// The transform has no inverse.
    #[error("transform is not invertible: {0}")]
    NonInvertible(String),
}

impl ProjectionError {
    /// Create a TransformUnavailable error.
    pub fn unavailable(
        source_crs: impl Into<String>,
        target_crs: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::TransformUnavailable {
            source_crs: source_crs.into(),
            target_crs: target_crs.into(),
            reason: reason.into(),
        }
    }

    /// Create a TransformFailed error.
    pub fn transform_failed(msg: impl Into<String>) -> Self {
        Self::TransformFailed(msg.into())
    }
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
