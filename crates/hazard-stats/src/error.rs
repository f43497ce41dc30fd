//! Error types for hazard statistics.

use projection::ProjectionError;
use thiserror::Error;

/// Coarse classification of a [`HazardError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HazardErrorKind {
    InvalidInput,
    TransformUnavailable,
    TransformFailed,
    NonInvertible,
    ReadFailed,
    SchemaError,
    Cancelled,
}

/// Failure reported by an external raster reader or feature source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source had to reproject data and could not.
    #[error(transparent)]
    Transform(#[from] ProjectionError),

    #[error("{0}")]
    Backend(String),
}

impl SourceError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Errors that can occur while computing hazard statistics.
#[derive(Error, Debug)]
pub enum HazardError {
    /// A required input is absent or violates its constraint.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A CRS operation could not be constructed or applied.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// A raster read or vector query failed, or returned no data.
    #[error("read failed: {message}")]
    ReadFailed {
        message: String,
        #[source]
        source: Option<SourceError>,
    },

    /// The vector source lacks a geometry attribute.
    #[error("schema error: {0}")]
    SchemaError(String),

    /// The progress listener asked to stop.
    #[error("operation cancelled")]
    Cancelled,
}

impl HazardError {
    /// Create an InvalidInput error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a ReadFailed error with no underlying cause.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed {
            message: msg.into(),
            source: None,
        }
    }

    /// Wrap a collaborator failure.
    ///
    /// Transform failures inside a source keep their transform kind.
    pub fn from_source(msg: impl Into<String>, err: SourceError) -> Self {
        match err {
            SourceError::Transform(e) => Self::Projection(e),
            other => Self::ReadFailed {
                message: msg.into(),
                source: Some(other),
            },
        }
    }

    /// Create a SchemaError.
    pub fn schema_error(msg: impl Into<String>) -> Self {
        Self::SchemaError(msg.into())
    }

    pub fn kind(&self) -> HazardErrorKind {
        match self {
            Self::InvalidInput(_) => HazardErrorKind::InvalidInput,
            Self::Projection(ProjectionError::TransformUnavailable { .. }) => {
                HazardErrorKind::TransformUnavailable
            }
            Self::Projection(ProjectionError::TransformFailed(_)) => HazardErrorKind::TransformFailed,
            Self::Projection(ProjectionError::NonInvertible(_)) => HazardErrorKind::NonInvertible,
            Self::ReadFailed { .. } => HazardErrorKind::ReadFailed,
            Self::SchemaError(_) => HazardErrorKind::SchemaError,
            Self::Cancelled => HazardErrorKind::Cancelled,
        }
    }
}

/// Operator level failure, wrapping the original cause.
#[derive(Error, Debug)]
#[error("hazard statistics failed: {source}")]
pub struct OperatorError {
    /// Index of the raster layer being processed, if any.
    pub layer: Option<usize>,
    pub source: HazardError,
}

impl OperatorError {
    pub fn new(source: HazardError) -> Self {
        Self {
            layer: None,
            source,
        }
    }

    pub fn for_layer(layer: usize, source: HazardError) -> Self {
        Self {
            layer: Some(layer),
            source,
        }
    }

    pub fn kind(&self) -> HazardErrorKind {
        self.source.kind()
    }
}

impl From<HazardError> for OperatorError {
    fn from(err: HazardError) -> Self {
        Self::new(err)
    }
}

/// Result type for hazard statistics operations.
pub type Result<T> = std::result::Result<T, HazardError>;
