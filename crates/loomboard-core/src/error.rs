//! Transform errors.

use crate::shapes::ShapeId;
use thiserror::Error;

/// Errors raised while computing a transform for a single shape.
///
/// These never abort a session: the affected shape is left out of the batch
/// and the error is logged.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),
    #[error("Transform for shape {0} produced non-finite geometry")]
    InvalidGeometry(ShapeId),
    #[error("Transform for shape {0} is not invertible")]
    NonInvertible(ShapeId),
}

/// Result type for transform computations.
pub type TransformResult<T> = Result<T, TransformError>;
