//! MeshError: unified error type for line-mesh public APIs
//!
//! Every fallible operation returns [`MeshResult`]. Argument errors carry the
//! 1-based position of the offending argument in the order the operation
//! documents them, so callers used to integer status codes can recover the
//! classic `-k` value through [`MeshError::code`].

use std::collections::TryReserveError;
use thiserror::Error;

/// Status code reported for allocation failures.
pub const INSUFFICIENT_MEMORY_CODE: i32 = -199;
/// Status code reported for internal failures.
pub const INTERNAL_ERROR_CODE: i32 = -200;
/// Status code reported when a [`ProgressSink`](crate::progress::ProgressSink) aborted the call.
pub const INTERRUPTED_CODE: i32 = -300;

/// Unified error type for line-mesh operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The `index`-th argument (1-based) violates a precondition.
    #[error("argument #{index} is invalid: {reason}")]
    InvalidArgument { index: usize, reason: String },
    /// A buffer could not grow.
    #[error("insufficient memory")]
    InsufficientMemory,
    /// Unexpected failure after validation, e.g. a curve adapter error.
    #[error("internal error: {0}")]
    Internal(String),
    /// The progress sink asked to stop.
    #[error("meshing interrupted by caller")]
    Interrupted,
}

impl MeshError {
    /// Build an [`MeshError::InvalidArgument`] for the `index`-th argument.
    pub fn invalid(index: usize, reason: impl Into<String>) -> Self {
        MeshError::InvalidArgument {
            index,
            reason: reason.into(),
        }
    }

    /// Legacy integer status: `-k` for the k-th argument, `-199` for memory,
    /// `-200` for internal errors and `-300` for interruptions.
    pub fn code(&self) -> i32 {
        match self {
            MeshError::InvalidArgument { index, .. } => {
                -(i32::try_from(*index).unwrap_or(i32::MAX))
            }
            MeshError::InsufficientMemory => INSUFFICIENT_MEMORY_CODE,
            MeshError::Internal(_) => INTERNAL_ERROR_CODE,
            MeshError::Interrupted => INTERRUPTED_CODE,
        }
    }

    /// The argument position for argument errors.
    pub fn argument_index(&self) -> Option<usize> {
        match self {
            MeshError::InvalidArgument { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// `true` when the call was aborted on request rather than failing.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, MeshError::Interrupted)
    }
}

impl From<TryReserveError> for MeshError {
    fn from(_: TryReserveError) -> Self {
        MeshError::InsufficientMemory
    }
}

/// Result alias used across the crate.
pub type MeshResult<T> = Result<T, MeshError>;

/// Failure reported by a [`CurveAdapter`](crate::curve::CurveAdapter).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// The adapter does not implement the requested query.
    #[error("operation not supported by the curve")]
    Unsupported,
    /// The adapter tried and failed.
    #[error("curve evaluation failed: {0}")]
    Failed(String),
}

impl From<CurveError> for MeshError {
    fn from(e: CurveError) -> Self {
        MeshError::Internal(e.to_string())
    }
}
