//! Error types for ndcontract.

use thiserror::Error;

use crate::dtype::DType;

/// Errors that can occur in tensor operations.
///
/// Every variant is a deterministic function of the inputs; none of them is
/// transient, so retrying the same call unchanged yields the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TensorError {
    /// A required argument was missing or empty.
    #[error("missing required input: {what}")]
    NullInput { what: &'static str },

    /// Shapes disagree where exact equality is required.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Operands or output do not share one dtype.
    #[error("dtype mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: DType, actual: DType },

    /// Axis index out of range, duplicated, or otherwise unusable.
    #[error("invalid axes {axes:?} for tensor with {ndim} dimensions")]
    InvalidAxis { axes: Vec<usize>, ndim: usize },

    /// Memory for a buffer could not be reserved.
    #[error("failed to allocate {bytes} bytes")]
    AllocError { bytes: usize },

    /// Every candidate contraction step would materialize more than the budget.
    #[error("memory limit exceeded: smallest intermediate needs {required} bytes, budget is {budget}")]
    MemoryLimitExceeded { budget: usize, required: usize },

    /// Malformed contraction expression or labels inconsistent with operands.
    #[error("invalid contraction: {reason}")]
    InvalidContraction { reason: String },

    /// Index out of bounds.
    #[error("index out of bounds: index {index} is out of range for dimension {dim_size}")]
    IndexOutOfBounds { index: usize, dim_size: usize },

    /// Wrong number of indices provided.
    #[error("wrong number of indices: expected {expected}, got {actual}")]
    WrongNumberOfIndices { expected: usize, actual: usize },
}

/// Field-less classification of [`TensorError`], used for status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NullInput,
    ShapeMismatch,
    TypeMismatch,
    InvalidAxis,
    AllocError,
    MemoryLimitExceeded,
    InvalidContraction,
    IndexOutOfBounds,
}

impl TensorError {
    pub(crate) fn invalid_contraction(reason: impl Into<String>) -> Self {
        TensorError::InvalidContraction {
            reason: reason.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TensorError::NullInput { .. } => ErrorKind::NullInput,
            TensorError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            TensorError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            TensorError::InvalidAxis { .. } => ErrorKind::InvalidAxis,
            TensorError::AllocError { .. } => ErrorKind::AllocError,
            TensorError::MemoryLimitExceeded { .. } => ErrorKind::MemoryLimitExceeded,
            TensorError::InvalidContraction { .. } => ErrorKind::InvalidContraction,
            TensorError::IndexOutOfBounds { .. } | TensorError::WrongNumberOfIndices { .. } => {
                ErrorKind::IndexOutOfBounds
            }
        }
    }

    /// Whether the error reflects resource exhaustion rather than bad input.
    ///
    /// Only allocation failure qualifies; a caller may react to it with a
    /// fallback such as a smaller memory budget. Everything else is an input
    /// error that will recur if the call is repeated unchanged.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TensorError::AllocError { .. })
    }
}
