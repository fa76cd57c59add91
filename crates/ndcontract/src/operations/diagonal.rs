//! Diagonal extraction over an arbitrary pair of axes.

use crate::dtype::Element;
use crate::error::TensorError;
use crate::tensor::{OwnedTensor, Tensor};

/// Extract the diagonal over `axis1` and `axis2`.
///
/// The result drops `axis2` and keeps `axis1` in place with extent
/// `min(shape[axis1], shape[axis2])`; all other axes are preserved in order.
/// The axes need not be adjacent.
///
/// # Errors
///
/// - `TensorError::NullInput` if `tensor` has been destroyed.
/// - `TensorError::InvalidAxis` if an axis is out of range or both axes are
///   equal.
///
/// # Example
///
/// ```
/// use ndcontract::Tensor;
/// use ndcontract::operations::diagonal;
///
/// let t = Tensor::from_vec(vec![1, 2, 3, 4, 5, 6, 7, 8, 9], &[3, 3]).unwrap();
/// let d = diagonal(&t, 0, 1).unwrap();
/// assert_eq!(d.shape(), &[3]);
/// assert_eq!(d.data(), &[1, 5, 9]);
/// ```
pub fn diagonal<T: Element>(
    tensor: &Tensor<'_, T>,
    axis1: usize,
    axis2: usize,
) -> Result<OwnedTensor<T>, TensorError> {
    tensor.check_live()?;
    tensor.view().diagonal(axis1, axis2)?.to_tensor()
}
