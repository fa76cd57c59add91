//! Axis permutation.
//!
//! ```text
//! transpose(tensor, axes)
//!     → validate axes (permutation of 0..ndim)
//!     → permute the view's (shape, strides)
//!     → materialize into a new row-major tensor
//! ```

use crate::dtype::Element;
use crate::error::TensorError;
use crate::tensor::{OwnedTensor, Tensor};

/// Permute the axes of a tensor, returning a new owning tensor.
///
/// Axis `i` of the result is axis `axes[i]` of the input, so
/// `result.shape()[i] == tensor.shape()[axes[i]]`.
///
/// # Errors
///
/// - `TensorError::NullInput` if `tensor` has been destroyed.
/// - `TensorError::InvalidAxis` if `axes` is not a permutation of `0..ndim`
///   (wrong length, out-of-range or duplicate entries).
///
/// # Examples
///
/// ```
/// use ndcontract::Tensor;
/// use ndcontract::operations::transpose;
///
/// let t = Tensor::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
/// let t2 = transpose(&t, &[1, 0]).unwrap();
/// assert_eq!(t2.shape(), &[3, 2]);
/// assert_eq!(t2.data(), &[1, 4, 2, 5, 3, 6]);
/// ```
pub fn transpose<T: Element>(
    tensor: &Tensor<'_, T>,
    axes: &[usize],
) -> Result<OwnedTensor<T>, TensorError> {
    tensor.check_live()?;
    tensor.view().permute(axes)?.to_tensor()
}

/// Permute axes of `src` into an existing tensor.
///
/// # Errors
///
/// - `TensorError::NullInput` if either tensor has been destroyed.
/// - `TensorError::InvalidAxis` for an invalid permutation.
/// - `TensorError::ShapeMismatch` if `dest` does not have the permuted shape;
///   `dest` is left untouched in that case.
pub fn transpose_into<T: Element>(
    dest: &mut Tensor<'_, T>,
    src: &Tensor<'_, T>,
    axes: &[usize],
) -> Result<(), TensorError> {
    src.check_live()?;
    dest.check_live()?;
    let view = src.view();
    let permuted = view.permute(axes)?;
    if permuted.shape() != dest.shape() {
        return Err(TensorError::ShapeMismatch {
            expected: permuted.shape().to_vec(),
            actual: dest.shape().to_vec(),
        });
    }
    permuted.copy_into(dest.data_mut());
    Ok(())
}

/// Inverse of a permutation: `inverse[axes[i]] == i`.
///
/// # Errors
///
/// Returns `TensorError::InvalidAxis` if `axes` is not a permutation.
pub fn inverse_permutation(axes: &[usize]) -> Result<Vec<usize>, TensorError> {
    crate::view::validate_permutation(axes, axes.len())?;
    let mut inverse = vec![0; axes.len()];
    for (i, &a) in axes.iter().enumerate() {
        inverse[a] = i;
    }
    Ok(inverse)
}
