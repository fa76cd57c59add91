//! Stride computation utilities.
//!
//! Uses row-major (C) order: the last axis is contiguous. Transpose, diagonal
//! and contraction all address elements through these helpers, so reordering
//! axes is a matter of permuting `(shape, strides)` pairs.

/// Compute row-major strides from shape.
///
/// For shape [d0, d1, d2], returns strides [d1*d2, d2, 1].
///
/// # Examples
///
/// ```
/// use ndcontract::strides::compute_strides;
///
/// assert_eq!(compute_strides(&[3, 4, 5]), vec![20, 5, 1]);
/// assert_eq!(compute_strides(&[2, 3]), vec![3, 1]);
/// assert_eq!(compute_strides(&[5]), vec![1]);
/// assert_eq!(compute_strides(&[]), vec![]);
/// ```
pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut stride = 1;

    for (s, &dim) in strides.iter_mut().zip(shape.iter()).rev() {
        *s = stride;
        stride *= dim;
    }

    strides
}

/// Map a multi-index to a flat element offset.
///
/// `index` and `strides` must have the same length.
#[inline]
pub fn flat_offset(index: &[usize], strides: &[usize]) -> usize {
    index
        .iter()
        .zip(strides.iter())
        .map(|(&idx, &stride)| idx * stride)
        .sum()
}

/// Advance `index` to the next position in row-major order.
///
/// Returns `false` once every position has been visited, leaving `index`
/// reset to all zeros. A shape containing a zero-sized axis has no
/// positions, and rank-0 shapes have exactly one (so the first call returns
/// `false`).
#[inline]
pub fn increment_index(index: &mut [usize], shape: &[usize]) -> bool {
    for axis in (0..index.len()).rev() {
        index[axis] += 1;
        if index[axis] < shape[axis] {
            return true;
        }
        index[axis] = 0;
    }
    false
}

/// Check whether `strides` describe a dense row-major layout of `shape`.
pub fn is_row_major(shape: &[usize], strides: &[usize]) -> bool {
    let mut expected = 1;
    for (&dim, &stride) in shape.iter().zip(strides.iter()).rev() {
        // Axes of extent one never advance, so their stride is irrelevant.
        if dim != 1 && stride != expected {
            return false;
        }
        expected *= dim;
    }
    true
}
