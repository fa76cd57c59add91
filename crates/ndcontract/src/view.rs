//! Borrowed strided views.
//!
//! Axis permutation and diagonal extraction only rewrite a view's
//! `(shape, strides)` pairs; no element is copied until
//! [`TensorView::to_tensor`] materializes the view.

use smallvec::SmallVec;

use crate::dtype::Element;
use crate::error::TensorError;
use crate::strides::{flat_offset, increment_index, is_row_major};
use crate::tensor::{OwnedTensor, Tensor};

/// Inline storage for per-axis values; ranks above eight spill to the heap.
pub(crate) type Dims = SmallVec<[usize; 8]>;

/// A read-only strided window onto element data.
#[derive(Debug, Clone)]
pub struct TensorView<'b, T: Element> {
    data: &'b [T],
    shape: Dims,
    strides: Dims,
    offset: usize,
}

/// Validate that `axes` is a permutation of `0..ndim`.
pub(crate) fn validate_permutation(axes: &[usize], ndim: usize) -> Result<(), TensorError> {
    let invalid = || TensorError::InvalidAxis {
        axes: axes.to_vec(),
        ndim,
    };
    if axes.len() != ndim {
        return Err(invalid());
    }

    let mut seen = vec![false; ndim];
    for &axis in axes {
        if axis >= ndim || seen[axis] {
            return Err(invalid());
        }
        seen[axis] = true;
    }

    Ok(())
}

impl<'b, T: Element> TensorView<'b, T> {
    pub(crate) fn new(data: &'b [T], shape: &[usize], strides: &[usize], offset: usize) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        Self {
            data,
            shape: shape.iter().copied().collect(),
            strides: strides.iter().copied().collect(),
            offset,
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements addressed by the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The data slice this view reads from, starting at the view's origin.
    #[inline]
    pub(crate) fn base(&self) -> &'b [T] {
        &self.data[self.offset..]
    }

    /// Element at a multi-index, or `None` if out of bounds.
    pub fn get(&self, index: &[usize]) -> Option<T> {
        if index.len() != self.ndim() || index.iter().zip(self.shape.iter()).any(|(&i, &d)| i >= d)
        {
            return None;
        }
        self.data
            .get(self.offset + flat_offset(index, &self.strides))
            .copied()
    }

    /// Reorder axes: axis `i` of the result is axis `axes[i]` of `self`.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::InvalidAxis` unless `axes` is a permutation of
    /// `0..ndim`.
    pub fn permute(&self, axes: &[usize]) -> Result<Self, TensorError> {
        validate_permutation(axes, self.ndim())?;
        Ok(Self {
            data: self.data,
            shape: axes.iter().map(|&a| self.shape[a]).collect(),
            strides: axes.iter().map(|&a| self.strides[a]).collect(),
            offset: self.offset,
        })
    }

    /// Diagonal over `axis1` and `axis2`.
    ///
    /// The result drops `axis2`; `axis1` stays in place with extent
    /// `min(shape[axis1], shape[axis2])` and stride
    /// `strides[axis1] + strides[axis2]`, so position `i` on it reads the
    /// element whose indices on both source axes equal `i`.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::InvalidAxis` if either axis is out of range or
    /// the axes coincide.
    pub fn diagonal(&self, axis1: usize, axis2: usize) -> Result<Self, TensorError> {
        let ndim = self.ndim();
        if axis1 >= ndim || axis2 >= ndim || axis1 == axis2 {
            return Err(TensorError::InvalidAxis {
                axes: vec![axis1, axis2],
                ndim,
            });
        }

        let mut shape = Dims::new();
        let mut strides = Dims::new();
        for axis in 0..ndim {
            if axis == axis2 {
                continue;
            }
            if axis == axis1 {
                shape.push(self.shape[axis1].min(self.shape[axis2]));
                strides.push(self.strides[axis1] + self.strides[axis2]);
            } else {
                shape.push(self.shape[axis]);
                strides.push(self.strides[axis]);
            }
        }

        Ok(Self {
            data: self.data,
            shape,
            strides,
            offset: self.offset,
        })
    }

    /// Same data and origin under a different `(shape, strides)` layout.
    ///
    /// The caller guarantees every addressed offset stays inside the data.
    pub(crate) fn with_layout(&self, shape: &[usize], strides: &[usize]) -> Self {
        Self::new(self.data, shape, strides, self.offset)
    }

    /// Whether the view addresses one dense row-major block.
    pub fn is_contiguous(&self) -> bool {
        is_row_major(&self.shape, &self.strides)
    }

    /// Iterate elements in row-major order of the view's own shape.
    pub fn iter(&self) -> ViewIter<'_, 'b, T> {
        ViewIter {
            view: self,
            index: Dims::from_elem(0, self.ndim()),
            done: self.is_empty(),
        }
    }

    /// Write elements in row-major order into `dest`.
    ///
    /// `dest.len()` must equal `self.len()`.
    pub(crate) fn copy_into(&self, dest: &mut [T]) {
        debug_assert_eq!(dest.len(), self.len());
        if self.is_contiguous() {
            let len = dest.len();
            dest.copy_from_slice(&self.data[self.offset..self.offset + len]);
            return;
        }
        for (slot, value) in dest.iter_mut().zip(self.iter()) {
            *slot = value;
        }
    }

    /// Materialize into a new owning row-major tensor.
    ///
    /// A rank-0 view becomes a tensor of shape `[1]`.
    pub fn to_tensor(&self) -> Result<OwnedTensor<T>, TensorError> {
        let shape: &[usize] = if self.shape.is_empty() {
            &[1]
        } else {
            &self.shape
        };
        let mut out = Tensor::create(shape)?;
        self.copy_into(out.data_mut());
        Ok(out)
    }
}

/// Row-major element iterator over a [`TensorView`].
pub struct ViewIter<'v, 'b, T: Element> {
    view: &'v TensorView<'b, T>,
    index: Dims,
    done: bool,
}

impl<T: Element> Iterator for ViewIter<'_, '_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        let value = self.view.data[self.view.offset + flat_offset(&self.index, &self.view.strides)];
        self.done = !increment_index(&mut self.index, &self.view.shape);
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iota(shape: &[usize]) -> OwnedTensor<i32> {
        let len: usize = shape.iter().product();
        Tensor::from_vec((0..len as i32).collect(), shape).unwrap()
    }

    #[test]
    fn test_view_matches_tensor() {
        let t = iota(&[2, 3]);
        let v = t.view();
        assert!(v.is_contiguous());
        assert_eq!(v.get(&[1, 2]), Some(5));
        assert_eq!(v.iter().collect::<Vec<_>>(), t.data().to_vec());
    }

    #[test]
    fn test_permute_is_stride_swap() {
        let t = iota(&[2, 3]);
        let v = t.view().permute(&[1, 0]).unwrap();
        assert_eq!(v.shape(), &[3, 2]);
        assert_eq!(v.strides(), &[1, 3]);
        assert!(!v.is_contiguous());
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![0, 3, 1, 4, 2, 5]);
    }

    #[test]
    fn test_permute_rejects_bad_axes() {
        let t = iota(&[2, 3]);
        assert!(t.view().permute(&[0]).is_err());
        assert!(t.view().permute(&[0, 0]).is_err());
        assert!(t.view().permute(&[0, 2]).is_err());
    }

    #[test]
    fn test_diagonal_square() {
        let t = iota(&[3, 3]);
        let d = t.view().diagonal(0, 1).unwrap();
        assert_eq!(d.shape(), &[3]);
        assert_eq!(d.strides(), &[4]);
        assert_eq!(d.iter().collect::<Vec<_>>(), vec![0, 4, 8]);
    }

    #[test]
    fn test_diagonal_non_adjacent_axes() {
        // t[i, j, k] = 12*i + 4*j + k, diagonal over axes 0 and 2 keeps j.
        let t = iota(&[3, 3, 4]);
        let d = t.view().diagonal(0, 2).unwrap();
        assert_eq!(d.shape(), &[3, 3]);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(d.get(&[i, j]), t.get(&[i, j, i]).copied());
            }
        }
    }

    #[test]
    fn test_diagonal_rejects_same_axis() {
        let t = iota(&[2, 2]);
        assert!(matches!(
            t.view().diagonal(1, 1),
            Err(TensorError::InvalidAxis { .. })
        ));
        assert!(t.view().diagonal(0, 2).is_err());
    }

    #[test]
    fn test_to_tensor_of_empty_view() {
        let t = Tensor::<u8>::create(&[0, 2]).unwrap();
        let out = t.view().permute(&[1, 0]).unwrap().to_tensor().unwrap();
        assert_eq!(out.shape(), &[2, 0]);
        assert!(out.is_empty());
    }
}
