//! N-dimensional typed buffer.
//!
//! A [`Tensor`] pairs a [`Storage`] with a shape and the row-major strides
//! derived from it. Element count always equals the product of the shape.
//!
//! ```text
//! Tensor<'a, T>
//! ├── Storage::Owned(Vec<T>)        created by Tensor::create / from_vec
//! └── Storage::Borrowed(&'a mut [T]) created by Tensor::wrap
//! ```

use crate::dtype::{DType, Element};
use crate::error::TensorError;
use crate::storage::Storage;
use crate::strides::{compute_strides, flat_offset};
use crate::view::TensorView;

/// A typed, contiguous, row-major n-dimensional buffer.
#[derive(Debug)]
pub struct Tensor<'a, T: Element> {
    storage: Storage<'a, T>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

/// A tensor that owns its memory.
pub type OwnedTensor<T> = Tensor<'static, T>;

fn check_rank(shape: &[usize]) -> Result<(), TensorError> {
    if shape.is_empty() {
        return Err(TensorError::NullInput { what: "shape" });
    }
    Ok(())
}

/// Element count of `shape`, or `None` if it overflows `usize`.
fn checked_len(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

impl<T: Element> Tensor<'static, T> {
    /// Allocate a zero-initialized tensor that owns its memory.
    ///
    /// A zero-sized dimension is allowed and yields an empty tensor.
    ///
    /// # Errors
    ///
    /// - `TensorError::NullInput` if `shape` has no dimensions.
    /// - `TensorError::AllocError` if the memory cannot be reserved.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndcontract::Tensor;
    ///
    /// let t = Tensor::<f32>::create(&[2, 3, 4]).unwrap();
    /// assert_eq!(t.shape(), &[2, 3, 4]);
    /// assert_eq!(t.len(), 24);
    /// assert!(t.owns_memory());
    /// ```
    pub fn create(shape: &[usize]) -> Result<Self, TensorError> {
        check_rank(shape)?;
        let len = checked_len(shape).ok_or(TensorError::AllocError { bytes: usize::MAX })?;
        Ok(Self {
            storage: Storage::allocate(len)?,
            shape: shape.to_vec(),
            strides: compute_strides(shape),
        })
    }

    /// Create an owning tensor from row-major data.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if data length doesn't match shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndcontract::Tensor;
    ///
    /// let t = Tensor::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
    /// assert_eq!(t.get(&[0, 1]), Some(&2)); // row-major: [0,1] is second element
    /// assert_eq!(t.get(&[1, 0]), Some(&4));
    /// ```
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self, TensorError> {
        check_rank(shape)?;
        let mismatch = || TensorError::ShapeMismatch {
            expected: shape.to_vec(),
            actual: vec![data.len()],
        };
        let expected = checked_len(shape).ok_or_else(mismatch)?;
        if data.len() != expected {
            return Err(mismatch());
        }
        Ok(Self {
            storage: Storage::from_vec(data),
            shape: shape.to_vec(),
            strides: compute_strides(shape),
        })
    }

    /// Create an owning tensor filled with `value`.
    pub fn full(shape: &[usize], value: T) -> Result<Self, TensorError> {
        let mut t = Self::create(shape)?;
        t.fill(value);
        Ok(t)
    }

    /// Same as [`Tensor::create`].
    #[inline]
    pub fn zeros(shape: &[usize]) -> Result<Self, TensorError> {
        Self::create(shape)
    }

    /// Create an owning tensor filled with ones.
    pub fn ones(shape: &[usize]) -> Result<Self, TensorError> {
        Self::full(shape, T::one())
    }
}

impl<'a, T: Element> Tensor<'a, T> {
    /// Wrap caller-owned memory without taking ownership.
    ///
    /// The region must hold at least `product(shape)` elements; any excess is
    /// ignored. The tensor never frees the region, and the borrow keeps the
    /// region alive for as long as the tensor exists.
    ///
    /// # Errors
    ///
    /// - `TensorError::NullInput` if `shape` has no dimensions.
    /// - `TensorError::ShapeMismatch` if the region is too short.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndcontract::Tensor;
    ///
    /// let mut memory = vec![1.0f32, 2.0, 3.0, 4.0];
    /// {
    ///     let mut t = Tensor::wrap(&[2, 2], &mut memory).unwrap();
    ///     assert!(!t.owns_memory());
    ///     t.set(&[1, 1], 9.0).unwrap();
    /// }
    /// assert_eq!(memory[3], 9.0);
    /// ```
    pub fn wrap(shape: &[usize], region: &'a mut [T]) -> Result<Self, TensorError> {
        check_rank(shape)?;
        let mismatch = || TensorError::ShapeMismatch {
            expected: shape.to_vec(),
            actual: vec![region.len()],
        };
        let len = checked_len(shape).ok_or_else(mismatch)?;
        if region.len() < len {
            return Err(mismatch());
        }
        Ok(Self {
            storage: Storage::borrowed(&mut region[..len]),
            shape: shape.to_vec(),
            strides: compute_strides(shape),
        })
    }

    /// Release the tensor's memory and reset its descriptor.
    ///
    /// Owned memory is freed; a borrowed region is left untouched. Calling
    /// this more than once is harmless. Dropping the tensor has the same
    /// effect on owned memory.
    pub fn destroy(&mut self) {
        self.storage.release();
        self.shape.clear();
        self.strides.clear();
    }

    /// Fail with `NullInput` once the tensor has been destroyed.
    pub(crate) fn check_live(&self) -> Result<(), TensorError> {
        check_rank(&self.shape).map_err(|_| TensorError::NullInput { what: "tensor" })
    }

    /// Whether the tensor frees its memory on destroy/drop.
    #[inline]
    pub fn owns_memory(&self) -> bool {
        self.storage.is_owned()
    }

    /// Run-time tag of the element type.
    #[inline]
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Get the shape of the tensor.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the rank (number of dimensions).
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Get total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if tensor is empty (has zero elements).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Size of the element data in bytes.
    #[inline]
    pub fn nbytes(&self) -> usize {
        self.len() * T::DTYPE.size_of()
    }

    /// Get strides.
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Get underlying data as slice.
    #[inline]
    pub fn data(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Get underlying data as mutable slice.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }

    /// Get element by linear index.
    #[inline]
    pub fn get_linear(&self, i: usize) -> Option<&T> {
        self.storage.as_slice().get(i)
    }

    fn checked_offset(&self, indices: &[usize]) -> Result<usize, TensorError> {
        if indices.len() != self.ndim() {
            return Err(TensorError::WrongNumberOfIndices {
                expected: self.ndim(),
                actual: indices.len(),
            });
        }
        for (&idx, &dim) in indices.iter().zip(self.shape.iter()) {
            if idx >= dim {
                return Err(TensorError::IndexOutOfBounds {
                    index: idx,
                    dim_size: dim,
                });
            }
        }
        Ok(flat_offset(indices, &self.strides))
    }

    /// Get element by multi-index.
    ///
    /// Returns `None` if indices are out of bounds or wrong number of indices.
    pub fn get(&self, indices: &[usize]) -> Option<&T> {
        let offset = self.checked_offset(indices).ok()?;
        self.get_linear(offset)
    }

    /// Set element by multi-index.
    ///
    /// # Errors
    ///
    /// Returns error if indices are out of bounds or wrong number of indices.
    pub fn set(&mut self, indices: &[usize], value: T) -> Result<(), TensorError> {
        let offset = self.checked_offset(indices)?;
        let len = self.len();
        let slot = self
            .storage
            .as_mut_slice()
            .get_mut(offset)
            .ok_or(TensorError::IndexOutOfBounds {
                index: offset,
                dim_size: len,
            })?;
        *slot = value;
        Ok(())
    }

    /// Fill all elements with a value.
    pub fn fill(&mut self, value: T) {
        self.storage.as_mut_slice().fill(value);
    }

    /// Borrow the tensor as a strided view.
    pub fn view(&self) -> TensorView<'_, T> {
        TensorView::new(self.data(), &self.shape, &self.strides, 0)
    }

    /// Copy the contents into a new owning tensor.
    pub fn to_owned_tensor(&self) -> Result<OwnedTensor<T>, TensorError> {
        let mut out = Tensor::create(&self.shape)?;
        out.data_mut().copy_from_slice(self.data());
        Ok(out)
    }

    /// Convert into an owning tensor, copying only if the memory is borrowed.
    pub fn into_owned(self) -> Result<OwnedTensor<T>, TensorError> {
        Ok(Tensor {
            storage: self.storage.into_owned()?,
            shape: self.shape,
            strides: self.strides,
        })
    }
}

impl<T: Element> PartialEq for Tensor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.data() == other.data()
    }
}
