//! Owned-or-borrowed element buffer.

use crate::dtype::Element;
use crate::error::TensorError;

/// Contiguous element storage, either owned or borrowed from the caller.
///
/// `Borrowed` regions are never deallocated here: dropping or releasing one
/// only forgets the reference. The lifetime `'a` ties the buffer to the
/// caller's memory so it cannot outlive it.
#[derive(Debug)]
pub enum Storage<'a, T: Element> {
    Owned(Vec<T>),
    Borrowed(&'a mut [T]),
}

/// Allocate a zero-initialized vector, reporting failure instead of aborting.
pub(crate) fn alloc_vec<T: Element>(len: usize) -> Result<Vec<T>, TensorError> {
    let bytes = len.saturating_mul(size_of::<T>());
    if len.checked_mul(size_of::<T>()).is_none() || bytes > isize::MAX as usize {
        return Err(TensorError::AllocError { bytes });
    }

    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| TensorError::AllocError { bytes })?;
    data.resize(len, T::zero());
    Ok(data)
}

impl<T: Element> Storage<'static, T> {
    /// Allocate `len` zero-initialized elements.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::AllocError` if the byte size overflows or the
    /// allocator refuses the reservation.
    pub fn allocate(len: usize) -> Result<Self, TensorError> {
        alloc_vec(len).map(Storage::Owned)
    }

    /// Take ownership of an existing vector.
    #[inline]
    pub fn from_vec(data: Vec<T>) -> Self {
        Storage::Owned(data)
    }
}

impl<'a, T: Element> Storage<'a, T> {
    /// Borrow a caller-owned region.
    #[inline]
    pub fn borrowed(region: &'a mut [T]) -> Self {
        Storage::Borrowed(region)
    }

    /// Whether this storage will free its memory.
    #[inline]
    pub fn is_owned(&self) -> bool {
        matches!(self, Storage::Owned(_))
    }

    /// Length of storage (number of elements).
    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Check if storage is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get immutable slice of data.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match self {
            Storage::Owned(data) => data,
            Storage::Borrowed(region) => region,
        }
    }

    /// Get mutable slice of data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            Storage::Owned(data) => data,
            Storage::Borrowed(region) => region,
        }
    }

    /// Release owned memory, or forget a borrowed region.
    ///
    /// Safe to call repeatedly; afterwards the storage is empty and keeps its
    /// ownership tag.
    pub fn release(&mut self) {
        match self {
            Storage::Owned(data) => *data = Vec::new(),
            Storage::Borrowed(region) => {
                let _ = std::mem::take(region);
            }
        }
    }

    /// Copy into owned storage, or move if already owned.
    pub fn into_owned(self) -> Result<Storage<'static, T>, TensorError> {
        match self {
            Storage::Owned(data) => Ok(Storage::Owned(data)),
            Storage::Borrowed(region) => {
                let mut owned = Storage::allocate(region.len())?;
                owned.as_mut_slice().copy_from_slice(region);
                Ok(owned)
            }
        }
    }
}
