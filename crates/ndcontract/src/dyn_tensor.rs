//! Run-time typed tensors.
//!
//! [`DynTensor`] carries its element type as a [`DType`] tag instead of a
//! type parameter, for callers (such as the C ABI) that only learn the
//! dtype at run time.

use crate::dtype::{DType, Element};
use crate::error::TensorError;
use crate::tensor::Tensor;

/// A tensor of any supported element type.
#[derive(Debug)]
pub enum DynTensor<'a> {
    F32(Tensor<'a, f32>),
    I32(Tensor<'a, i32>),
    U8(Tensor<'a, u8>),
    I8(Tensor<'a, i8>),
}

/// Evaluate `$body` with `$t` bound to the typed tensor inside `$value`.
macro_rules! dispatch {
    ($value:expr, $t:ident => $body:expr) => {
        match $value {
            DynTensor::F32($t) => $body,
            DynTensor::I32($t) => $body,
            DynTensor::U8($t) => $body,
            DynTensor::I8($t) => $body,
        }
    };
}
pub(crate) use dispatch;

/// Element types that have a [`DynTensor`] variant.
pub trait DynElement: Element {
    fn into_dyn(tensor: Tensor<'_, Self>) -> DynTensor<'_>;

    fn as_typed<'t, 'a>(tensor: &'t DynTensor<'a>) -> Option<&'t Tensor<'a, Self>>;

    fn as_typed_mut<'t, 'a>(tensor: &'t mut DynTensor<'a>) -> Option<&'t mut Tensor<'a, Self>>;
}

macro_rules! impl_dyn_element {
    ($ty:ty, $variant:ident) => {
        impl DynElement for $ty {
            fn into_dyn(tensor: Tensor<'_, Self>) -> DynTensor<'_> {
                DynTensor::$variant(tensor)
            }

            fn as_typed<'t, 'a>(tensor: &'t DynTensor<'a>) -> Option<&'t Tensor<'a, Self>> {
                match tensor {
                    DynTensor::$variant(t) => Some(t),
                    _ => None,
                }
            }

            fn as_typed_mut<'t, 'a>(
                tensor: &'t mut DynTensor<'a>,
            ) -> Option<&'t mut Tensor<'a, Self>> {
                match tensor {
                    DynTensor::$variant(t) => Some(t),
                    _ => None,
                }
            }
        }

        impl<'a> From<Tensor<'a, $ty>> for DynTensor<'a> {
            fn from(tensor: Tensor<'a, $ty>) -> Self {
                DynTensor::$variant(tensor)
            }
        }
    };
}

impl_dyn_element!(f32, F32);
impl_dyn_element!(i32, I32);
impl_dyn_element!(u8, U8);
impl_dyn_element!(i8, I8);

impl DynTensor<'static> {
    /// Allocate a zero-initialized tensor of `dtype`.
    ///
    /// # Errors
    ///
    /// Same as [`Tensor::create`].
    ///
    /// # Example
    ///
    /// ```
    /// use ndcontract::{DType, DynTensor};
    ///
    /// let t = DynTensor::create(DType::U8, &[4, 4]).unwrap();
    /// assert_eq!(t.dtype(), DType::U8);
    /// assert_eq!(t.nbytes(), 16);
    /// ```
    pub fn create(dtype: DType, shape: &[usize]) -> Result<Self, TensorError> {
        Ok(match dtype {
            DType::F32 => DynTensor::F32(Tensor::create(shape)?),
            DType::I32 => DynTensor::I32(Tensor::create(shape)?),
            DType::U8 => DynTensor::U8(Tensor::create(shape)?),
            DType::I8 => DynTensor::I8(Tensor::create(shape)?),
        })
    }
}

impl<'a> DynTensor<'a> {
    /// Wrap caller memory; see [`Tensor::wrap`].
    pub fn wrap<T: DynElement>(shape: &[usize], region: &'a mut [T]) -> Result<Self, TensorError> {
        Ok(T::into_dyn(Tensor::wrap(shape, region)?))
    }

    pub fn dtype(&self) -> DType {
        match self {
            DynTensor::F32(_) => DType::F32,
            DynTensor::I32(_) => DType::I32,
            DynTensor::U8(_) => DType::U8,
            DynTensor::I8(_) => DType::I8,
        }
    }

    pub fn shape(&self) -> &[usize] {
        dispatch!(self, t => t.shape())
    }

    pub fn strides(&self) -> &[usize] {
        dispatch!(self, t => t.strides())
    }

    pub fn ndim(&self) -> usize {
        dispatch!(self, t => t.ndim())
    }

    pub fn len(&self) -> usize {
        dispatch!(self, t => t.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn nbytes(&self) -> usize {
        dispatch!(self, t => t.nbytes())
    }

    pub fn owns_memory(&self) -> bool {
        dispatch!(self, t => t.owns_memory())
    }

    /// See [`Tensor::destroy`].
    pub fn destroy(&mut self) {
        dispatch!(self, t => t.destroy())
    }

    /// Address of the first element.
    pub fn as_ptr(&self) -> *const u8 {
        dispatch!(self, t => t.data().as_ptr().cast())
    }

    /// Mutable address of the first element.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        dispatch!(self, t => t.data_mut().as_mut_ptr().cast())
    }

    /// The typed tensor, if `T` matches the dtype.
    pub fn as_typed<T: DynElement>(&self) -> Option<&Tensor<'a, T>> {
        T::as_typed(self)
    }

    pub fn as_typed_mut<T: DynElement>(&mut self) -> Option<&mut Tensor<'a, T>> {
        T::as_typed_mut(self)
    }

    /// Copy borrowed memory into an owning tensor; owned tensors move.
    pub fn into_owned(self) -> Result<DynTensor<'static>, TensorError> {
        Ok(match self {
            DynTensor::F32(t) => DynTensor::F32(t.into_owned()?),
            DynTensor::I32(t) => DynTensor::I32(t.into_owned()?),
            DynTensor::U8(t) => DynTensor::U8(t.into_owned()?),
            DynTensor::I8(t) => DynTensor::I8(t.into_owned()?),
        })
    }
}

/// Check that `actual` matches `expected`.
pub(crate) fn check_dtype(expected: DType, actual: DType) -> Result<(), TensorError> {
    if expected != actual {
        return Err(TensorError::TypeMismatch { expected, actual });
    }
    Ok(())
}
