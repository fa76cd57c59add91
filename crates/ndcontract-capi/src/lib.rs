//! C API for ndcontract
//!
//! This crate exposes tensors and einsum contraction through an opaque
//! `ndc_tensor` handle, so the library can be called from C, Python, Julia
//! and other languages.
//!
//! All extern "C" functions work with raw pointers from foreign code. The
//! `#[unsafe(no_mangle)]` attribute marks the entire function signature as
//! unsafe at the FFI boundary. Every entry point catches panics and reports
//! them as `NDC_INTERNAL_ERROR`.

#![allow(clippy::not_unsafe_ptr_arg_deref)]

use libc::{c_char, c_int, c_void, size_t};
use ndcontract::{
    ContractOptions, DType, DynElement, DynTensor, ErrorKind, TensorError, add_dyn, contract_dyn,
    diagonal_dyn, transpose_dyn,
};
use std::ffi::CStr;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::ptr;

// Status codes
pub type StatusCode = c_int;

pub const NDC_SUCCESS: StatusCode = 0;
pub const NDC_NULL_INPUT: StatusCode = -1;
pub const NDC_SHAPE_MISMATCH: StatusCode = -2;
pub const NDC_TYPE_MISMATCH: StatusCode = -3;
pub const NDC_INVALID_AXIS: StatusCode = -4;
pub const NDC_ALLOC_ERROR: StatusCode = -5;
pub const NDC_MEMORY_LIMIT_EXCEEDED: StatusCode = -6;
pub const NDC_INVALID_CONTRACTION: StatusCode = -7;
pub const NDC_INDEX_OUT_OF_BOUNDS: StatusCode = -8;
pub const NDC_INTERNAL_ERROR: StatusCode = -9;

/// Pass as `memory_budget` to `ndc_einsum` to select the 1 GiB default.
pub const NDC_DEFAULT_MEMORY_BUDGET: size_t = size_t::MAX;

// Element type codes
pub type DTypeCode = c_int;

pub const NDC_FLOAT32: DTypeCode = 0;
pub const NDC_INT32: DTypeCode = 1;
pub const NDC_UINT8: DTypeCode = 2;
pub const NDC_INT8: DTypeCode = 3;

/// Opaque tensor handle.
///
/// Created by `ndc_tensor_create`, `ndc_tensor_wrap` or an operation, and
/// released by `ndc_tensor_destroy`. A wrapped handle never frees the
/// caller's memory.
#[allow(non_camel_case_types)]
pub struct ndc_tensor {
    inner: DynTensor<'static>,
}

fn status_code(err: &TensorError) -> StatusCode {
    match err.kind() {
        ErrorKind::NullInput => NDC_NULL_INPUT,
        ErrorKind::ShapeMismatch => NDC_SHAPE_MISMATCH,
        ErrorKind::TypeMismatch => NDC_TYPE_MISMATCH,
        ErrorKind::InvalidAxis => NDC_INVALID_AXIS,
        ErrorKind::AllocError => NDC_ALLOC_ERROR,
        ErrorKind::MemoryLimitExceeded => NDC_MEMORY_LIMIT_EXCEEDED,
        ErrorKind::InvalidContraction => NDC_INVALID_CONTRACTION,
        ErrorKind::IndexOutOfBounds => NDC_INDEX_OUT_OF_BOUNDS,
    }
}

fn dtype_from_code(code: DTypeCode) -> Option<DType> {
    match code {
        NDC_FLOAT32 => Some(DType::F32),
        NDC_INT32 => Some(DType::I32),
        NDC_UINT8 => Some(DType::U8),
        NDC_INT8 => Some(DType::I8),
        _ => None,
    }
}

fn dtype_code(dtype: DType) -> DTypeCode {
    match dtype {
        DType::F32 => NDC_FLOAT32,
        DType::I32 => NDC_INT32,
        DType::U8 => NDC_UINT8,
        DType::I8 => NDC_INT8,
    }
}

fn set_status(status: *mut StatusCode, code: StatusCode) {
    if !status.is_null() {
        unsafe {
            *status = code;
        }
    }
}

/// Run `f`, box a successful tensor and report the outcome through `status`.
fn boxed_result(
    status: *mut StatusCode,
    f: impl FnOnce() -> Result<DynTensor<'static>, TensorError>,
) -> *mut ndc_tensor {
    let (handle, code) = match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(inner)) => (Box::into_raw(Box::new(ndc_tensor { inner })), NDC_SUCCESS),
        Ok(Err(err)) => (ptr::null_mut(), status_code(&err)),
        Err(_) => (ptr::null_mut(), NDC_INTERNAL_ERROR),
    };
    set_status(status, code);
    handle
}

/// Run `f` and turn its outcome into a status code.
fn status_result(f: impl FnOnce() -> Result<(), TensorError>) -> StatusCode {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => NDC_SUCCESS,
        Ok(Err(err)) => status_code(&err),
        Err(_) => NDC_INTERNAL_ERROR,
    }
}

fn shape_slice<'s>(shape: *const size_t, ndim: size_t) -> Result<&'s [usize], TensorError> {
    if ndim == 0 || shape.is_null() {
        return Err(TensorError::NullInput { what: "shape" });
    }
    Ok(unsafe { std::slice::from_raw_parts(shape, ndim) })
}

fn tensor_ref<'t>(tensor: *const ndc_tensor) -> Result<&'t ndc_tensor, TensorError> {
    if tensor.is_null() {
        return Err(TensorError::NullInput { what: "tensor" });
    }
    Ok(unsafe { &*tensor })
}

// ============================================================================
// Tensor lifecycle functions
// ============================================================================

/// Create a new zero-initialized tensor that owns its memory.
///
/// # Arguments
/// * `dtype` - One of the `NDC_FLOAT32`, `NDC_INT32`, `NDC_UINT8`, `NDC_INT8` codes
/// * `shape` - Pointer to array of dimensions (row-major)
/// * `ndim` - Number of dimensions, at least 1
/// * `status` - Pointer to receive status code (may be null)
///
/// # Returns
/// Pointer to new tensor, or null on error
#[unsafe(no_mangle)]
pub extern "C" fn ndc_tensor_create(
    dtype: DTypeCode,
    shape: *const size_t,
    ndim: size_t,
    status: *mut StatusCode,
) -> *mut ndc_tensor {
    boxed_result(status, || {
        let dtype = dtype_from_code(dtype).ok_or(TensorError::NullInput { what: "dtype" })?;
        DynTensor::create(dtype, shape_slice(shape, ndim)?)
    })
}

fn wrap_region<T: DynElement>(
    data: *mut c_void,
    shape: &[usize],
) -> Result<DynTensor<'static>, TensorError> {
    let len = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or(TensorError::AllocError { bytes: usize::MAX })?;
    let region: &'static mut [T] = if len == 0 {
        &mut []
    } else if data.is_null() {
        return Err(TensorError::NullInput { what: "data" });
    } else {
        unsafe { std::slice::from_raw_parts_mut(data.cast::<T>(), len) }
    };
    DynTensor::wrap(shape, region)
}

/// Wrap caller memory as a tensor without taking ownership.
///
/// `data` must hold at least `product(shape)` elements of `dtype`, suitably
/// aligned, and must stay valid until the handle is destroyed. Destroying
/// the handle never frees `data`.
///
/// # Returns
/// Pointer to new tensor, or null on error
#[unsafe(no_mangle)]
pub extern "C" fn ndc_tensor_wrap(
    dtype: DTypeCode,
    data: *mut c_void,
    shape: *const size_t,
    ndim: size_t,
    status: *mut StatusCode,
) -> *mut ndc_tensor {
    boxed_result(status, || {
        let dtype = dtype_from_code(dtype).ok_or(TensorError::NullInput { what: "dtype" })?;
        let shape = shape_slice(shape, ndim)?;
        match dtype {
            DType::F32 => wrap_region::<f32>(data, shape),
            DType::I32 => wrap_region::<i32>(data, shape),
            DType::U8 => wrap_region::<u8>(data, shape),
            DType::I8 => wrap_region::<i8>(data, shape),
        }
    })
}

/// Destroy a tensor handle. Owned memory is freed; wrapped memory is not.
/// A null pointer is ignored.
#[unsafe(no_mangle)]
pub extern "C" fn ndc_tensor_destroy(tensor: *mut ndc_tensor) {
    if !tensor.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| unsafe {
            drop(Box::from_raw(tensor));
        }));
    }
}

// ============================================================================
// Tensor query functions
// ============================================================================

/// Get the number of dimensions, or 0 for a null handle.
#[unsafe(no_mangle)]
pub extern "C" fn ndc_tensor_ndim(tensor: *const ndc_tensor) -> size_t {
    if tensor.is_null() {
        return 0;
    }
    unsafe { (*tensor).inner.ndim() }
}

/// Get the dtype code, or -1 for a null handle.
#[unsafe(no_mangle)]
pub extern "C" fn ndc_tensor_dtype(tensor: *const ndc_tensor) -> DTypeCode {
    if tensor.is_null() {
        return -1;
    }
    unsafe { dtype_code((*tensor).inner.dtype()) }
}

/// Get the shape (dimensions).
///
/// # Arguments
/// * `tensor` - Tensor pointer
/// * `out` - Output array for shape (must have space for ndim elements)
///
/// # Returns
/// Status code
#[unsafe(no_mangle)]
pub extern "C" fn ndc_tensor_shape(tensor: *const ndc_tensor, out: *mut size_t) -> StatusCode {
    if tensor.is_null() || out.is_null() {
        return NDC_NULL_INPUT;
    }
    let shape = unsafe { (*tensor).inner.shape() };
    for (i, &dim) in shape.iter().enumerate() {
        unsafe {
            *out.add(i) = dim;
        }
    }
    NDC_SUCCESS
}

/// Get a pointer to the element data.
///
/// # Safety
/// The returned pointer is only valid while the tensor exists.
#[unsafe(no_mangle)]
pub extern "C" fn ndc_tensor_data(tensor: *mut ndc_tensor) -> *mut c_void {
    if tensor.is_null() {
        return ptr::null_mut();
    }
    unsafe { (*tensor).inner.as_mut_ptr().cast() }
}

// ============================================================================
// Tensor operations
// ============================================================================

/// Element-wise `out = a + b`. All three tensors must share dtype and shape.
///
/// `out` may be the same handle as `a` or `b`.
#[unsafe(no_mangle)]
pub extern "C" fn ndc_tensor_add(
    a: *const ndc_tensor,
    b: *const ndc_tensor,
    out: *mut ndc_tensor,
) -> StatusCode {
    status_result(|| {
        let (a_ref, b_ref) = (tensor_ref(a)?, tensor_ref(b)?);
        if out.is_null() {
            return Err(TensorError::NullInput { what: "out" });
        }

        if ptr::eq(out, a) || ptr::eq(out, b) {
            let mut scratch = DynTensor::create(a_ref.inner.dtype(), a_ref.inner.shape())?;
            add_dyn(&a_ref.inner, &b_ref.inner, &mut scratch)?;
            let out = unsafe { &mut *out };
            unsafe {
                ptr::copy_nonoverlapping(
                    scratch.as_ptr(),
                    out.inner.as_mut_ptr(),
                    scratch.nbytes(),
                );
            }
            return Ok(());
        }

        let out = unsafe { &mut *out };
        add_dyn(&a_ref.inner, &b_ref.inner, &mut out.inner)
    })
}

/// Permute tensor axes into a new tensor.
///
/// # Arguments
/// * `tensor` - Input tensor
/// * `axes` - Permutation array (axes[i] = source axis for output axis i)
/// * `naxes` - Length of `axes` (must match the tensor's ndim)
/// * `status` - Pointer to receive status code (may be null)
///
/// # Returns
/// New tensor with permuted axes, or null on error
#[unsafe(no_mangle)]
pub extern "C" fn ndc_tensor_transpose(
    tensor: *const ndc_tensor,
    axes: *const size_t,
    naxes: size_t,
    status: *mut StatusCode,
) -> *mut ndc_tensor {
    boxed_result(status, || {
        let t = tensor_ref(tensor)?;
        if axes.is_null() {
            return Err(TensorError::NullInput { what: "axes" });
        }
        let axes = unsafe { std::slice::from_raw_parts(axes, naxes) };
        transpose_dyn(&t.inner, axes)
    })
}

/// Diagonal over `axis1` and `axis2` into a new tensor.
///
/// The result drops `axis2` and keeps `axis1` in place with extent
/// `min(shape[axis1], shape[axis2])`.
#[unsafe(no_mangle)]
pub extern "C" fn ndc_tensor_diagonal(
    tensor: *const ndc_tensor,
    axis1: size_t,
    axis2: size_t,
    status: *mut StatusCode,
) -> *mut ndc_tensor {
    boxed_result(status, || {
        let t = tensor_ref(tensor)?;
        diagonal_dyn(&t.inner, axis1, axis2)
    })
}

/// Evaluate an einsum expression such as `"ij,jk->ik"`.
///
/// # Arguments
/// * `expr` - NUL-terminated expression
/// * `operands` - Array of `noperands` tensor handles, all of one dtype
/// * `noperands` - Number of operands, at least 1
/// * `memory_budget` - Largest intermediate in bytes, taken literally (0 admits
///   no intermediate at all); `NDC_DEFAULT_MEMORY_BUDGET` selects the 1 GiB default
/// * `status` - Pointer to receive status code (may be null)
///
/// # Returns
/// New tensor holding the result (shape `[1]` for a full contraction), or
/// null on error
#[unsafe(no_mangle)]
pub extern "C" fn ndc_einsum(
    expr: *const c_char,
    operands: *const *const ndc_tensor,
    noperands: size_t,
    memory_budget: size_t,
    status: *mut StatusCode,
) -> *mut ndc_tensor {
    boxed_result(status, || {
        if expr.is_null() {
            return Err(TensorError::NullInput { what: "expr" });
        }
        if operands.is_null() || noperands == 0 {
            return Err(TensorError::NullInput { what: "operands" });
        }

        let expr = unsafe { CStr::from_ptr(expr) }.to_str().map_err(|_| {
            TensorError::InvalidContraction {
                reason: "expression is not valid UTF-8".to_string(),
            }
        })?;
        let handles = unsafe { std::slice::from_raw_parts(operands, noperands) };
        let tensors = handles
            .iter()
            .map(|&h| tensor_ref(h).map(|t| &t.inner))
            .collect::<Result<Vec<_>, _>>()?;

        let mut options = ContractOptions::default();
        if memory_budget != NDC_DEFAULT_MEMORY_BUDGET {
            options = options.with_memory_budget(memory_budget);
        }
        contract_dyn(expr, &tensors, &options)
    })
}
