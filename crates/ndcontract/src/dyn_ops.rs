//! Run-time dtype dispatch for the typed operations.
//!
//! Each function checks that all tensors share one dtype, then forwards to
//! the typed implementation. Nothing is written when the check fails.

use crate::contract::{self, ContractOptions};
use crate::dyn_tensor::{DynElement, DynTensor, check_dtype, dispatch};
use crate::dtype::DType;
use crate::error::TensorError;
use crate::operations::{self, BinaryOp, UnaryOp};
use crate::tensor::Tensor;

/// Element-wise `out = op(a, b)` over tensors of any single dtype.
///
/// # Errors
///
/// `TensorError::TypeMismatch` if the dtypes differ, then the errors of
/// [`operations::apply_binary`].
pub fn apply_binary_dyn(
    op: BinaryOp,
    a: &DynTensor<'_>,
    b: &DynTensor<'_>,
    out: &mut DynTensor<'_>,
) -> Result<(), TensorError> {
    check_dtype(a.dtype(), b.dtype())?;
    check_dtype(a.dtype(), out.dtype())?;
    match (a, b, out) {
        (DynTensor::F32(a), DynTensor::F32(b), DynTensor::F32(out)) => {
            operations::apply_binary(op, a, b, out)
        }
        (DynTensor::I32(a), DynTensor::I32(b), DynTensor::I32(out)) => {
            operations::apply_binary(op, a, b, out)
        }
        (DynTensor::U8(a), DynTensor::U8(b), DynTensor::U8(out)) => {
            operations::apply_binary(op, a, b, out)
        }
        (DynTensor::I8(a), DynTensor::I8(b), DynTensor::I8(out)) => {
            operations::apply_binary(op, a, b, out)
        }
        (a, b, _) => Err(TensorError::TypeMismatch {
            expected: a.dtype(),
            actual: b.dtype(),
        }),
    }
}

/// Element-wise addition over tensors of any single dtype.
///
/// # Example
///
/// ```
/// use ndcontract::{DType, DynTensor, Tensor, add_dyn};
///
/// let a = DynTensor::from(Tensor::from_vec(vec![1i8, 2], &[2]).unwrap());
/// let b = DynTensor::from(Tensor::from_vec(vec![3i8, 4], &[2]).unwrap());
/// let mut out = DynTensor::create(DType::I8, &[2]).unwrap();
/// add_dyn(&a, &b, &mut out).unwrap();
/// assert_eq!(out.as_typed::<i8>().unwrap().data(), &[4, 6]);
///
/// let c = DynTensor::create(DType::U8, &[2]).unwrap();
/// assert!(add_dyn(&a, &c, &mut out).is_err());
/// ```
pub fn add_dyn(
    a: &DynTensor<'_>,
    b: &DynTensor<'_>,
    out: &mut DynTensor<'_>,
) -> Result<(), TensorError> {
    apply_binary_dyn(BinaryOp::Add, a, b, out)
}

/// Element-wise `out = op(a)` over tensors of any single dtype.
pub fn apply_unary_dyn(
    op: UnaryOp,
    a: &DynTensor<'_>,
    out: &mut DynTensor<'_>,
) -> Result<(), TensorError> {
    check_dtype(a.dtype(), out.dtype())?;
    match (a, out) {
        (DynTensor::F32(a), DynTensor::F32(out)) => operations::apply_unary(op, a, out),
        (DynTensor::I32(a), DynTensor::I32(out)) => operations::apply_unary(op, a, out),
        (DynTensor::U8(a), DynTensor::U8(out)) => operations::apply_unary(op, a, out),
        (DynTensor::I8(a), DynTensor::I8(out)) => operations::apply_unary(op, a, out),
        (a, out) => Err(TensorError::TypeMismatch {
            expected: a.dtype(),
            actual: out.dtype(),
        }),
    }
}

/// See [`operations::transpose`].
pub fn transpose_dyn(
    tensor: &DynTensor<'_>,
    axes: &[usize],
) -> Result<DynTensor<'static>, TensorError> {
    dispatch!(tensor, t => operations::transpose(t, axes).map(DynTensor::from))
}

/// See [`operations::diagonal`].
pub fn diagonal_dyn(
    tensor: &DynTensor<'_>,
    axis1: usize,
    axis2: usize,
) -> Result<DynTensor<'static>, TensorError> {
    dispatch!(tensor, t => operations::diagonal(t, axis1, axis2).map(DynTensor::from))
}

/// Borrow every operand as `Tensor<T>`, failing on the first other dtype.
fn typed_operands<'t, 'a, T: DynElement>(
    operands: &[&'t DynTensor<'a>],
) -> Result<Vec<&'t Tensor<'a, T>>, TensorError> {
    operands
        .iter()
        .map(|&op| {
            T::as_typed(op).ok_or(TensorError::TypeMismatch {
                expected: T::DTYPE,
                actual: op.dtype(),
            })
        })
        .collect()
}

fn contract_typed<T: DynElement>(
    expr: &str,
    operands: &[&DynTensor<'_>],
    options: &ContractOptions,
) -> Result<DynTensor<'static>, TensorError> {
    let typed = typed_operands::<T>(operands)?;
    contract::contract(expr, &typed, options).map(T::into_dyn)
}

/// Einsum over operands of one run-time dtype; see [`contract::contract`].
///
/// # Errors
///
/// `TensorError::NullInput` for no operands, `TensorError::TypeMismatch` if
/// the operands do not share a dtype, then the errors of
/// [`contract::contract`].
pub fn contract_dyn(
    expr: &str,
    operands: &[&DynTensor<'_>],
    options: &ContractOptions,
) -> Result<DynTensor<'static>, TensorError> {
    let Some(first) = operands.first() else {
        return Err(TensorError::NullInput { what: "operands" });
    };
    match first.dtype() {
        DType::F32 => contract_typed::<f32>(expr, operands, options),
        DType::I32 => contract_typed::<i32>(expr, operands, options),
        DType::U8 => contract_typed::<u8>(expr, operands, options),
        DType::I8 => contract_typed::<i8>(expr, operands, options),
    }
}

fn contract_into_typed<T: DynElement>(
    expr: &str,
    operands: &[&DynTensor<'_>],
    out: &mut DynTensor<'_>,
    options: &ContractOptions,
) -> Result<(), TensorError> {
    let typed = typed_operands::<T>(operands)?;
    let actual = out.dtype();
    let out = T::as_typed_mut(out).ok_or(TensorError::TypeMismatch {
        expected: T::DTYPE,
        actual,
    })?;
    contract::contract_into(expr, &typed, out, options)
}

/// Einsum into a caller tensor of the operands' dtype; see
/// [`contract::contract_into`].
pub fn contract_into_dyn(
    expr: &str,
    operands: &[&DynTensor<'_>],
    out: &mut DynTensor<'_>,
    options: &ContractOptions,
) -> Result<(), TensorError> {
    let Some(first) = operands.first() else {
        return Err(TensorError::NullInput { what: "operands" });
    };
    match first.dtype() {
        DType::F32 => contract_into_typed::<f32>(expr, operands, out, options),
        DType::I32 => contract_into_typed::<i32>(expr, operands, out, options),
        DType::U8 => contract_into_typed::<u8>(expr, operands, out, options),
        DType::I8 => contract_into_typed::<i8>(expr, operands, out, options),
    }
}
