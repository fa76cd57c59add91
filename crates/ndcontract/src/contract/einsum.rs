//! Einsum entry points: parse, resolve, plan, execute.

use tracing::debug;

use crate::contract::executor::execute_plan;
use crate::contract::labels::ResolvedExpression;
use crate::contract::options::ContractOptions;
use crate::contract::planner::{ContractionPlan, plan_contraction};
use crate::dtype::{DType, Element};
use crate::error::TensorError;
use crate::tensor::{OwnedTensor, Tensor};

/// Plan `expr` over operands of the given shapes without running it.
///
/// # Example
///
/// ```
/// use ndcontract::{ContractOptions, DType, contraction_path};
///
/// let plan = contraction_path(
///     "ij,jk,kl->il",
///     &[&[10, 100], &[100, 10], &[10, 1]],
///     DType::F32,
///     &ContractOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(plan.steps.len(), 2);
/// assert_eq!((plan.steps[0].left, plan.steps[0].right), (1, 2));
/// ```
pub fn contraction_path(
    expr: &str,
    shapes: &[&[usize]],
    dtype: DType,
    options: &ContractOptions,
) -> Result<ContractionPlan, TensorError> {
    if shapes.is_empty() {
        return Err(TensorError::NullInput { what: "operands" });
    }
    if shapes.iter().any(|shape| shape.is_empty()) {
        return Err(TensorError::NullInput { what: "tensor" });
    }
    let resolved = ResolvedExpression::from_expr(expr, shapes)?;
    debug!(
        expr,
        output = ?resolved.output,
        labels = resolved.labels.len(),
        "resolved einsum expression"
    );
    plan_contraction(&resolved, dtype, options)
}

/// Evaluate an einsum expression into a new tensor.
///
/// Operands may be owned or wrapped; they are never written. A full
/// contraction (empty output) returns a tensor of shape `[1]`.
///
/// # Errors
///
/// - `TensorError::NullInput` if `operands` is empty or one of them has
///   been destroyed.
/// - `TensorError::InvalidContraction` for a malformed expression or labels
///   that disagree with the operand shapes.
/// - `TensorError::MemoryLimitExceeded` if no ordering keeps every
///   intermediate within `options.memory_budget`.
/// - `TensorError::AllocError` if memory runs out.
///
/// # Example
///
/// ```
/// use ndcontract::{ContractOptions, Tensor, contract};
///
/// let a = Tensor::from_vec(vec![1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
/// let b = Tensor::from_vec(vec![5.0f32, 6.0, 7.0, 8.0], &[2, 2]).unwrap();
/// let c = contract("ij,jk->ik", &[&a, &b], &ContractOptions::default()).unwrap();
/// assert_eq!(c.data(), &[19.0, 22.0, 43.0, 50.0]);
/// ```
pub fn contract<T: Element>(
    expr: &str,
    operands: &[&Tensor<'_, T>],
    options: &ContractOptions,
) -> Result<OwnedTensor<T>, TensorError> {
    let shapes: Vec<&[usize]> = operands.iter().map(|t| t.shape()).collect();
    let plan = contraction_path(expr, &shapes, T::DTYPE, options)?;
    execute_plan(&plan, operands)
}

/// Evaluate an einsum expression into a caller-provided tensor.
///
/// `out` must already have the result shape. It is written only after the
/// whole contraction succeeded, so on error its contents are unchanged.
///
/// # Errors
///
/// As [`contract`], plus `TensorError::ShapeMismatch` if `out` has the
/// wrong shape.
pub fn contract_into<T: Element>(
    expr: &str,
    operands: &[&Tensor<'_, T>],
    out: &mut Tensor<'_, T>,
    options: &ContractOptions,
) -> Result<(), TensorError> {
    let shapes: Vec<&[usize]> = operands.iter().map(|t| t.shape()).collect();
    let plan = contraction_path(expr, &shapes, T::DTYPE, options)?;

    let expected = plan.output_shape();
    if out.shape() != expected.as_slice() {
        return Err(TensorError::ShapeMismatch {
            expected,
            actual: out.shape().to_vec(),
        });
    }

    let result = execute_plan(&plan, operands)?;
    out.data_mut().copy_from_slice(result.data());
    Ok(())
}
