//! Element-wise tensor operations.
//!
//! All inputs and the output must have exactly the same shape; there is no
//! broadcasting. Because every tensor is dense row-major, equal shapes imply
//! equal layouts and the operation is a single linear pass.

use crate::dtype::Element;
use crate::error::TensorError;
use crate::tensor::{OwnedTensor, Tensor};

/// Binary element-wise operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
}

impl BinaryOp {
    #[inline]
    pub fn apply<T: Element>(self, x: T, y: T) -> T {
        match self {
            BinaryOp::Add => x.wrapping_add(y),
            BinaryOp::Sub => x.wrapping_sub(y),
            BinaryOp::Mul => x.wrapping_mul(y),
        }
    }
}

/// Unary element-wise operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Abs,
}

impl UnaryOp {
    #[inline]
    pub fn apply<T: Element>(self, x: T) -> T {
        match self {
            UnaryOp::Neg => x.wrapping_neg(),
            UnaryOp::Abs => x.wrapping_abs(),
        }
    }
}

fn check_same_shape(expected: &[usize], actual: &[usize]) -> Result<(), TensorError> {
    if expected != actual {
        return Err(TensorError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}

/// Apply `op` element-wise: `out[i] = op(a[i], b[i])`.
///
/// `out` may be an owned or a wrapped tensor. Nothing is written unless all
/// shapes agree.
///
/// # Errors
///
/// - `TensorError::NullInput` if the tensors have been destroyed.
/// - `TensorError::ShapeMismatch` if `a`, `b` and `out` differ in shape.
///
/// # Example
///
/// ```
/// use ndcontract::Tensor;
/// use ndcontract::operations::{BinaryOp, apply_binary};
///
/// let a = Tensor::from_vec(vec![1, 2, 3], &[3]).unwrap();
/// let b = Tensor::from_vec(vec![4, 5, 6], &[3]).unwrap();
/// let mut out = Tensor::<i32>::create(&[3]).unwrap();
/// apply_binary(BinaryOp::Mul, &a, &b, &mut out).unwrap();
/// assert_eq!(out.data(), &[4, 10, 18]);
/// ```
pub fn apply_binary<T: Element>(
    op: BinaryOp,
    a: &Tensor<'_, T>,
    b: &Tensor<'_, T>,
    out: &mut Tensor<'_, T>,
) -> Result<(), TensorError> {
    a.check_live()?;
    check_same_shape(a.shape(), b.shape())?;
    check_same_shape(a.shape(), out.shape())?;

    for ((o, &x), &y) in out.data_mut().iter_mut().zip(a.data()).zip(b.data()) {
        *o = op.apply(x, y);
    }
    Ok(())
}

/// Element-wise addition into `out`, wrapping on integer overflow.
///
/// # Example
///
/// ```
/// use ndcontract::Tensor;
/// use ndcontract::operations::add;
///
/// let a = Tensor::from_vec(vec![250u8, 1], &[2]).unwrap();
/// let b = Tensor::from_vec(vec![10u8, 2], &[2]).unwrap();
/// let mut out = Tensor::<u8>::create(&[2]).unwrap();
/// add(&a, &b, &mut out).unwrap();
/// assert_eq!(out.data(), &[4, 3]);
/// ```
pub fn add<T: Element>(
    a: &Tensor<'_, T>,
    b: &Tensor<'_, T>,
    out: &mut Tensor<'_, T>,
) -> Result<(), TensorError> {
    apply_binary(BinaryOp::Add, a, b, out)
}

/// Apply `op` element-wise: `out[i] = op(a[i])`.
///
/// # Errors
///
/// - `TensorError::NullInput` if the tensors have been destroyed.
/// - `TensorError::ShapeMismatch` if `a` and `out` differ in shape.
pub fn apply_unary<T: Element>(
    op: UnaryOp,
    a: &Tensor<'_, T>,
    out: &mut Tensor<'_, T>,
) -> Result<(), TensorError> {
    a.check_live()?;
    check_same_shape(a.shape(), out.shape())?;
    for (o, &x) in out.data_mut().iter_mut().zip(a.data()) {
        *o = op.apply(x);
    }
    Ok(())
}

/// Multiply all elements by a scalar, returning a new tensor.
///
/// # Example
///
/// ```
/// use ndcontract::Tensor;
/// use ndcontract::operations::scale;
///
/// let t = Tensor::from_vec(vec![1.0f32, 2.0, 3.0], &[3]).unwrap();
/// let ts = scale(&t, 2.0).unwrap();
/// assert_eq!(ts.data(), &[2.0, 4.0, 6.0]);
/// ```
pub fn scale<T: Element>(tensor: &Tensor<'_, T>, alpha: T) -> Result<OwnedTensor<T>, TensorError> {
    tensor.check_live()?;
    let mut out = Tensor::create(tensor.shape())?;
    for (o, &x) in out.data_mut().iter_mut().zip(tensor.data()) {
        *o = x.wrapping_mul(alpha);
    }
    Ok(out)
}
