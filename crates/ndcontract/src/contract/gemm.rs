//! GEMM-based pairwise contraction.
//!
//! Operands are rearranged to `[batch, m, k]` and `[batch, k, n]` (copied
//! only when the strided view is not already in that order), multiplied one
//! batch slice at a time through [`Element::gemm`], and the
//! `[batch, m, n]` result is permuted to the requested output order.

use std::borrow::Cow;

use crate::contract::labels::{Label, LabelMap};
use crate::contract::properties::{ContractionProperties, is_identity_perm, label_permutation};
use crate::dtype::Element;
use crate::error::TensorError;
use crate::storage::alloc_vec;
use crate::tensor::{OwnedTensor, Tensor};
use crate::view::TensorView;

/// Row-major data of `view` with its axes reordered from `labels` to `order`.
fn arrange<'b, T: Element>(
    view: &TensorView<'b, T>,
    labels: &[Label],
    order: &[Label],
) -> Result<Cow<'b, [T]>, TensorError> {
    let perm = label_permutation(labels, order).ok_or_else(|| {
        TensorError::invalid_contraction(format!("labels {labels:?} cannot be arranged as {order:?}"))
    })?;
    let arranged = view.permute(&perm)?;
    let len = arranged.len();
    if arranged.is_contiguous() {
        return Ok(Cow::Borrowed(&arranged.base()[..len]));
    }
    let mut buf = alloc_vec(len)?;
    arranged.copy_into(&mut buf);
    Ok(Cow::Owned(buf))
}

/// Contract two operands whose only summed label is shared by both.
///
/// The result is laid out as `props.output_labels`; an empty output gives
/// shape `[1]`.
///
/// # Errors
///
/// Returns `TensorError::InvalidContraction` if the step is not a
/// single-label matrix multiply, and `TensorError::AllocError` if a
/// rearranged copy or the result cannot be allocated.
pub(crate) fn contract_gemm<T: Element>(
    left: &TensorView<'_, T>,
    left_labels: &[Label],
    right: &TensorView<'_, T>,
    right_labels: &[Label],
    props: &ContractionProperties,
    sizes: &LabelMap,
) -> Result<OwnedTensor<T>, TensorError> {
    if !props.is_gemm_eligible() {
        return Err(TensorError::invalid_contraction(
            "step does not contract exactly one shared label",
        ));
    }

    let (batch, m, k, n) = props.gemm_dims(sizes);
    let a = arrange(left, left_labels, &props.gemm_left_order())?;
    let b = arrange(right, right_labels, &props.gemm_right_order())?;

    let gemm_order = props.gemm_output_order();
    let gemm_shape = sizes.shape_of(&gemm_order);
    let mut c = if gemm_shape.is_empty() {
        Tensor::create(&[1])?
    } else {
        Tensor::create(&gemm_shape)?
    };

    let (a_blk, b_blk, c_blk) = (m * k, k * n, m * n);
    let c_data = c.data_mut();
    for p in 0..batch {
        T::gemm(
            m,
            k,
            n,
            &a[p * a_blk..(p + 1) * a_blk],
            &b[p * b_blk..(p + 1) * b_blk],
            &mut c_data[p * c_blk..(p + 1) * c_blk],
        );
    }

    let perm = label_permutation(&gemm_order, &props.output_labels).ok_or_else(|| {
        TensorError::invalid_contraction(format!(
            "output {:?} is not a reordering of {gemm_order:?}",
            props.output_labels
        ))
    })?;
    if is_identity_perm(&perm) {
        return Ok(c);
    }
    c.view().permute(&perm)?.to_tensor()
}
