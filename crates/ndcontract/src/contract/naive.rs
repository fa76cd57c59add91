//! Strided reduction kernel.
//!
//! Handles any label pattern: for every output position, sum the product of
//! the operands over all combinations of the summed labels. A label an
//! operand does not carry gets stride 0 on that operand, so the same loop
//! covers outer products, Hadamard products, traces and partial sums.

use smallvec::SmallVec;

use crate::contract::labels::{Label, LabelMap};
use crate::dtype::Element;
use crate::error::TensorError;
use crate::strides::{flat_offset, increment_index};
use crate::tensor::{OwnedTensor, Tensor};
use crate::view::{Dims, TensorView};

/// Strides of `view` along `targets`; labels absent from `labels` get 0.
fn strides_along<T: Element>(view: &TensorView<'_, T>, labels: &[Label], targets: &[Label]) -> Dims {
    targets
        .iter()
        .map(|t| {
            labels
                .iter()
                .position(|l| l == t)
                .map_or(0, |axis| view.strides()[axis])
        })
        .collect()
}

/// Contract `operands` into a new tensor laid out as `output_labels`.
///
/// Each operand pairs a view with one distinct label per axis. Every label
/// not in `output_labels` is summed. An empty `output_labels` yields a
/// tensor of shape `[1]`.
pub(crate) fn contract_strided<T: Element>(
    operands: &[(&TensorView<'_, T>, &[Label])],
    output_labels: &[Label],
    sizes: &LabelMap,
) -> Result<OwnedTensor<T>, TensorError> {
    let mut summed: Vec<Label> = Vec::new();
    for &(_, labels) in operands {
        for &l in labels {
            if !output_labels.contains(&l) && !summed.contains(&l) {
                summed.push(l);
            }
        }
    }

    let out_shape = sizes.shape_of(output_labels);
    let sum_shape = sizes.shape_of(&summed);
    let mut out = if out_shape.is_empty() {
        Tensor::create(&[1])?
    } else {
        Tensor::create(&out_shape)?
    };
    if out.is_empty() {
        return Ok(out);
    }
    let sum_is_empty = sum_shape.contains(&0);

    let bases: SmallVec<[&[T]; 2]> = operands.iter().map(|&(v, _)| v.base()).collect();
    let out_strides: SmallVec<[Dims; 2]> = operands
        .iter()
        .map(|&(v, labels)| strides_along(v, labels, output_labels))
        .collect();
    let sum_strides: SmallVec<[Dims; 2]> = operands
        .iter()
        .map(|&(v, labels)| strides_along(v, labels, &summed))
        .collect();

    let mut out_index = Dims::from_elem(0, out_shape.len());
    let mut sum_index = Dims::from_elem(0, sum_shape.len());
    let mut origins: SmallVec<[usize; 2]> = SmallVec::from_elem(0, operands.len());

    for slot in out.data_mut().iter_mut() {
        for (origin, strides) in origins.iter_mut().zip(&out_strides) {
            *origin = flat_offset(&out_index, strides);
        }

        let mut acc = T::zero();
        if !sum_is_empty {
            sum_index.fill(0);
            loop {
                let mut term = T::one();
                for ((base, &origin), strides) in bases.iter().zip(&origins).zip(&sum_strides) {
                    term = term.wrapping_mul(base[origin + flat_offset(&sum_index, strides)]);
                }
                acc = acc.wrapping_add(term);
                if !increment_index(&mut sum_index, &sum_shape) {
                    break;
                }
            }
        }

        *slot = acc;
        increment_index(&mut out_index, &out_shape);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::labels::ResolvedExpression;
    use approx::assert_relative_eq;

    fn sizes(expr: &str, shapes: &[&[usize]]) -> LabelMap {
        ResolvedExpression::from_expr(expr, shapes).unwrap().labels
    }

    #[test]
    fn test_matmul() {
        let a = Tensor::from_vec(vec![1i32, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        let b = Tensor::from_vec(vec![7i32, 8, 9, 10, 11, 12], &[3, 2]).unwrap();
        let s = sizes("ij,jk->ik", &[&[2, 3], &[3, 2]]);
        let (av, bv) = (a.view(), b.view());
        let c = contract_strided(&[(&av, &['i', 'j'][..]), (&bv, &['j', 'k'][..])], &['i', 'k'], &s).unwrap();
        assert_eq!(c.shape(), &[2, 2]);
        assert_eq!(c.data(), &[58, 64, 139, 154]);
    }

    #[test]
    fn test_single_operand_sum_and_transpose() {
        let a = Tensor::from_vec(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        let s = sizes("ij->j", &[&[2, 3]]);
        let av = a.view();
        let col = contract_strided(&[(&av, &['i', 'j'][..])], &['j'], &s).unwrap();
        assert_relative_eq!(col.data()[0], 5.0);
        assert_relative_eq!(col.data()[2], 9.0);

        let t = contract_strided(&[(&av, &['i', 'j'][..])], &['j', 'i'], &s).unwrap();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_outer_product() {
        let a = Tensor::from_vec(vec![1u8, 2], &[2]).unwrap();
        let b = Tensor::from_vec(vec![3u8, 4, 5], &[3]).unwrap();
        let s = sizes("i,j->ij", &[&[2], &[3]]);
        let (av, bv) = (a.view(), b.view());
        let c = contract_strided(&[(&av, &['i'][..]), (&bv, &['j'][..])], &['i', 'j'], &s).unwrap();
        assert_eq!(c.data(), &[3, 4, 5, 6, 8, 10]);
    }

    #[test]
    fn test_full_contraction_is_shape_one() {
        let a = Tensor::from_vec(vec![1i8, 2, 3], &[3]).unwrap();
        let s = sizes("i,i->", &[&[3], &[3]]);
        let av = a.view();
        let c = contract_strided(&[(&av, &['i'][..]), (&av, &['i'][..])], &[], &s).unwrap();
        assert_eq!(c.shape(), &[1]);
        assert_eq!(c.data(), &[14]);
    }

    #[test]
    fn test_zero_sized_sum_gives_zeros() {
        let a = Tensor::<i32>::create(&[2, 0]).unwrap();
        let b = Tensor::<i32>::create(&[0, 3]).unwrap();
        let s = sizes("ij,jk->ik", &[&[2, 0], &[0, 3]]);
        let (av, bv) = (a.view(), b.view());
        let c = contract_strided(&[(&av, &['i', 'j'][..]), (&bv, &['j', 'k'][..])], &['i', 'k'], &s).unwrap();
        assert_eq!(c.shape(), &[2, 3]);
        assert!(c.data().iter().all(|&x| x == 0));
    }
}
