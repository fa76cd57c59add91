//! Plan execution.
//!
//! The pool starts as one strided view per caller operand. Each step removes
//! its two entries (right first, then left), runs the step's kernel, and
//! appends the intermediate; consumed intermediates are dropped right there.
//! Caller buffers are only ever read.

use tracing::{debug, trace};

use crate::contract::gemm::contract_gemm;
use crate::contract::labels::{Label, LabelMap, unique_labels};
use crate::contract::naive::contract_strided;
use crate::contract::planner::{ContractionPlan, ContractionStep, StepKernel};
use crate::contract::properties::ContractionProperties;
use crate::dtype::Element;
use crate::error::TensorError;
use crate::strides::compute_strides;
use crate::tensor::{OwnedTensor, Tensor};
use crate::view::TensorView;

enum Operand<'b, T: Element> {
    Input(TensorView<'b, T>),
    Intermediate(OwnedTensor<T>),
}

struct PoolEntry<'b, T: Element> {
    labels: Vec<Label>,
    operand: Operand<'b, T>,
}

/// Row-major view of an intermediate laid out as `labels`.
fn intermediate_view<'t, T: Element>(
    tensor: &'t OwnedTensor<T>,
    labels: &[Label],
    sizes: &LabelMap,
) -> TensorView<'t, T> {
    let shape = sizes.shape_of(labels);
    tensor.view().with_layout(&shape, &compute_strides(&shape))
}

impl<T: Element> PoolEntry<'_, T> {
    fn view(&self, sizes: &LabelMap) -> TensorView<'_, T> {
        match &self.operand {
            Operand::Input(view) => view.clone(),
            Operand::Intermediate(tensor) => intermediate_view(tensor, &self.labels, sizes),
        }
    }
}

/// Merge the axes of repeated labels into one diagonal axis each.
///
/// The merged axis has the summed stride of its source axes. Labels keep
/// their first-occurrence order.
fn fold_repeated<'b, T: Element>(
    view: TensorView<'b, T>,
    labels: &[Label],
) -> (TensorView<'b, T>, Vec<Label>) {
    let unique = unique_labels(labels);
    if unique.len() == labels.len() {
        return (view, unique);
    }

    let mut shape = Vec::with_capacity(unique.len());
    let mut strides = Vec::with_capacity(unique.len());
    for &label in &unique {
        let mut extent = 0;
        let mut stride = 0;
        for (axis, &l) in labels.iter().enumerate() {
            if l == label {
                extent = view.shape()[axis];
                stride += view.strides()[axis];
            }
        }
        shape.push(extent);
        strides.push(stride);
    }

    trace!(?labels, folded = ?unique, "took diagonal of repeated labels");
    (view.with_layout(&shape, &strides), unique)
}

fn run_step<T: Element>(
    step: &ContractionStep,
    left: &PoolEntry<'_, T>,
    right: &PoolEntry<'_, T>,
    sizes: &LabelMap,
) -> Result<OwnedTensor<T>, TensorError> {
    let lv = left.view(sizes);
    let rv = right.view(sizes);
    let props = ContractionProperties::compute(&left.labels, &right.labels, &step.output_labels);
    trace!(
        kernel = ?step.kernel,
        outer = props.is_outer_product(),
        full = props.is_full_contraction(),
        batch = props.batch.len(),
        "running step"
    );
    match step.kernel {
        StepKernel::Gemm => contract_gemm(&lv, &left.labels, &rv, &right.labels, &props, sizes),
        StepKernel::General => contract_strided(
            &[(&lv, &left.labels[..]), (&rv, &right.labels[..])],
            &step.output_labels,
            sizes,
        ),
    }
}

fn plan_mismatch(reason: &str) -> TensorError {
    TensorError::invalid_contraction(format!("plan does not match operands: {reason}"))
}

/// Run `plan` over `operands`.
///
/// The returned tensor has shape [`ContractionPlan::output_shape`]: the
/// output labels' sizes, or `[1]` for a full contraction.
///
/// # Errors
///
/// Returns `TensorError::TypeMismatch` if `T` is not the plan's dtype,
/// `TensorError::NullInput` for a destroyed operand,
/// `TensorError::ShapeMismatch` if an operand's shape differs from the one
/// the plan was built for, `TensorError::InvalidContraction` if the operand
/// count differs, and `TensorError::AllocError` if an intermediate cannot
/// be allocated.
pub fn execute_plan<T: Element>(
    plan: &ContractionPlan,
    operands: &[&Tensor<'_, T>],
) -> Result<OwnedTensor<T>, TensorError> {
    if T::DTYPE != plan.dtype {
        return Err(TensorError::TypeMismatch {
            expected: plan.dtype,
            actual: T::DTYPE,
        });
    }
    if operands.len() != plan.input_labels.len() {
        return Err(plan_mismatch(&format!(
            "{} operands for {} label groups",
            operands.len(),
            plan.input_labels.len()
        )));
    }
    for (operand, expected) in operands.iter().zip(plan.input_shapes()) {
        operand.check_live()?;
        if operand.shape() != expected.as_slice() {
            return Err(TensorError::ShapeMismatch {
                expected,
                actual: operand.shape().to_vec(),
            });
        }
    }

    let sizes = &plan.sizes;
    let mut pool: Vec<PoolEntry<'_, T>> = operands
        .iter()
        .zip(&plan.input_labels)
        .map(|(tensor, labels)| {
            let (view, labels) = fold_repeated(tensor.view(), labels);
            PoolEntry {
                labels,
                operand: Operand::Input(view),
            }
        })
        .collect();

    for (n, step) in plan.steps.iter().enumerate() {
        if step.left >= step.right || step.right >= pool.len() {
            return Err(plan_mismatch("step refers outside the operand pool"));
        }
        let right = pool.remove(step.right);
        let left = pool.remove(step.left);
        if left.labels != step.left_labels || right.labels != step.right_labels {
            return Err(plan_mismatch("step labels differ from pooled operands"));
        }

        let result = run_step(step, &left, &right, sizes)?;
        trace!(
            step = n,
            kernel = ?step.kernel,
            labels = ?step.output_labels,
            "step finished, releasing operands"
        );
        drop((left, right));
        pool.push(PoolEntry {
            labels: step.output_labels.clone(),
            operand: Operand::Intermediate(result),
        });
    }

    let last = match (pool.pop(), pool.is_empty()) {
        (Some(last), true) => last,
        _ => return Err(plan_mismatch("steps do not reduce to one operand")),
    };

    let result = match last.operand {
        Operand::Intermediate(tensor) if last.labels == plan.output_labels => tensor,
        Operand::Intermediate(tensor) => {
            let view = intermediate_view(&tensor, &last.labels, sizes);
            contract_strided(&[(&view, &last.labels[..])], &plan.output_labels, sizes)?
        }
        Operand::Input(view) => {
            contract_strided(&[(&view, &last.labels[..])], &plan.output_labels, sizes)?
        }
    };

    debug!(shape = ?result.shape(), steps = plan.steps.len(), "contraction executed");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::labels::ResolvedExpression;
    use crate::contract::options::ContractOptions;
    use crate::contract::planner::plan_contraction;
    use crate::dtype::DType;

    fn plan_for(expr: &str, shapes: &[&[usize]], dtype: DType) -> ContractionPlan {
        let r = ResolvedExpression::from_expr(expr, shapes).unwrap();
        plan_contraction(&r, dtype, &ContractOptions::default()).unwrap()
    }

    #[test]
    fn test_fold_repeated_trace_view() {
        let t = Tensor::from_vec((0..9).collect::<Vec<i32>>(), &[3, 3]).unwrap();
        let (view, labels) = fold_repeated(t.view(), &['i', 'i']);
        assert_eq!(labels, vec!['i']);
        assert_eq!(view.shape(), &[3]);
        assert_eq!(view.iter().collect::<Vec<_>>(), vec![0, 4, 8]);
    }

    #[test]
    fn test_three_operand_chain() {
        let a = Tensor::from_vec(vec![1i32, 2, 3, 4], &[2, 2]).unwrap();
        let b = Tensor::from_vec(vec![0i32, 1, 1, 0], &[2, 2]).unwrap();
        let c = Tensor::from_vec(vec![2i32, 0, 0, 2], &[2, 2]).unwrap();
        let plan = plan_for("ij,jk,kl->il", &[&[2, 2], &[2, 2], &[2, 2]], DType::I32);
        assert_eq!(plan.steps.len(), 2);
        let out = execute_plan(&plan, &[&a, &b, &c]).unwrap();
        // a * swap * 2I
        assert_eq!(out.data(), &[4, 2, 8, 6]);
    }

    #[test]
    fn test_single_operand_trace() {
        let t = Tensor::from_vec((0..9).map(|x| x as f32).collect(), &[3, 3]).unwrap();
        let plan = plan_for("ii->", &[&[3, 3]], DType::F32);
        let out = execute_plan(&plan, &[&t]).unwrap();
        assert_eq!(out.shape(), &[1]);
        assert_eq!(out.data(), &[12.0]);
    }

    #[test]
    fn test_wrong_dtype_and_shape() {
        let plan = plan_for("ij,jk->ik", &[&[2, 3], &[3, 4]], DType::F32);
        let a = Tensor::<i32>::ones(&[2, 3]).unwrap();
        let b = Tensor::<i32>::ones(&[3, 4]).unwrap();
        assert!(matches!(
            execute_plan(&plan, &[&a, &b]),
            Err(TensorError::TypeMismatch { .. })
        ));

        let a = Tensor::<f32>::ones(&[2, 3]).unwrap();
        let b = Tensor::<f32>::ones(&[3, 5]).unwrap();
        assert!(matches!(
            execute_plan(&plan, &[&a, &b]),
            Err(TensorError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_gemm_and_general_agree() {
        let a = Tensor::from_vec((0..12).map(|x| x as i8).collect(), &[3, 4]).unwrap();
        let b = Tensor::from_vec((0..20).map(|x| x as i8 - 7).collect(), &[4, 5]).unwrap();
        let r = ResolvedExpression::from_expr("ij,jk->ki", &[a.shape(), b.shape()]).unwrap();
        let fast = plan_contraction(&r, DType::I8, &ContractOptions::default()).unwrap();
        let slow = plan_contraction(&r, DType::I8, &ContractOptions::default().with_gemm(false)).unwrap();
        assert_eq!(fast.steps[0].kernel, StepKernel::Gemm);
        assert_eq!(slow.steps[0].kernel, StepKernel::General);
        assert_eq!(
            execute_plan(&fast, &[&a, &b]).unwrap(),
            execute_plan(&slow, &[&a, &b]).unwrap()
        );
    }
}
