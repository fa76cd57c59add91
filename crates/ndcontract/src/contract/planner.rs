//! Greedy, memory-bounded contraction ordering.
//!
//! Operands live in a pool. Each round scores every unordered pair by
//! [`pair_cost`], skips pairs whose intermediate would exceed the memory
//! budget, and contracts the cheapest. The pair `(i, j)` with `i < j` is
//! removed from the pool (`j` first, then `i`) and its intermediate is
//! appended at the end, so the indices recorded in each step refer to the
//! pool exactly as the executor will see it.

use tracing::{debug, trace};

use crate::contract::cost::{intermediate_bytes, pair_cost, surviving_labels};
use crate::contract::labels::{Label, LabelMap, ResolvedExpression, unique_labels};
use crate::contract::options::ContractOptions;
use crate::contract::properties::ContractionProperties;
use crate::dtype::DType;
use crate::error::TensorError;

/// Kernel chosen for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKernel {
    /// Batched matrix multiply over a single shared label.
    Gemm,
    /// Strided reduction over any label pattern.
    General,
}

/// One pairwise contraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractionStep {
    /// Pool position of the left operand.
    pub left: usize,
    /// Pool position of the right operand; always greater than `left`.
    pub right: usize,
    pub left_labels: Vec<Label>,
    pub right_labels: Vec<Label>,
    /// Labels summed away by this step.
    pub contracted: Vec<Label>,
    /// Labels of the intermediate, in storage order.
    pub output_labels: Vec<Label>,
    pub estimated_cost: usize,
    pub intermediate_bytes: usize,
    pub kernel: StepKernel,
}

/// Ordered list of pairwise steps for one expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractionPlan {
    pub dtype: DType,
    /// Operand labels as written, repeats included.
    pub input_labels: Vec<Vec<Label>>,
    pub output_labels: Vec<Label>,
    pub sizes: LabelMap,
    pub steps: Vec<ContractionStep>,
    /// Sum of step costs, saturating.
    pub total_cost: usize,
    /// Largest intermediate the plan materializes, final output included.
    pub peak_intermediate_bytes: usize,
}

impl ContractionPlan {
    /// Shape of the result as returned by the executor.
    pub fn output_shape(&self) -> Vec<usize> {
        if self.output_labels.is_empty() {
            vec![1]
        } else {
            self.sizes.shape_of(&self.output_labels)
        }
    }

    /// Shape each operand must have, in operand order.
    pub fn input_shapes(&self) -> Vec<Vec<usize>> {
        self.input_labels
            .iter()
            .map(|labels| self.sizes.shape_of(labels))
            .collect()
    }
}

struct Candidate {
    left: usize,
    right: usize,
    output_labels: Vec<Label>,
    cost: usize,
    bytes: usize,
}

/// Plan the contraction of `resolved` for elements of `dtype`.
///
/// Pairs are scored by [`pair_cost`]; the first pair in `(i, j)` order
/// wins ties. The final step writes the declared output order directly.
///
/// # Errors
///
/// Returns `TensorError::MemoryLimitExceeded` when, at some round, every
/// remaining pair would materialize more than `options.memory_budget`
/// bytes, or when the final output alone exceeds it. `required` is the
/// smallest intermediate that was rejected.
pub fn plan_contraction(
    resolved: &ResolvedExpression,
    dtype: DType,
    options: &ContractOptions,
) -> Result<ContractionPlan, TensorError> {
    let sizes = &resolved.labels;
    let output = &resolved.output;
    let budget = options.memory_budget;

    let mut pool: Vec<Vec<Label>> = resolved.inputs.iter().map(|l| unique_labels(l)).collect();
    let mut steps = Vec::with_capacity(pool.len().saturating_sub(1));
    let mut total_cost = 0usize;

    while pool.len() > 1 {
        let is_last = pool.len() == 2;
        let mut best: Option<Candidate> = None;
        let mut smallest_rejected = usize::MAX;

        for i in 0..pool.len() {
            for j in (i + 1)..pool.len() {
                let output_labels = if is_last {
                    output.clone()
                } else {
                    let needed = |label: Label| {
                        output.contains(&label)
                            || pool
                                .iter()
                                .enumerate()
                                .any(|(k, labels)| k != i && k != j && labels.contains(&label))
                    };
                    surviving_labels(&pool[i], &pool[j], needed)
                };

                let bytes = intermediate_bytes(&output_labels, sizes, dtype);
                if bytes > budget {
                    trace!(left = i, right = j, bytes, budget, "pair exceeds memory budget");
                    smallest_rejected = smallest_rejected.min(bytes);
                    continue;
                }

                let cost = pair_cost(&pool[i], &pool[j], sizes);
                trace!(left = i, right = j, cost, bytes, "candidate pair");
                if best.as_ref().is_none_or(|b| cost < b.cost) {
                    best = Some(Candidate {
                        left: i,
                        right: j,
                        output_labels,
                        cost,
                        bytes,
                    });
                }
            }
        }

        let Some(best) = best else {
            debug!(budget, required = smallest_rejected, "no pair fits the memory budget");
            return Err(TensorError::MemoryLimitExceeded {
                budget,
                required: smallest_rejected,
            });
        };

        let right_labels = pool.remove(best.right);
        let left_labels = pool.remove(best.left);
        let props = ContractionProperties::compute(&left_labels, &right_labels, &best.output_labels);
        let kernel = if options.use_gemm && props.is_gemm_eligible() {
            StepKernel::Gemm
        } else {
            StepKernel::General
        };

        trace!(
            left = best.left,
            right = best.right,
            cost = best.cost,
            ?kernel,
            "selected pair"
        );

        total_cost = total_cost.saturating_add(best.cost);
        pool.push(best.output_labels.clone());
        steps.push(ContractionStep {
            left: best.left,
            right: best.right,
            left_labels,
            right_labels,
            contracted: props.contracted,
            output_labels: best.output_labels,
            estimated_cost: best.cost,
            intermediate_bytes: best.bytes,
            kernel,
        });
    }

    // The result is always materialized, also when no step ran.
    let output_bytes = intermediate_bytes(output, sizes, dtype);
    if output_bytes > budget {
        debug!(budget, required = output_bytes, "output exceeds memory budget");
        return Err(TensorError::MemoryLimitExceeded {
            budget,
            required: output_bytes,
        });
    }

    let peak_intermediate_bytes = steps
        .iter()
        .map(|s| s.intermediate_bytes)
        .fold(output_bytes, usize::max);

    debug!(
        steps = steps.len(),
        total_cost, peak_intermediate_bytes, "contraction planned"
    );

    Ok(ContractionPlan {
        dtype,
        input_labels: resolved.inputs.clone(),
        output_labels: output.clone(),
        sizes: sizes.clone(),
        steps,
        total_cost,
        peak_intermediate_bytes,
    })
}
