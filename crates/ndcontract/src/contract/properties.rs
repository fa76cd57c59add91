//! Contraction properties for GEMM optimization.
//!
//! A pairwise step `C[out] = sum A[left] * B[right]` sorts its labels into
//! four groups:
//! - batch: on both sides and kept in the output
//! - left free / right free: on one side only and kept
//! - contracted: summed away
//!
//! When exactly one label is contracted and both sides carry it, the step is
//! a batched matrix multiply: `A` laid out as `[batch, left_free, k]`, `B` as
//! `[batch, k, right_free]`, and `C` produced as
//! `[batch, left_free, right_free]`.

use crate::contract::labels::{Label, LabelMap};

/// Label grouping of one pairwise contraction step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractionProperties {
    /// Labels on both sides that appear in the output.
    pub batch: Vec<Label>,

    /// Labels only on the left that appear in the output.
    pub left_free: Vec<Label>,

    /// Labels only on the right that appear in the output.
    pub right_free: Vec<Label>,

    /// Labels summed over, left-first order.
    pub contracted: Vec<Label>,

    /// Requested output order.
    pub output_labels: Vec<Label>,

    shared_contracted: bool,
}

impl ContractionProperties {
    /// Group the labels of `left` and `right` against `output_labels`.
    ///
    /// Every output label must be carried by at least one side.
    ///
    /// # Example
    ///
    /// ```
    /// use ndcontract::contract::ContractionProperties;
    ///
    /// // C[b,i,k] = A[b,i,j] * B[b,j,k]
    /// let props = ContractionProperties::compute(
    ///     &['b', 'i', 'j'],
    ///     &['b', 'j', 'k'],
    ///     &['b', 'i', 'k'],
    /// );
    /// assert_eq!(props.batch, vec!['b']);
    /// assert_eq!(props.contracted, vec!['j']);
    /// assert!(props.is_gemm_eligible());
    /// ```
    pub fn compute(left: &[Label], right: &[Label], output_labels: &[Label]) -> Self {
        let mut batch = Vec::new();
        let mut left_free = Vec::new();
        let mut right_free = Vec::new();
        let mut contracted = Vec::new();

        for &l in left {
            let kept = output_labels.contains(&l);
            match (kept, right.contains(&l)) {
                (true, true) => batch.push(l),
                (true, false) => left_free.push(l),
                (false, _) => contracted.push(l),
            }
        }
        for &r in right {
            if left.contains(&r) {
                continue;
            }
            if output_labels.contains(&r) {
                right_free.push(r);
            } else {
                contracted.push(r);
            }
        }

        let shared_contracted = contracted.len() == 1
            && left.contains(&contracted[0])
            && right.contains(&contracted[0]);

        Self {
            batch,
            left_free,
            right_free,
            contracted,
            output_labels: output_labels.to_vec(),
            shared_contracted,
        }
    }

    /// Whether the step is a batched matrix multiply over one shared label.
    #[inline]
    pub fn is_gemm_eligible(&self) -> bool {
        self.shared_contracted
    }

    /// No label summed: every element of the result is a single product.
    pub fn is_outer_product(&self) -> bool {
        self.contracted.is_empty()
    }

    /// Every label summed: the result is a scalar.
    pub fn is_full_contraction(&self) -> bool {
        self.output_labels.is_empty()
    }

    /// Label order of the left operand on the GEMM path.
    pub fn gemm_left_order(&self) -> Vec<Label> {
        concat(&[&self.batch, &self.left_free, &self.contracted])
    }

    /// Label order of the right operand on the GEMM path.
    pub fn gemm_right_order(&self) -> Vec<Label> {
        concat(&[&self.batch, &self.contracted, &self.right_free])
    }

    /// Label order of the GEMM result, before the output permutation.
    pub fn gemm_output_order(&self) -> Vec<Label> {
        concat(&[&self.batch, &self.left_free, &self.right_free])
    }

    /// GEMM dimensions `(batch, m, k, n)`.
    pub fn gemm_dims(&self, sizes: &LabelMap) -> (usize, usize, usize, usize) {
        let prod = |labels: &[Label]| labels.iter().map(|&l| sizes.size(l)).product::<usize>();
        (
            prod(&self.batch),
            prod(&self.left_free),
            prod(&self.contracted),
            prod(&self.right_free),
        )
    }
}

fn concat(parts: &[&[Label]]) -> Vec<Label> {
    parts.iter().flat_map(|p| p.iter().copied()).collect()
}

/// Positions of `target` labels within `source`, or `None` if any is absent.
pub(crate) fn label_permutation(source: &[Label], target: &[Label]) -> Option<Vec<usize>> {
    target
        .iter()
        .map(|t| source.iter().position(|s| s == t))
        .collect()
}

/// Check if a permutation is the identity.
pub(crate) fn is_identity_perm(perm: &[usize]) -> bool {
    perm.iter().enumerate().all(|(i, &p)| i == p)
}
