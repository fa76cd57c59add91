//! Cost and memory estimates for a pairwise contraction.

use crate::contract::labels::{Label, LabelMap};
use crate::dtype::DType;

/// Number of multiply-adds for contracting two operands: the product of the
/// sizes of every label either side carries. Saturates at `usize::MAX`.
pub fn pair_cost(left: &[Label], right: &[Label], sizes: &LabelMap) -> usize {
    left.iter()
        .chain(right.iter().filter(|l| !left.contains(l)))
        .fold(1usize, |acc, &l| acc.saturating_mul(sizes.size(l)))
}

/// Labels of the intermediate produced by contracting `left` with `right`.
///
/// A label survives if `needed` says some other live operand or the output
/// still refers to it. Order is `left`'s labels first, then `right`'s.
pub fn surviving_labels(
    left: &[Label],
    right: &[Label],
    needed: impl Fn(Label) -> bool,
) -> Vec<Label> {
    let mut out = Vec::new();
    for &label in left.iter().chain(right) {
        if !out.contains(&label) && needed(label) {
            out.push(label);
        }
    }
    out
}

/// Element count of a tensor carrying `labels`, saturating.
pub fn element_count(labels: &[Label], sizes: &LabelMap) -> usize {
    labels
        .iter()
        .fold(1usize, |acc, &l| acc.saturating_mul(sizes.size(l)))
}

/// Bytes needed to materialize a tensor carrying `labels`, saturating.
pub fn intermediate_bytes(labels: &[Label], sizes: &LabelMap, dtype: DType) -> usize {
    element_count(labels, sizes).saturating_mul(dtype.size_of())
}
