//! Einsum subscript parsing and label resolution.
//!
//! An expression such as `"ij,jk->ik"` names every axis of every operand
//! with a single ASCII letter. Parsing only checks the grammar; resolution
//! binds labels to the operand shapes and fixes the output label order.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::TensorError;

/// A single axis name.
pub type Label = char;

/// Parsed subscripts of an einsum expression, before shapes are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscripts {
    /// Label list of each operand, in operand order.
    pub inputs: Vec<Vec<Label>>,
    /// Explicit output labels, `None` when the expression has no `->`.
    pub output: Option<Vec<Label>>,
}

fn parse_term(term: &str) -> Result<Vec<Label>, TensorError> {
    term.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                Ok(c)
            } else {
                Err(TensorError::invalid_contraction(format!(
                    "unexpected character {c:?} in subscripts"
                )))
            }
        })
        .collect()
}

impl Subscripts {
    /// Parse an einsum expression.
    ///
    /// Whitespace is ignored. Labels are ASCII letters; operands are
    /// separated by `,`; an optional single `->` introduces the output.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::InvalidContraction` for an empty expression,
    /// more than one `->`, or any character that is not a letter or separator.
    ///
    /// # Example
    ///
    /// ```
    /// use ndcontract::contract::Subscripts;
    ///
    /// let s = Subscripts::parse("ij, jk -> ik").unwrap();
    /// assert_eq!(s.inputs, vec![vec!['i', 'j'], vec!['j', 'k']]);
    /// assert_eq!(s.output, Some(vec!['i', 'k']));
    /// ```
    pub fn parse(expr: &str) -> Result<Self, TensorError> {
        let compact: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(TensorError::invalid_contraction("empty expression"));
        }

        let mut parts = compact.split("->");
        let lhs = parts.next().unwrap_or_default();
        let output = parts.next().map(parse_term).transpose()?;
        if parts.next().is_some() {
            return Err(TensorError::invalid_contraction("more than one '->'"));
        }

        let inputs = lhs.split(',').map(parse_term).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { inputs, output })
    }
}

/// Size of a label and the operands that carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelInfo {
    pub size: usize,
    pub operands: BTreeSet<usize>,
}

/// Label table of a resolved expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    entries: BTreeMap<Label, LabelInfo>,
}

impl LabelMap {
    pub fn get(&self, label: Label) -> Option<&LabelInfo> {
        self.entries.get(&label)
    }

    /// Size bound to `label`; unknown labels have size 1.
    #[inline]
    pub fn size(&self, label: Label) -> usize {
        self.entries.get(&label).map_or(1, |info| info.size)
    }

    /// Sizes of a label list, in order.
    pub fn shape_of(&self, labels: &[Label]) -> Vec<usize> {
        labels.iter().map(|&l| self.size(l)).collect()
    }

    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An expression bound to concrete operand shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExpression {
    /// Labels of each operand as written, repeats included.
    pub inputs: Vec<Vec<Label>>,
    /// Output labels, explicit or inferred.
    pub output: Vec<Label>,
    pub labels: LabelMap,
}

impl ResolvedExpression {
    /// Bind `subscripts` to the operand `shapes`.
    ///
    /// Without an explicit output, the output is every label that occurs
    /// exactly once across all operands, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::InvalidContraction` when the operand count or
    /// any operand's rank disagrees with the subscripts, when one label is
    /// bound to two different sizes, or when the output repeats a label or
    /// names one that no operand carries.
    pub fn resolve(subscripts: &Subscripts, shapes: &[&[usize]]) -> Result<Self, TensorError> {
        if subscripts.inputs.len() != shapes.len() {
            return Err(TensorError::invalid_contraction(format!(
                "expression has {} operands but {} were given",
                subscripts.inputs.len(),
                shapes.len()
            )));
        }

        let mut entries: BTreeMap<Label, LabelInfo> = BTreeMap::new();
        let mut counts: BTreeMap<Label, usize> = BTreeMap::new();
        let mut first_seen: Vec<Label> = Vec::new();

        for (operand, (labels, shape)) in subscripts.inputs.iter().zip(shapes).enumerate() {
            if labels.len() != shape.len() {
                return Err(TensorError::invalid_contraction(format!(
                    "operand {operand} has rank {} but {} labels",
                    shape.len(),
                    labels.len()
                )));
            }

            for (&label, &size) in labels.iter().zip(shape.iter()) {
                match entries.get_mut(&label) {
                    Some(info) if info.size != size => {
                        return Err(TensorError::invalid_contraction(format!(
                            "label '{label}' has size {} and {size}",
                            info.size
                        )));
                    }
                    Some(info) => {
                        info.operands.insert(operand);
                    }
                    None => {
                        entries.insert(
                            label,
                            LabelInfo {
                                size,
                                operands: BTreeSet::from([operand]),
                            },
                        );
                        first_seen.push(label);
                    }
                }
                *counts.entry(label).or_default() += 1;
            }
        }

        let output = match &subscripts.output {
            Some(output) => {
                let mut seen = BTreeSet::new();
                for &label in output {
                    if !seen.insert(label) {
                        return Err(TensorError::invalid_contraction(format!(
                            "output label '{label}' is repeated"
                        )));
                    }
                    if !entries.contains_key(&label) {
                        return Err(TensorError::invalid_contraction(format!(
                            "output label '{label}' does not appear in any operand"
                        )));
                    }
                }
                output.clone()
            }
            None => first_seen
                .into_iter()
                .filter(|label| counts.get(label) == Some(&1))
                .collect(),
        };

        Ok(Self {
            inputs: subscripts.inputs.clone(),
            output,
            labels: LabelMap { entries },
        })
    }

    /// Parse and resolve in one call.
    pub fn from_expr(expr: &str, shapes: &[&[usize]]) -> Result<Self, TensorError> {
        Self::resolve(&Subscripts::parse(expr)?, shapes)
    }

    /// Shape of the result, before the rank-0 to `[1]` promotion.
    pub fn output_shape(&self) -> Vec<usize> {
        self.labels.shape_of(&self.output)
    }

    /// Labels summed away, in table order.
    pub fn contracted_labels(&self) -> Vec<Label> {
        self.labels
            .labels()
            .filter(|label| !self.output.contains(label))
            .collect()
    }
}

/// Distinct labels of `labels`, keeping first occurrences.
pub(crate) fn unique_labels(labels: &[Label]) -> Vec<Label> {
    let mut out: Vec<Label> = Vec::with_capacity(labels.len());
    for &label in labels {
        if !out.contains(&label) {
            out.push(label);
        }
    }
    out
}
