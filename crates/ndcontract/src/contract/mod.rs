//! Einsum-style tensor contraction.
//!
//! A contraction goes through four stages:
//!
//! ```text
//! Subscripts::parse      "ij,jk->ik" -> label lists
//! ResolvedExpression     labels bound to operand shapes
//! plan_contraction       greedy pairwise order under a memory budget
//! execute_plan           GEMM or strided reduction per step
//! ```
//!
//! [`contract`] runs all four; [`contraction_path`] stops after planning.
//!
//! # Example
//!
//! ```
//! use ndcontract::{ContractOptions, Tensor, contract};
//!
//! // trace of a 3x3 matrix
//! let m = Tensor::from_vec((0..9).collect::<Vec<i32>>(), &[3, 3]).unwrap();
//! let tr = contract("ii->", &[&m], &ContractOptions::default()).unwrap();
//! assert_eq!(tr.shape(), &[1]);
//! assert_eq!(tr.data(), &[12]);
//! ```

mod cost;
mod einsum;
mod executor;
mod gemm;
mod labels;
mod naive;
mod options;
mod planner;
mod properties;

pub use cost::{element_count, intermediate_bytes, pair_cost, surviving_labels};
pub use einsum::{contract, contract_into, contraction_path};
pub use executor::execute_plan;
pub use labels::{Label, LabelInfo, LabelMap, ResolvedExpression, Subscripts};
pub use options::{ContractOptions, DEFAULT_MEMORY_BUDGET};
pub use planner::{ContractionPlan, ContractionStep, StepKernel, plan_contraction};
pub use properties::ContractionProperties;
