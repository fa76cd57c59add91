//! ndcontract - n-dimensional tensors with einsum contraction
//!
//! Dense row-major tensors over `f32`, `i32`, `u8` and `i8`, with
//! element-wise arithmetic, axis permutation, diagonal extraction and a
//! memory-bounded einsum engine.
//!
//! # Architecture
//!
//! ```text
//! Level 1: Einsum (contract module)
//!     → parse + resolve labels
//!     → greedy plan under a memory budget
//!     → execute: GEMM fast path or strided reduction
//!
//! Level 2: Tensor operations (operations module)
//!     → add / apply_binary, transpose, diagonal
//!
//! Level 3: Backend implementation (backend module)
//!     → FaerBackend (f32 matmul)
//!     → GenericBackend (wrapping loops, all dtypes)
//! ```
//!
//! Typed functions take `Tensor<'_, T>`; the `*_dyn` twins take
//! [`DynTensor`] and check dtypes at run time.
//!
//! # Example
//!
//! ```
//! use ndcontract::{ContractOptions, Tensor, contract};
//!
//! // Wrap caller memory; the tensor borrows it and never frees it.
//! let mut memory = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
//! let a = Tensor::wrap(&[2, 3], &mut memory).unwrap();
//!
//! // Owned, zero-initialized
//! let mut b = Tensor::<f32>::create(&[3, 2]).unwrap();
//! b.fill(1.0);
//!
//! let c = contract("ij,jk->ik", &[&a, &b], &ContractOptions::default()).unwrap();
//! assert_eq!(c.shape(), &[2, 2]);
//! assert_eq!(c.data(), &[6.0, 6.0, 15.0, 15.0]);
//! ```

pub mod backend;
pub mod contract;
pub mod dtype;
pub mod dyn_ops;
pub mod dyn_tensor;
pub mod error;
pub mod operations;
pub mod random;
pub mod storage;
pub mod strides;
pub mod tensor;
pub mod view;

pub use contract::{
    ContractOptions, ContractionPlan, ContractionStep, DEFAULT_MEMORY_BUDGET, StepKernel,
    contract, contract_into, contraction_path,
};
pub use dtype::{DType, Element};
pub use dyn_ops::{
    add_dyn, apply_binary_dyn, apply_unary_dyn, contract_dyn, contract_into_dyn, diagonal_dyn,
    transpose_dyn,
};
pub use dyn_tensor::{DynElement, DynTensor};
pub use error::{ErrorKind, TensorError};
pub use operations::{BinaryOp, UnaryOp, add, apply_binary, diagonal, transpose};
pub use storage::Storage;
pub use tensor::{OwnedTensor, Tensor};
pub use view::TensorView;
