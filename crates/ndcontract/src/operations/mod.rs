//! Tensor operations.
//!
//! ```text
//! elementwise   add / apply_binary / apply_unary / scale over equal shapes
//! transpose     axis permutation, materialized through a strided view
//! diagonal      diagonal over two axes, materialized through a strided view
//! ```
//!
//! Every function validates its inputs before writing anything.

mod diagonal;
mod elementwise;
mod transpose;

pub use diagonal::diagonal;
pub use elementwise::{BinaryOp, UnaryOp, add, apply_binary, apply_unary, scale};
pub use transpose::{inverse_permutation, transpose, transpose_into};
