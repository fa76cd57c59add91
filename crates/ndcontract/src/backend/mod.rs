//! Backend abstraction for dense matrix multiplication.
//!
//! The contraction engine reduces eligible steps to batched row-major GEMM
//! calls and dispatches them through [`GemmBackend`]:
//!
//! - `GenericBackend`: loop-based, wrapping arithmetic, works for every dtype
//! - `FaerBackend`: faer's `matmul`, used for `f32`
//!
//! Which backend an element type uses is decided by [`Element::gemm`].
//!
//! [`Element::gemm`]: crate::dtype::Element::gemm

mod faer_interop;
mod generic;

pub use faer_interop::FaerBackend;
pub use generic::GenericBackend;

/// Backend trait for row-major matrix products.
pub trait GemmBackend<T> {
    /// Compute `c = a * b` where `a` is `m x k`, `b` is `k x n` and `c` is
    /// `m x n`, all dense row-major. `c` is overwritten.
    ///
    /// # Panics
    ///
    /// Panics if a slice length disagrees with its dimensions.
    fn gemm(m: usize, k: usize, n: usize, a: &[T], b: &[T], c: &mut [T]);
}
