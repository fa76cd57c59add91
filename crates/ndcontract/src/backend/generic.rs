//! Generic (naive loop-based) backend implementation.

use crate::backend::GemmBackend;
use crate::dtype::Element;

/// Generic backend using naive loop-based implementations.
///
/// Always available; integer dtypes go through it so that accumulation keeps
/// native wraparound semantics.
pub struct GenericBackend;

impl<T: Element> GemmBackend<T> for GenericBackend {
    fn gemm(m: usize, k: usize, n: usize, a: &[T], b: &[T], c: &mut [T]) {
        assert_eq!(a.len(), m * k, "lhs has {} elements, expected {m}x{k}", a.len());
        assert_eq!(b.len(), k * n, "rhs has {} elements, expected {k}x{n}", b.len());
        assert_eq!(c.len(), m * n, "out has {} elements, expected {m}x{n}", c.len());

        c.fill(T::zero());
        // i-p-j order keeps the inner loop contiguous in both b and c.
        for i in 0..m {
            let c_row = &mut c[i * n..(i + 1) * n];
            for p in 0..k {
                let a_ip = a[i * k + p];
                let b_row = &b[p * n..(p + 1) * n];
                for (c_ij, &b_pj) in c_row.iter_mut().zip(b_row) {
                    *c_ij = c_ij.wrapping_add(a_ip.wrapping_mul(b_pj));
                }
            }
        }
    }
}
