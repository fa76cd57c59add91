//! GEMM through faer.
//!
//! Tensors are row-major, so operands are viewed with
//! `MatRef::from_row_major_slice`; no data is copied on the way in or out.

use faer::linalg::matmul::matmul;
use faer::{Accum, MatMut, MatRef, Par};

use crate::backend::GemmBackend;

/// Backend calling faer's blocked matrix multiply.
pub struct FaerBackend;

impl GemmBackend<f32> for FaerBackend {
    fn gemm(m: usize, k: usize, n: usize, a: &[f32], b: &[f32], c: &mut [f32]) {
        assert_eq!(a.len(), m * k, "lhs has {} elements, expected {m}x{k}", a.len());
        assert_eq!(b.len(), k * n, "rhs has {} elements, expected {k}x{n}", b.len());
        assert_eq!(c.len(), m * n, "out has {} elements, expected {m}x{n}", c.len());

        if m == 0 || n == 0 {
            return;
        }
        if k == 0 {
            c.fill(0.0);
            return;
        }

        let a_mat = MatRef::from_row_major_slice(a, m, k);
        let b_mat = MatRef::from_row_major_slice(b, k, n);
        let mut c_mat = MatMut::from_row_major_slice_mut(c, m, n);

        // C = alpha * A * B, replacing the previous contents of C
        matmul(
            c_mat.as_mut(),
            Accum::Replace,
            a_mat,
            b_mat,
            1.0f32,
            Par::Seq,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GenericBackend;
    use approx::assert_relative_eq;

    #[test]
    fn test_faer_gemm_matches_generic() {
        let a: Vec<f32> = (0..12).map(|x| x as f32 * 0.5).collect();
        let b: Vec<f32> = (0..20).map(|x| 1.0 - x as f32 * 0.25).collect();
        let mut c_faer = vec![0.0f32; 15];
        let mut c_generic = vec![0.0f32; 15];

        FaerBackend::gemm(3, 4, 5, &a, &b, &mut c_faer);
        GenericBackend::gemm(3, 4, 5, &a, &b, &mut c_generic);

        for (x, y) in c_faer.iter().zip(c_generic.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_faer_gemm_overwrites_output() {
        let a = [1.0f32, 2.0];
        let b = [3.0f32, 4.0];
        let mut c = [100.0f32];
        FaerBackend::gemm(1, 2, 1, &a, &b, &mut c);
        assert_relative_eq!(c[0], 11.0);
    }

    #[test]
    fn test_faer_gemm_empty_inner() {
        let mut c = [7.0f32; 4];
        FaerBackend::gemm(2, 0, 2, &[], &[], &mut c);
        assert_eq!(c, [0.0; 4]);
    }
}
