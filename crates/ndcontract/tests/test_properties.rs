//! Property-based tests for arithmetic, layout and contraction.

use ndcontract::operations::inverse_permutation;
use ndcontract::{
    ContractOptions, DType, ErrorKind, Tensor, add, contract, contraction_path, transpose,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Shape of rank 1 to 4 with small extents.
fn shape_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..5, 1..=4)
}

/// A shape together with a permutation of its axes.
fn shape_and_axes() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    shape_strategy().prop_flat_map(|shape| {
        let axes: Vec<usize> = (0..shape.len()).collect();
        (Just(shape), Just(axes).prop_shuffle())
    })
}

/// A shape together with two i8 buffers of matching length.
fn i8_pair() -> impl Strategy<Value = (Vec<usize>, Vec<i8>, Vec<i8>)> {
    shape_strategy().prop_flat_map(|shape| {
        let len = shape.iter().product::<usize>();
        (
            Just(shape),
            prop::collection::vec(any::<i8>(), len),
            prop::collection::vec(any::<i8>(), len),
        )
    })
}

fn matmul_dims() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..6, 1usize..6, 1usize..6)
}

// ============================================================================
// Element-wise and layout properties
// ============================================================================

proptest! {
    /// Property: add is commutative and wraps at the element width
    #[test]
    fn prop_add_commutes((shape, x, y) in i8_pair()) {
        let a = Tensor::from_vec(x.clone(), &shape).unwrap();
        let b = Tensor::from_vec(y.clone(), &shape).unwrap();
        let mut ab = Tensor::<i8>::create(&shape).unwrap();
        let mut ba = Tensor::<i8>::create(&shape).unwrap();
        add(&a, &b, &mut ab).unwrap();
        add(&b, &a, &mut ba).unwrap();

        prop_assert_eq!(ab.data(), ba.data());
        for ((&s, &p), &q) in ab.data().iter().zip(&x).zip(&y) {
            prop_assert_eq!(s, p.wrapping_add(q));
        }
    }

    /// Property: transposing by the inverse permutation restores the tensor
    #[test]
    fn prop_transpose_inverse((shape, axes) in shape_and_axes()) {
        let len = shape.iter().product::<usize>();
        let t = Tensor::from_vec((0..len as i32).collect(), &shape).unwrap();

        let p = transpose(&t, &axes).unwrap();
        for (i, &a) in axes.iter().enumerate() {
            prop_assert_eq!(p.shape()[i], shape[a]);
        }

        let back = transpose(&p, &inverse_permutation(&axes).unwrap()).unwrap();
        prop_assert_eq!(back.shape(), t.shape());
        prop_assert_eq!(back.data(), t.data());
    }
}

// ============================================================================
// Contraction properties
// ============================================================================

proptest! {
    /// Property: "ij,jk->ik" equals the textbook triple loop
    #[test]
    fn prop_matmul_matches_loops(
        (m, k, n) in matmul_dims(),
        seed in prop::collection::vec(-50i32..50, 50),
    ) {
        let a_data: Vec<i32> = (0..m * k).map(|i| seed[i % seed.len()]).collect();
        let b_data: Vec<i32> = (0..k * n).map(|i| seed[(i * 7 + 3) % seed.len()]).collect();
        let a = Tensor::from_vec(a_data.clone(), &[m, k]).unwrap();
        let b = Tensor::from_vec(b_data.clone(), &[k, n]).unwrap();

        let c = contract("ij,jk->ik", &[&a, &b], &ContractOptions::default()).unwrap();
        prop_assert_eq!(c.shape(), &[m, n]);
        for i in 0..m {
            for j in 0..n {
                let expected: i32 = (0..k).map(|p| a_data[i * k + p] * b_data[p * n + j]).sum();
                prop_assert_eq!(c.data()[i * n + j], expected);
            }
        }
    }

    /// Property: a budget one byte under the only intermediate always fails
    #[test]
    fn prop_budget_below_output_fails((m, k, n) in matmul_dims()) {
        let a = Tensor::<f32>::create(&[m, k]).unwrap();
        let b = Tensor::<f32>::create(&[k, n]).unwrap();
        let needed = m * n * DType::F32.size_of();

        let tight = ContractOptions::default().with_memory_budget(needed - 1);
        let err = contract("ij,jk->ik", &[&a, &b], &tight).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::MemoryLimitExceeded);

        let exact = ContractOptions::default().with_memory_budget(needed);
        prop_assert!(contract("ij,jk->ik", &[&a, &b], &exact).is_ok());
    }

    /// Property: an n-operand chain is planned in n - 1 steps, deterministically
    #[test]
    fn prop_chain_plan(dims in prop::collection::vec(1usize..8, 3..=6)) {
        let letters = ['a', 'b', 'c', 'd', 'e', 'f'];
        let n = dims.len() - 1;
        let terms: Vec<String> = (0..n)
            .map(|i| format!("{}{}", letters[i], letters[i + 1]))
            .collect();
        let expr = format!("{}->{}{}", terms.join(","), letters[0], letters[n]);
        let shapes: Vec<Vec<usize>> = (0..n).map(|i| vec![dims[i], dims[i + 1]]).collect();
        let shape_refs: Vec<&[usize]> = shapes.iter().map(Vec::as_slice).collect();

        let options = ContractOptions::default();
        let plan = contraction_path(&expr, &shape_refs, DType::I32, &options).unwrap();
        prop_assert_eq!(plan.steps.len(), n - 1);
        prop_assert_eq!(plan.output_shape(), vec![dims[0], dims[n]]);

        let again = contraction_path(&expr, &shape_refs, DType::I32, &options).unwrap();
        prop_assert_eq!(plan, again);
    }

    /// Property: disabling GEMM never changes an integer result
    #[test]
    fn prop_gemm_toggle_agrees(
        (m, k, n) in matmul_dims(),
        batch in 1usize..4,
        values in prop::collection::vec(any::<u8>(), 64),
    ) {
        let fill = |len: usize, shift: usize| -> Vec<u8> {
            (0..len).map(|i| values[(i + shift) % values.len()]).collect()
        };
        let a = Tensor::from_vec(fill(batch * m * k, 0), &[batch, m, k]).unwrap();
        let b = Tensor::from_vec(fill(batch * k * n, 11), &[batch, k, n]).unwrap();

        let expr = "bij,bjk->bki";
        let fast = contract(expr, &[&a, &b], &ContractOptions::default()).unwrap();
        let slow = contract(expr, &[&a, &b], &ContractOptions::default().with_gemm(false)).unwrap();
        prop_assert_eq!(fast.data(), slow.data());
    }
}
