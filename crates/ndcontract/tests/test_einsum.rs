//! End-to-end tests for einsum planning and execution.

use approx::assert_relative_eq;
use ndcontract::contract::{ResolvedExpression, plan_contraction};
use ndcontract::{
    ContractOptions, DType, ErrorKind, StepKernel, Tensor, TensorError, contract, contract_into,
    contraction_path,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn matmul_ref(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut c = vec![0.0; m * n];
    for i in 0..m {
        for j in 0..n {
            for p in 0..k {
                c[i * n + j] += a[i * k + p] * b[p * n + j];
            }
        }
    }
    c
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_matmul_with_one_mib_budget() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(1);
    let a = Tensor::<f32>::randn_with_rng(&[2, 3], &mut rng).unwrap();
    let b = Tensor::<f32>::randn_with_rng(&[3, 4], &mut rng).unwrap();

    let options = ContractOptions::default().with_memory_budget(1 << 20);
    let c = contract("ij,jk->ik", &[&a, &b], &options).unwrap();
    assert_eq!(c.shape(), &[2, 4]);

    let expected = matmul_ref(a.data(), b.data(), 2, 3, 4);
    for (x, y) in c.data().iter().zip(&expected) {
        assert_relative_eq!(*x, *y, epsilon = 1e-5);
    }
}

#[test]
fn test_matmul_on_wrapped_operands() {
    let mut left = vec![1i32, 2, 3, 4, 5, 6];
    let mut right = vec![1i32, 0, 0, 1, 1, 1];
    let a = Tensor::wrap(&[2, 3], &mut left).unwrap();
    let b = Tensor::wrap(&[3, 2], &mut right).unwrap();
    let c = contract("ij,jk->ik", &[&a, &b], &ContractOptions::default()).unwrap();
    assert_eq!(c.data(), &[4, 5, 10, 11]);
    assert!(c.owns_memory());
}

#[test]
fn test_diagonal_through_einsum() {
    let a = Tensor::from_vec((0..9).collect::<Vec<i32>>(), &[3, 3]).unwrap();
    let d = contract("ii->i", &[&a], &ContractOptions::default()).unwrap();
    assert_eq!(d.shape(), &[3]);
    assert_eq!(d.data(), &[0, 4, 8]);
}

#[test]
fn test_three_operand_chain() {
    let shapes: [&[usize]; 3] = [&[2, 3], &[3, 4], &[4, 5]];
    let plan = contraction_path(
        "ij,jk,kl->il",
        &shapes,
        DType::F32,
        &ContractOptions::default(),
    )
    .unwrap();
    assert_eq!(plan.steps.len(), 2);
    assert_eq!(plan.output_shape(), vec![2, 5]);

    let mut rng = StdRng::seed_from_u64(3);
    let a = Tensor::<f32>::randn_with_rng(shapes[0], &mut rng).unwrap();
    let b = Tensor::<f32>::randn_with_rng(shapes[1], &mut rng).unwrap();
    let c = Tensor::<f32>::randn_with_rng(shapes[2], &mut rng).unwrap();
    let r = contract("ij,jk,kl->il", &[&a, &b, &c], &ContractOptions::default()).unwrap();
    assert_eq!(r.shape(), &[2, 5]);

    let ab = matmul_ref(a.data(), b.data(), 2, 3, 4);
    let expected = matmul_ref(&ab, c.data(), 2, 4, 5);
    for (x, y) in r.data().iter().zip(&expected) {
        assert_relative_eq!(*x, *y, epsilon = 1e-4);
    }
}

#[test]
fn test_pool_shrinks_by_one_per_step() {
    let shapes: [&[usize]; 4] = [&[2, 3], &[3, 4], &[4, 5], &[5, 2]];
    let plan =
        contraction_path("ij,jk,kl,lm->im", &shapes, DType::I32, &ContractOptions::default())
            .unwrap();
    assert_eq!(plan.steps.len(), 3);

    let mut pool = shapes.len();
    for step in &plan.steps {
        assert!(step.left < step.right);
        assert!(step.right < pool);
        pool -= 1;
    }
    assert_eq!(pool, 1);
    assert_eq!(plan.steps.last().unwrap().output_labels, vec!['i', 'm']);
}

#[test]
fn test_memory_budget_exceeded() {
    let a = Tensor::<f32>::create(&[2, 3]).unwrap();
    let b = Tensor::<f32>::create(&[3, 4]).unwrap();

    // the only step materializes the [2, 4] f32 output: 32 bytes
    let options = ContractOptions::default().with_memory_budget(31);
    let err = contract("ij,jk->ik", &[&a, &b], &options).unwrap_err();
    assert_eq!(
        err,
        TensorError::MemoryLimitExceeded {
            budget: 31,
            required: 32
        }
    );
    assert!(!err.is_fatal());

    let options = ContractOptions::default().with_memory_budget(32);
    assert!(contract("ij,jk->ik", &[&a, &b], &options).is_ok());
}

#[test]
fn test_memory_budget_below_every_pair_in_chain() {
    let shapes: [&[usize]; 3] = [&[2, 3], &[3, 4], &[4, 5]];
    let options = ContractOptions::default().with_memory_budget(16);
    let err = contraction_path("ij,jk,kl->il", &shapes, DType::F32, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MemoryLimitExceeded);
}

#[test]
fn test_outer_of_single_elements_is_scalar_multiply() {
    let a = Tensor::from_vec(vec![6i32], &[1]).unwrap();
    let b = Tensor::from_vec(vec![-7i32], &[1]).unwrap();
    let options = ContractOptions::default();

    let outer = contract("i,j->ij", &[&a, &b], &options).unwrap();
    assert_eq!(outer.shape(), &[1, 1]);
    assert_eq!(outer.data(), &[-42]);

    let hadamard = contract("i,i->i", &[&a, &b], &options).unwrap();
    assert_eq!(hadamard.data(), &[-42]);
}

#[test]
fn test_full_contraction_returns_shape_one() {
    let a = Tensor::from_vec(vec![1.0f32, 2.0, 3.0], &[3]).unwrap();
    let r = contract("i,i->", &[&a, &a], &ContractOptions::default()).unwrap();
    assert_eq!(r.shape(), &[1]);
    assert_relative_eq!(r.data()[0], 14.0);
}

#[test]
fn test_implicit_output() {
    let a = Tensor::from_vec((0..6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
    let b = Tensor::from_vec((0..12).collect::<Vec<i32>>(), &[3, 4]).unwrap();
    let explicit = contract("ij,jk->ik", &[&a, &b], &ContractOptions::default()).unwrap();
    let implicit = contract("ij,jk", &[&a, &b], &ContractOptions::default()).unwrap();
    assert_eq!(explicit, implicit);
}

#[test]
fn test_integer_contraction_wraps() {
    let a = Tensor::from_vec(vec![100i8, 100], &[2]).unwrap();
    let r = contract("i,i->", &[&a, &a], &ContractOptions::default()).unwrap();
    // 2 * 10000 = 20000 = 78 * 256 + 32
    assert_eq!(r.data(), &[32]);
}

#[test]
fn test_gemm_and_general_paths_agree() {
    let mut rng = StdRng::seed_from_u64(9);
    let a = Tensor::<i32>::random_with_rng(&[3, 4, 5], &mut rng).unwrap();
    let b = Tensor::<i32>::random_with_rng(&[3, 5, 2], &mut rng).unwrap();
    let expr = "bij,bjk->bik";

    let plan = contraction_path(
        expr,
        &[a.shape(), b.shape()],
        DType::I32,
        &ContractOptions::default(),
    )
    .unwrap();
    assert_eq!(plan.steps[0].kernel, StepKernel::Gemm);

    let fast = contract(expr, &[&a, &b], &ContractOptions::default()).unwrap();
    let slow = contract(expr, &[&a, &b], &ContractOptions::default().with_gemm(false)).unwrap();
    assert_eq!(fast, slow);
}

#[test]
fn test_permuted_output_order() {
    let a = Tensor::from_vec((0..6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
    let b = Tensor::from_vec((0..12).collect::<Vec<i32>>(), &[3, 4]).unwrap();
    let c = contract("ij,jk->ik", &[&a, &b], &ContractOptions::default()).unwrap();
    let ct = contract("ij,jk->ki", &[&a, &b], &ContractOptions::default()).unwrap();
    assert_eq!(ct.shape(), &[4, 2]);
    for i in 0..2 {
        for k in 0..4 {
            assert_eq!(ct.get(&[k, i]), c.get(&[i, k]));
        }
    }
}

#[test]
fn test_repeated_calls_are_deterministic() {
    let mut rng = StdRng::seed_from_u64(5);
    let a = Tensor::<f32>::random_with_rng(&[4, 6], &mut rng).unwrap();
    let b = Tensor::<f32>::random_with_rng(&[6, 6], &mut rng).unwrap();
    let c = Tensor::<f32>::random_with_rng(&[6, 3], &mut rng).unwrap();
    let expr = "ij,jk,kl->il";
    let shapes = [a.shape(), b.shape(), c.shape()];

    let options = ContractOptions::default();
    let p1 = contraction_path(expr, &shapes, DType::F32, &options).unwrap();
    let p2 = contraction_path(expr, &shapes, DType::F32, &options).unwrap();
    assert_eq!(p1, p2);

    let r1 = contract(expr, &[&a, &b, &c], &options).unwrap();
    let r2 = contract(expr, &[&a, &b, &c], &options).unwrap();
    assert_eq!(r1.data(), r2.data());
}

#[test]
fn test_plan_from_resolved_expression() {
    let resolved = ResolvedExpression::from_expr("ij,jk->ik", &[&[2, 3], &[3, 4]]).unwrap();
    let plan = plan_contraction(&resolved, DType::U8, &ContractOptions::default()).unwrap();
    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.steps[0].contracted, vec!['j']);
    assert_eq!(plan.peak_intermediate_bytes, 8);
}

#[test]
fn test_contract_into_success_and_failure() {
    let a = Tensor::from_vec(vec![1i32, 2, 3, 4], &[2, 2]).unwrap();
    let mut memory = [0i32; 2];
    {
        let mut out = Tensor::wrap(&[2], &mut memory).unwrap();
        contract_into("ij->i", &[&a], &mut out, &ContractOptions::default()).unwrap();
    }
    assert_eq!(memory, [3, 7]);

    let mut out = Tensor::full(&[3], -1).unwrap();
    let err = contract_into("ij->i", &[&a], &mut out, &ContractOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    assert!(out.data().iter().all(|&x| x == -1));
}

#[test]
fn test_invalid_expressions() {
    let a = Tensor::<f32>::create(&[2, 3]).unwrap();
    let b = Tensor::<f32>::create(&[4, 5]).unwrap();
    let options = ContractOptions::default();

    for (expr, operands) in [
        ("ijk->i", vec![&a]),
        ("ij->ik", vec![&a]),
        ("ij,jk->ik", vec![&a, &b]),
        ("ij,jk->ik", vec![&a]),
        ("i1->i", vec![&a]),
        ("ij->i->j", vec![&a]),
    ] {
        let err = contract(expr, &operands, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidContraction, "expr {expr}");
    }

    let none: [&Tensor<'_, f32>; 0] = [];
    let err = contract("i->i", &none, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NullInput);
}
