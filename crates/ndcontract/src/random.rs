//! Random tensor construction.
//!
//! This module provides functions for creating tensors with random values.

use rand::Rng;
use rand::distr::StandardUniform;
use rand_distr::StandardNormal;

use crate::dtype::Element;
use crate::error::TensorError;
use crate::tensor::{OwnedTensor, Tensor};

/// Element types that can be sampled uniformly.
///
/// `f32` samples `[0, 1)`; integer types sample their full range.
pub trait RandomUniform: Element {
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

macro_rules! impl_random_uniform {
    ($($ty:ty),*) => {
        $(
            impl RandomUniform for $ty {
                fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self {
                    rng.sample(StandardUniform)
                }
            }
        )*
    };
}

impl_random_uniform!(f32, i32, u8, i8);

/// Element types that can be sampled from the standard normal distribution.
pub trait RandomNormal: Element {
    fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl RandomNormal for f32 {
    fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.sample(StandardNormal)
    }
}

fn sampled<T: Element>(
    shape: &[usize],
    mut sample: impl FnMut() -> T,
) -> Result<OwnedTensor<T>, TensorError> {
    let mut t = Tensor::create(shape)?;
    for slot in t.data_mut() {
        *slot = sample();
    }
    Ok(t)
}

impl<T: RandomUniform> Tensor<'static, T> {
    /// Create a tensor with uniform random values.
    ///
    /// # Example
    ///
    /// ```
    /// use ndcontract::Tensor;
    ///
    /// let t = Tensor::<f32>::random(&[2, 3]).unwrap();
    /// assert_eq!(t.shape(), &[2, 3]);
    /// assert!(t.data().iter().all(|v| (0.0..1.0).contains(v)));
    /// ```
    pub fn random(shape: &[usize]) -> Result<Self, TensorError> {
        Self::random_with_rng(shape, &mut rand::rng())
    }

    /// Create a tensor with uniform random values using a specific RNG.
    ///
    /// This is useful for reproducible results with a seeded RNG.
    ///
    /// # Example
    ///
    /// ```
    /// use ndcontract::Tensor;
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let t1 = Tensor::<i8>::random_with_rng(&[2, 3], &mut rng).unwrap();
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let t2 = Tensor::<i8>::random_with_rng(&[2, 3], &mut rng).unwrap();
    ///
    /// assert_eq!(t1.data(), t2.data());
    /// ```
    pub fn random_with_rng<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Result<Self, TensorError> {
        sampled(shape, || T::sample_uniform(rng))
    }
}

impl<T: RandomNormal> Tensor<'static, T> {
    /// Create a tensor with standard normal random values.
    pub fn randn(shape: &[usize]) -> Result<Self, TensorError> {
        Self::randn_with_rng(shape, &mut rand::rng())
    }

    /// Create a tensor with standard normal random values using a specific RNG.
    pub fn randn_with_rng<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Result<Self, TensorError> {
        sampled(shape, || T::sample_normal(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_f32() {
        let t = Tensor::<f32>::random(&[2, 3]).unwrap();
        assert_eq!(t.len(), 6);
        for &v in t.data() {
            assert!((0.0..1.0).contains(&v), "value {} not in [0, 1)", v);
        }
    }

    #[test]
    fn test_random_reproducible() {
        let mut rng1 = StdRng::seed_from_u64(12345);
        let t1 = Tensor::<i32>::random_with_rng(&[3, 4], &mut rng1).unwrap();

        let mut rng2 = StdRng::seed_from_u64(12345);
        let t2 = Tensor::<i32>::random_with_rng(&[3, 4], &mut rng2).unwrap();

        assert_eq!(t1.data(), t2.data());
    }

    #[test]
    fn test_randn_f32() {
        let mut rng = StdRng::seed_from_u64(7);
        let t = Tensor::<f32>::randn_with_rng(&[400], &mut rng).unwrap();

        let mean = t.data().iter().sum::<f32>() / 400.0;
        assert!(mean.abs() < 0.3, "mean {} too far from 0", mean);

        let var = t.data().iter().map(|x| (x - mean).powi(2)).sum::<f32>() / 400.0;
        assert!(var > 0.5 && var < 1.5, "variance {} too far from 1", var);
    }

    #[test]
    fn test_random_rank_zero_rejected() {
        assert!(matches!(
            Tensor::<u8>::random(&[]),
            Err(TensorError::NullInput { .. })
        ));
    }
}
