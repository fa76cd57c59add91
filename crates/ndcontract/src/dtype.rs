//! Element types and their run-time tags.

use std::fmt::{self, Debug};

use crate::backend::{FaerBackend, GemmBackend, GenericBackend};

/// Run-time tag for the element type of a buffer.
///
/// The set is closed. Arithmetic never promotes between dtypes; every operand
/// and output of an operation must carry the same tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    F32,
    I32,
    U8,
    I8,
}

impl DType {
    /// Width of one element in bytes.
    #[inline]
    pub const fn size_of(self) -> usize {
        match self {
            DType::F32 | DType::I32 => 4,
            DType::U8 | DType::I8 => 1,
        }
    }

    /// Conventional lowercase name (`float32`, `int32`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            DType::F32 => "float32",
            DType::I32 => "int32",
            DType::U8 => "uint8",
            DType::I8 => "int8",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for element types supported by ndcontract.
///
/// Integer arithmetic wraps on overflow (native fixed-width semantics);
/// `f32` follows IEEE rules.
pub trait Element: Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    /// The run-time tag matching this type.
    const DTYPE: DType;

    /// Returns the additive identity (zero).
    fn zero() -> Self {
        Self::default()
    }

    /// Returns the multiplicative identity (one).
    fn one() -> Self;

    fn wrapping_add(self, rhs: Self) -> Self;

    fn wrapping_sub(self, rhs: Self) -> Self;

    fn wrapping_mul(self, rhs: Self) -> Self;

    fn wrapping_neg(self) -> Self;

    fn wrapping_abs(self) -> Self;

    /// Row-major `c = a * b` with `a: m x k`, `b: k x n`, `c: m x n`.
    ///
    /// `c` is overwritten.
    fn gemm(m: usize, k: usize, n: usize, a: &[Self], b: &[Self], c: &mut [Self]) {
        GenericBackend::gemm(m, k, n, a, b, c);
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    fn one() -> Self {
        1.0
    }

    #[inline]
    fn wrapping_add(self, rhs: Self) -> Self {
        self + rhs
    }

    #[inline]
    fn wrapping_sub(self, rhs: Self) -> Self {
        self - rhs
    }

    #[inline]
    fn wrapping_mul(self, rhs: Self) -> Self {
        self * rhs
    }

    #[inline]
    fn wrapping_neg(self) -> Self {
        -self
    }

    #[inline]
    fn wrapping_abs(self) -> Self {
        self.abs()
    }

    fn gemm(m: usize, k: usize, n: usize, a: &[Self], b: &[Self], c: &mut [Self]) {
        FaerBackend::gemm(m, k, n, a, b, c);
    }
}

macro_rules! impl_integer_element {
    ($ty:ty, $dtype:expr, $abs:expr) => {
        impl Element for $ty {
            const DTYPE: DType = $dtype;

            fn one() -> Self {
                1
            }

            #[inline]
            fn wrapping_add(self, rhs: Self) -> Self {
                <$ty>::wrapping_add(self, rhs)
            }

            #[inline]
            fn wrapping_sub(self, rhs: Self) -> Self {
                <$ty>::wrapping_sub(self, rhs)
            }

            #[inline]
            fn wrapping_mul(self, rhs: Self) -> Self {
                <$ty>::wrapping_mul(self, rhs)
            }

            #[inline]
            fn wrapping_neg(self) -> Self {
                <$ty>::wrapping_neg(self)
            }

            #[inline]
            fn wrapping_abs(self) -> Self {
                let abs: fn($ty) -> $ty = $abs;
                abs(self)
            }
        }
    };
}

impl_integer_element!(i32, DType::I32, i32::wrapping_abs);
impl_integer_element!(i8, DType::I8, i8::wrapping_abs);
impl_integer_element!(u8, DType::U8, |x| x);
