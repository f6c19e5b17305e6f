use num_traits::{One, Zero};
use rug::float::Round;
use rug::Float;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::sync::atomic::{AtomicU32, Ordering};

/// Trait for the scalar type used throughout the solver.
///
/// All numeric work is expressed through values implementing `FloatT`, with
/// implementations provided for `f64` and for the arbitrary-precision
/// [`MpFloat`].  Because an MPFR value is not `Copy`, the arithmetic bounds
/// are clone-based, with by-reference variants so that hot kernels can avoid
/// cloning both operands.
pub trait FloatT:
    'static
    + Sized
    + Clone
    + Default
    + Send
    + Sync
    + PartialEq
    + PartialOrd
    + Zero
    + One
    + Neg<Output = Self>
    + Add<Self, Output = Self>
    + Sub<Self, Output = Self>
    + Mul<Self, Output = Self>
    + Div<Self, Output = Self>
    + for<'a> Add<&'a Self, Output = Self>
    + for<'a> Sub<&'a Self, Output = Self>
    + for<'a> Mul<&'a Self, Output = Self>
    + for<'a> Div<&'a Self, Output = Self>
    + AddAssign<Self>
    + SubAssign<Self>
    + MulAssign<Self>
    + DivAssign<Self>
    + for<'a> AddAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
    + for<'a> DivAssign<&'a Self>
    + fmt::Debug
    + fmt::Display
    + fmt::LowerExp
{
    fn from_f64(v: f64) -> Self;
    fn from_u32(v: u32) -> Self;
    fn sqrt(&self) -> Self;
    fn abs(&self) -> Self;
    fn recip(&self) -> Self;
    fn max(self, other: Self) -> Self;
    fn min(self, other: Self) -> Self;
    fn is_finite(&self) -> bool;
    /// Machine epsilon at the operating precision.
    fn epsilon() -> Self;
    fn to_f64(&self) -> f64;
    /// Decimal string carrying enough digits that [`FloatT::parse_decimal`]
    /// recovers the exact value.
    fn to_decimal(&self) -> String;
    fn parse_decimal(s: &str) -> Option<Self>;
}

impl FloatT for f64 {
    fn from_f64(v: f64) -> Self {
        v
    }
    fn from_u32(v: u32) -> Self {
        v as f64
    }
    fn sqrt(&self) -> Self {
        f64::sqrt(*self)
    }
    fn abs(&self) -> Self {
        f64::abs(*self)
    }
    fn recip(&self) -> Self {
        f64::recip(*self)
    }
    fn max(self, other: Self) -> Self {
        f64::max(self, other)
    }
    fn min(self, other: Self) -> Self {
        f64::min(self, other)
    }
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
    fn epsilon() -> Self {
        f64::EPSILON
    }
    fn to_f64(&self) -> f64 {
        *self
    }
    fn to_decimal(&self) -> String {
        // {:e} is shortest-round-trip in Rust
        format!("{:e}", self)
    }
    fn parse_decimal(s: &str) -> Option<Self> {
        s.trim().parse().ok()
    }
}

/// Trait for converting Rust primitives to [`FloatT`]
///
/// Lets constants be written as `(0.5).as_T()` rather than
/// `T::from_f64(0.5)` everywhere, including in builder default strings.
#[allow(non_snake_case)]
pub trait AsFloatT<T>: 'static {
    fn as_T(&self) -> T;
}

impl<T: FloatT> AsFloatT<T> for f64 {
    #[inline]
    fn as_T(&self) -> T {
        T::from_f64(*self)
    }
}
impl<T: FloatT> AsFloatT<T> for u32 {
    #[inline]
    fn as_T(&self) -> T {
        T::from_u32(*self)
    }
}
impl<T: FloatT> AsFloatT<T> for usize {
    #[inline]
    fn as_T(&self) -> T {
        T::from_f64(*self as f64)
    }
}

// ---------------------------------
// arbitrary precision scalar
// ---------------------------------

// Mantissa size in bits for newly created MpFloat values.  MPFR precision
// is a per-value property; a process-wide default keeps every rounding in a
// run consistent, in the manner of mpf_set_default_prec.
static DEFAULT_PRECISION: AtomicU32 = AtomicU32::new(256);

/// Set the mantissa size (bits) used for all subsequently created
/// [`MpFloat`] values.  Call once, before building any problem data.
pub fn set_default_precision(bits: u32) {
    assert!(bits >= 64, "precision must be at least 64 bits");
    DEFAULT_PRECISION.store(bits, Ordering::Relaxed);
}

/// The mantissa size (bits) currently used for new [`MpFloat`] values.
pub fn default_precision() -> u32 {
    DEFAULT_PRECISION.load(Ordering::Relaxed)
}

/// Arbitrary-precision real number backed by MPFR via [`rug::Float`].
///
/// New values take the process-wide default precision
/// ([`set_default_precision`]); arithmetic results inherit the precision of
/// their operands, so a run performed entirely at one setting rounds
/// consistently throughout.
#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub struct MpFloat(Float);

impl MpFloat {
    pub fn new(v: f64) -> Self {
        Self(Float::with_val(default_precision(), v))
    }

    pub fn with_precision(bits: u32, v: f64) -> Self {
        Self(Float::with_val(bits, v))
    }

    /// Mantissa size of this value in bits.
    pub fn precision(&self) -> u32 {
        self.0.prec()
    }
}

impl Default for MpFloat {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl fmt::Display for MpFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::LowerExp for MpFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerExp::fmt(&self.0, f)
    }
}

impl Neg for MpFloat {
    type Output = MpFloat;
    fn neg(self) -> MpFloat {
        MpFloat(-self.0)
    }
}

macro_rules! impl_mp_binop {
    ($Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident) => {
        impl $Op<MpFloat> for MpFloat {
            type Output = MpFloat;
            fn $op(self, rhs: MpFloat) -> MpFloat {
                MpFloat(self.0.$op(rhs.0))
            }
        }
        impl<'a> $Op<&'a MpFloat> for MpFloat {
            type Output = MpFloat;
            fn $op(self, rhs: &'a MpFloat) -> MpFloat {
                MpFloat(self.0.$op(&rhs.0))
            }
        }
        impl $OpAssign<MpFloat> for MpFloat {
            fn $op_assign(&mut self, rhs: MpFloat) {
                self.0.$op_assign(rhs.0);
            }
        }
        impl<'a> $OpAssign<&'a MpFloat> for MpFloat {
            fn $op_assign(&mut self, rhs: &'a MpFloat) {
                self.0.$op_assign(&rhs.0);
            }
        }
    };
}
impl_mp_binop!(Add, add, AddAssign, add_assign);
impl_mp_binop!(Sub, sub, SubAssign, sub_assign);
impl_mp_binop!(Mul, mul, MulAssign, mul_assign);
impl_mp_binop!(Div, div, DivAssign, div_assign);

impl Zero for MpFloat {
    fn zero() -> Self {
        Self::new(0.0)
    }
    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl One for MpFloat {
    fn one() -> Self {
        Self::new(1.0)
    }
}

impl FloatT for MpFloat {
    fn from_f64(v: f64) -> Self {
        Self::new(v)
    }
    fn from_u32(v: u32) -> Self {
        Self(Float::with_val(default_precision(), v))
    }
    fn sqrt(&self) -> Self {
        MpFloat(self.0.clone().sqrt())
    }
    fn abs(&self) -> Self {
        MpFloat(self.0.clone().abs())
    }
    fn recip(&self) -> Self {
        MpFloat(self.0.clone().recip())
    }
    fn max(self, other: Self) -> Self {
        if self < other {
            other
        } else {
            self
        }
    }
    fn min(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }
    fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
    fn epsilon() -> Self {
        let p = default_precision();
        MpFloat(Float::with_val(p, Float::i_exp(1, 1 - p as i32)))
    }
    fn to_f64(&self) -> f64 {
        self.0.to_f64()
    }
    fn to_decimal(&self) -> String {
        // num_digits = None writes enough digits for an exact read-back
        self.0.to_string_radix(10, None)
    }
    fn parse_decimal(s: &str) -> Option<Self> {
        let incomplete = Float::parse(s.trim()).ok()?;
        let (value, _ord) =
            Float::with_val_round(default_precision(), incomplete, Round::Nearest);
        Some(MpFloat(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mpfloat_roundtrip_decimal() {
        set_default_precision(256);
        let x = MpFloat::new(1.0) / &MpFloat::new(3.0);
        let s = x.to_decimal();
        let y = MpFloat::parse_decimal(&s).unwrap();
        assert_eq!(x, y);
    }

    #[test]
    fn f64_roundtrip_decimal() {
        let x: f64 = 0.1 + 0.2;
        let s = x.to_decimal();
        assert_eq!(f64::parse_decimal(&s).unwrap(), x);
    }

    #[test]
    fn mpfloat_epsilon_scales_with_precision() {
        set_default_precision(256);
        let eps = MpFloat::epsilon();
        assert!(eps > MpFloat::new(0.0));
        assert!(eps < MpFloat::new(1e-60));
    }
}
