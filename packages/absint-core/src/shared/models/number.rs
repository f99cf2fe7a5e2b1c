//! Unbounded exact numbers: `ZNumber` (integer) and `QNumber` (rational).
//!
//! Division on `ZNumber` is Euclidean: the remainder always takes the sign
//! of the divisor, and `rem_euclid` is the non-negative mathematical
//! modulo. This matches the semantics IKOS documents for its `ZNumber`
//! (`core/include/ikos/core/number/z_number.hpp`-equivalent) rather than
//! Rust's native truncating `/`/`%`.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Euclid, One, Signed, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// Unbounded exact integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ZNumber(BigInt);

impl ZNumber {
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    pub fn one() -> Self {
        Self(BigInt::one())
    }

    pub fn from_i64(v: i64) -> Self {
        Self(BigInt::from(v))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn to_i64(&self) -> Option<i64> {
        use num_traits::ToPrimitive;
        self.0.to_i64()
    }

    pub fn to_u64(&self) -> Option<u64> {
        use num_traits::ToPrimitive;
        self.0.to_u64()
    }

    /// Euclidean quotient: `a = q*b + r` with `0 <= r < |b|`.
    pub fn div_euclid(&self, other: &Self) -> Self {
        Self(self.0.div_euclid(&other.0))
    }

    /// Euclidean remainder: same sign as... nothing, it is always
    /// non-negative (`0 <= r < |b|`), i.e. the mathematical modulo.
    pub fn rem_euclid(&self, other: &Self) -> Self {
        Self(self.0.rem_euclid(&other.0))
    }

    /// Truncating quotient/remainder pair, remainder has the sign of the
    /// divisor as required by spec.md §3 ("remainder same sign as
    /// divisor"), which for `ZNumber` coincides with Euclidean division
    /// when the divisor is positive; for a negative divisor we adjust.
    pub fn div_rem_divisor_sign(&self, other: &Self) -> (Self, Self) {
        let (mut q, mut r) = self.0.div_mod_floor(&other.0);
        // div_mod_floor already yields r with the sign of `other` for
        // nonzero r (floor division); normalize the zero-remainder case.
        if r.is_zero() {
            r = BigInt::zero();
        }
        if other.0.is_negative() && r.is_positive() {
            q += 1;
            r -= &other.0;
        }
        (Self(q), Self(r))
    }

    pub fn gcd(&self, other: &Self) -> Self {
        Self(self.0.gcd(&other.0))
    }

    pub fn pow(&self, exp: u32) -> Self {
        Self(self.0.pow(exp))
    }

    /// Left shift by a non-negative amount, i.e. multiplication by `2^k`.
    pub fn shl(&self, k: u32) -> Self {
        Self(&self.0 * BigInt::from(2).pow(k))
    }

    /// Arithmetic right shift: floor division by `2^k`, sign-extending.
    pub fn ashr(&self, k: u32) -> Self {
        let divisor = Self(BigInt::from(2).pow(k));
        self.div_rem_divisor_sign(&divisor).0
    }

    /// Bitwise AND over the two's-complement representation.
    pub fn bitand(&self, other: &Self) -> Self {
        Self(&self.0 & &other.0)
    }

    /// Bitwise OR over the two's-complement representation.
    pub fn bitor(&self, other: &Self) -> Self {
        Self(&self.0 | &other.0)
    }

    /// Bitwise XOR over the two's-complement representation.
    pub fn bitxor(&self, other: &Self) -> Self {
        Self(&self.0 ^ &other.0)
    }

    pub fn to_rational(&self) -> QNumber {
        QNumber(BigRational::from_integer(self.0.clone()))
    }

    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    pub fn max(self, other: Self) -> Self {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }
}

impl From<i64> for ZNumber {
    fn from(v: i64) -> Self {
        Self::from_i64(v)
    }
}

impl fmt::Display for ZNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! impl_znum_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for ZNumber {
            type Output = ZNumber;
            fn $method(self, rhs: Self) -> ZNumber {
                ZNumber(self.0 $op rhs.0)
            }
        }
        impl $trait for &ZNumber {
            type Output = ZNumber;
            fn $method(self, rhs: Self) -> ZNumber {
                ZNumber(&self.0 $op &rhs.0)
            }
        }
    };
}

impl_znum_binop!(Add, add, +);
impl_znum_binop!(Sub, sub, -);
impl_znum_binop!(Mul, mul, *);

impl Div for ZNumber {
    type Output = ZNumber;
    fn div(self, rhs: Self) -> ZNumber {
        self.div_rem_divisor_sign(&rhs).0
    }
}

impl Rem for ZNumber {
    type Output = ZNumber;
    fn rem(self, rhs: Self) -> ZNumber {
        self.div_rem_divisor_sign(&rhs).1
    }
}

impl Neg for ZNumber {
    type Output = ZNumber;
    fn neg(self) -> ZNumber {
        ZNumber(-self.0)
    }
}

/// Unbounded exact rational.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct QNumber(BigRational);

impl QNumber {
    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    pub fn one() -> Self {
        Self(BigRational::one())
    }

    pub fn from_i64(v: i64) -> Self {
        Self(BigRational::from_integer(BigInt::from(v)))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn cmp_with(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for QNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! impl_qnum_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for QNumber {
            type Output = QNumber;
            fn $method(self, rhs: Self) -> QNumber {
                QNumber(self.0 $op rhs.0)
            }
        }
        impl $trait for &QNumber {
            type Output = QNumber;
            fn $method(self, rhs: Self) -> QNumber {
                QNumber(&self.0 $op &rhs.0)
            }
        }
    };
}

impl_qnum_binop!(Add, add, +);
impl_qnum_binop!(Sub, sub, -);
impl_qnum_binop!(Mul, mul, *);
impl_qnum_binop!(Div, div, /);

impl Neg for QNumber {
    type Output = QNumber;
    fn neg(self) -> QNumber {
        QNumber(-self.0)
    }
}

/// Common interface shared by `ZNumber` and `QNumber`, used to write the
/// interval/bound lattice generically over "integer or rational" the way
/// spec.md §4.1 does ("Integer and rational intervals share the algorithm;
/// only the underlying number differs").
pub trait ExactNumber:
    Clone
    + PartialEq
    + PartialOrd
    + fmt::Display
    + fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    fn zero() -> Self;
    fn one() -> Self;
    fn from_i64(v: i64) -> Self;
    fn is_zero(&self) -> bool;
    fn is_negative(&self) -> bool;
    fn abs(&self) -> Self;
    fn min(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;
}

impl ExactNumber for ZNumber {
    fn zero() -> Self {
        ZNumber::zero()
    }
    fn one() -> Self {
        ZNumber::one()
    }
    fn from_i64(v: i64) -> Self {
        ZNumber::from_i64(v)
    }
    fn is_zero(&self) -> bool {
        ZNumber::is_zero(self)
    }
    fn is_negative(&self) -> bool {
        ZNumber::is_negative(self)
    }
    fn abs(&self) -> Self {
        ZNumber::abs(self)
    }
    fn min(self, other: Self) -> Self {
        ZNumber::min(self, other)
    }
    fn max(self, other: Self) -> Self {
        ZNumber::max(self, other)
    }
}

impl ExactNumber for QNumber {
    fn zero() -> Self {
        QNumber::zero()
    }
    fn one() -> Self {
        QNumber::one()
    }
    fn from_i64(v: i64) -> Self {
        QNumber::from_i64(v)
    }
    fn is_zero(&self) -> bool {
        QNumber::is_zero(self)
    }
    fn is_negative(&self) -> bool {
        QNumber::is_negative(self)
    }
    fn abs(&self) -> Self {
        QNumber::abs(self)
    }
    fn min(self, other: Self) -> Self {
        if self.cmp_with(&other) == Ordering::Greater {
            other
        } else {
            self
        }
    }
    fn max(self, other: Self) -> Self {
        if self.cmp_with(&other) == Ordering::Less {
            other
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_division_remainder_sign_matches_divisor() {
        let a = ZNumber::from_i64(-7);
        let b = ZNumber::from_i64(3);
        let (q, r) = a.div_rem_divisor_sign(&b);
        assert_eq!(r, ZNumber::from_i64(2));
        assert_eq!(q.clone() * b.clone() + r, a);

        let a = ZNumber::from_i64(7);
        let b = ZNumber::from_i64(-3);
        let (q, r) = a.div_rem_divisor_sign(&b);
        assert_eq!(r, ZNumber::from_i64(-2));
        assert_eq!(q * b + r, a);
    }

    #[test]
    fn rem_euclid_is_non_negative_modulo() {
        let a = ZNumber::from_i64(-7);
        let b = ZNumber::from_i64(3);
        assert_eq!(a.rem_euclid(&b), ZNumber::from_i64(2));
    }

    #[test]
    fn gcd_basic() {
        assert_eq!(
            ZNumber::from_i64(12).gcd(&ZNumber::from_i64(18)),
            ZNumber::from_i64(6)
        );
    }

    #[test]
    fn div_and_rem_operators_take_the_divisors_sign_not_euclid() {
        let a = ZNumber::from_i64(7);
        let b = ZNumber::from_i64(-3);
        assert_eq!(a.clone() / b.clone(), ZNumber::from_i64(-3));
        assert_eq!(a % b, ZNumber::from_i64(-2));
    }
}
