//! `MachineInt`: a `(value, bit-width, signedness)` triple modeling C/C++
//! fixed-width integers, per spec.md §3.
//!
//! Two's-complement is used as the single internal representation
//! regardless of `Signedness`, `Signed` and `Unsigned` differ only in how
//! the raw bit pattern is *interpreted* (division, shifts, comparisons),
//! not in how it is *stored*. This mirrors IKOS's `MachineInt`
//! (`core/include/ikos/core/number/machine_int.hpp`-equivalent), which
//! keeps one bit-pattern storage and dispatches division/shift/compare on
//! `Signedness` at the call site.
//!
//! Supported bit-widths are `1..=64`: the widths a typical LLVM-like
//! frontend emits for `iN`/scalar integer types. Wider (128-bit) machine
//! integers are out of scope, matching spec.md's "implementers should mark
//! this as a policy knob" stance on edge-of-spec precision/range choices.

use super::number::ZNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signedness {
    Signed,
    Unsigned,
}

impl Signedness {
    pub fn flip(self) -> Self {
        match self {
            Signedness::Signed => Signedness::Unsigned,
            Signedness::Unsigned => Signedness::Signed,
        }
    }
}

/// How a potentially-overflowing operation should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverflowMode {
    /// Result wraps modulo `2^n` (spec.md §3, §4.2).
    Wrap,
    /// Overflow is undefined behavior in the source language; the analysis
    /// assumes it does not happen rather than proving it (spec.md §4.2,
    /// §4.12 "Integer overflow semantics").
    NoWrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MachineInt {
    /// Two's-complement bit pattern, stored in the low `bit_width` bits.
    raw: u64,
    bit_width: u32,
    signedness: Signedness,
}

fn mask(bit_width: u32) -> u64 {
    debug_assert!((1..=64).contains(&bit_width));
    if bit_width == 64 {
        u64::MAX
    } else {
        (1u64 << bit_width) - 1
    }
}

impl MachineInt {
    pub fn bit_width(&self) -> u32 {
        self.bit_width
    }

    pub fn signedness(&self) -> Signedness {
        self.signedness
    }

    pub fn is_signed(&self) -> bool {
        self.signedness == Signedness::Signed
    }

    fn check_compatible(&self, other: &Self) {
        // spec.md invariant 7: mixed-width or mixed-sign operations are
        // rejected (fail assertion) rather than silently coerced.
        assert_eq!(
            self.bit_width, other.bit_width,
            "mixed bit-width machine-int operation"
        );
        assert_eq!(
            self.signedness, other.signedness,
            "mixed signedness machine-int operation"
        );
    }

    pub fn from_raw_bits(raw: u64, bit_width: u32, signedness: Signedness) -> Self {
        Self {
            raw: raw & mask(bit_width),
            bit_width,
            signedness,
        }
    }

    pub fn from_i64(v: i64, bit_width: u32, signedness: Signedness) -> Self {
        Self::from_raw_bits(v as u64, bit_width, signedness)
    }

    pub fn from_u64(v: u64, bit_width: u32, signedness: Signedness) -> Self {
        Self::from_raw_bits(v, bit_width, signedness)
    }

    pub fn zero(bit_width: u32, signedness: Signedness) -> Self {
        Self::from_raw_bits(0, bit_width, signedness)
    }

    pub fn one(bit_width: u32, signedness: Signedness) -> Self {
        Self::from_raw_bits(1, bit_width, signedness)
    }

    pub fn min_value(bit_width: u32, signedness: Signedness) -> Self {
        match signedness {
            Signedness::Unsigned => Self::zero(bit_width, signedness),
            Signedness::Signed => {
                let raw = if bit_width == 64 { 1u64 << 63 } else { 1u64 << (bit_width - 1) };
                Self::from_raw_bits(raw, bit_width, signedness)
            }
        }
    }

    pub fn max_value(bit_width: u32, signedness: Signedness) -> Self {
        match signedness {
            Signedness::Unsigned => Self::from_raw_bits(mask(bit_width), bit_width, signedness),
            Signedness::Signed => {
                let raw = mask(bit_width) >> 1;
                Self::from_raw_bits(raw, bit_width, signedness)
            }
        }
    }

    /// Sign-extend the stored bit pattern to an `i64`. Valid regardless of
    /// `self.signedness`, it is a reinterpretation, not a cast.
    pub fn as_signed_i64(&self) -> i64 {
        if self.bit_width == 64 {
            self.raw as i64
        } else {
            let shift = 64 - self.bit_width;
            ((self.raw << shift) as i64) >> shift
        }
    }

    pub fn as_unsigned_u64(&self) -> u64 {
        self.raw
    }

    /// Interpret according to `self.signedness`.
    pub fn to_i128(&self) -> i128 {
        match self.signedness {
            Signedness::Signed => self.as_signed_i64() as i128,
            Signedness::Unsigned => self.as_unsigned_u64() as i128,
        }
    }

    pub fn to_z_number(&self) -> ZNumber {
        ZNumber::from_i64(0) + {
            let v = self.to_i128();
            if let Ok(v) = i64::try_from(v) {
                ZNumber::from_i64(v)
            } else {
                // i128 beyond i64 range only occurs for unsigned 64-bit
                // values with the high bit set; build via two halves.
                ZNumber::from_i64((v >> 32) as i64) * ZNumber::from_i64(1i64 << 32)
                    + ZNumber::from_i64((v & 0xFFFF_FFFF) as i64)
            }
        }
    }

    fn with_raw(&self, raw: u64) -> Self {
        Self::from_raw_bits(raw, self.bit_width, self.signedness)
    }

    // ---- wrapping arithmetic: representation-independent (spec.md §4.2) ----

    pub fn add_wrap(&self, other: &Self) -> Self {
        self.check_compatible(other);
        self.with_raw(self.raw.wrapping_add(other.raw))
    }

    pub fn sub_wrap(&self, other: &Self) -> Self {
        self.check_compatible(other);
        self.with_raw(self.raw.wrapping_sub(other.raw))
    }

    pub fn mul_wrap(&self, other: &Self) -> Self {
        self.check_compatible(other);
        self.with_raw(self.raw.wrapping_mul(other.raw))
    }

    pub fn neg_wrap(&self) -> Self {
        self.with_raw(0u64.wrapping_sub(self.raw))
    }

    /// `None` on division by zero; the interval layer handles that
    /// singleton case explicitly (spec.md §4.1 "split around zero").
    pub fn div_wrap(&self, other: &Self) -> Option<Self> {
        self.check_compatible(other);
        if other.raw == 0 {
            return None;
        }
        Some(match self.signedness {
            Signedness::Signed => {
                let (a, b) = (self.as_signed_i64(), other.as_signed_i64());
                self.with_raw(a.wrapping_div(b) as u64)
            }
            Signedness::Unsigned => self.with_raw(self.raw / other.raw),
        })
    }

    pub fn rem_wrap(&self, other: &Self) -> Option<Self> {
        self.check_compatible(other);
        if other.raw == 0 {
            return None;
        }
        Some(match self.signedness {
            Signedness::Signed => {
                let (a, b) = (self.as_signed_i64(), other.as_signed_i64());
                self.with_raw(a.wrapping_rem(b) as u64)
            }
            Signedness::Unsigned => self.with_raw(self.raw % other.raw),
        })
    }

    pub fn shl_wrap(&self, shift: u32) -> Self {
        if shift >= self.bit_width {
            return self.with_raw(0);
        }
        self.with_raw(self.raw << shift)
    }

    pub fn lshr(&self, shift: u32) -> Self {
        if shift >= self.bit_width {
            return self.with_raw(0);
        }
        self.with_raw(self.raw >> shift)
    }

    pub fn ashr(&self, shift: u32) -> Self {
        let v = self.as_signed_i64();
        let shifted = if shift >= 64 {
            if v < 0 { -1 } else { 0 }
        } else {
            v >> shift
        };
        self.with_raw(shifted as u64)
    }

    pub fn bitand(&self, other: &Self) -> Self {
        self.check_compatible(other);
        self.with_raw(self.raw & other.raw)
    }

    pub fn bitor(&self, other: &Self) -> Self {
        self.check_compatible(other);
        self.with_raw(self.raw | other.raw)
    }

    pub fn bitxor(&self, other: &Self) -> Self {
        self.check_compatible(other);
        self.with_raw(self.raw ^ other.raw)
    }

    // ---- no-wrap variants: spec.md §4.2 "the post-condition is weakened
    // to top rather than strengthened to bottom" is implemented one layer
    // up (at the Interval), here we simply report whether wrap occurred so
    // the caller can decide. ----

    pub fn add_overflows(&self, other: &Self) -> bool {
        match self.signedness {
            Signedness::Signed => self
                .as_signed_i64()
                .checked_add(other.as_signed_i64())
                .map(|v| MachineInt::from_i64(v, self.bit_width, self.signedness).as_signed_i64() != v)
                .unwrap_or(true),
            Signedness::Unsigned => {
                let sum = self.as_unsigned_u64() as u128 + other.as_unsigned_u64() as u128;
                sum > mask(self.bit_width) as u128
            }
        }
    }

    // ---- casts (spec.md §4.2) ----

    /// Reduce bit-width; kept exact iff the high bits agree between the two
    /// endpoints of the interval this value sits in is checked by the
    /// caller (`Interval::trunc`), this method just truncates one value.
    pub fn trunc(&self, new_bit_width: u32) -> Self {
        assert!(new_bit_width <= self.bit_width);
        Self::from_raw_bits(self.raw, new_bit_width, self.signedness)
    }

    /// Sign/zero-extend to a wider bit-width (the dual of `trunc`, per
    /// SPEC_FULL.md §4.17, supplementing spec.md's cast table which only
    /// names `trunc`/`sign_cast`).
    pub fn ext(&self, new_bit_width: u32) -> Self {
        assert!(new_bit_width >= self.bit_width);
        match self.signedness {
            Signedness::Unsigned => Self::from_raw_bits(self.raw, new_bit_width, self.signedness),
            Signedness::Signed => {
                Self::from_raw_bits(self.as_signed_i64() as u64, new_bit_width, self.signedness)
            }
        }
    }

    /// Reinterpret the same bit pattern under a different signedness.
    pub fn sign_cast(&self, new_signedness: Signedness) -> Self {
        Self::from_raw_bits(self.raw, self.bit_width, new_signedness)
    }

    pub fn cmp_signed_aware(&self, other: &Self) -> std::cmp::Ordering {
        self.check_compatible(other);
        match self.signedness {
            Signedness::Signed => self.as_signed_i64().cmp(&other.as_signed_i64()),
            Signedness::Unsigned => self.as_unsigned_u64().cmp(&other.as_unsigned_u64()),
        }
    }
}

impl fmt::Display for MachineInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.signedness {
            Signedness::Signed => write!(f, "{}i{}", self.as_signed_i64(), self.bit_width),
            Signedness::Unsigned => write!(f, "{}u{}", self.as_unsigned_u64(), self.bit_width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_add_matches_two_complement_overflow() {
        let max = MachineInt::max_value(8, Signedness::Signed); // 127
        let one = MachineInt::one(8, Signedness::Signed);
        let wrapped = max.add_wrap(&one);
        assert_eq!(wrapped.as_signed_i64(), -128);
    }

    #[test]
    fn trunc_keeps_low_bits() {
        let v = MachineInt::from_u64(0x1FF, 16, Signedness::Unsigned);
        let truncated = v.trunc(8);
        assert_eq!(truncated.as_unsigned_u64(), 0xFF);
    }

    #[test]
    fn sign_cast_reinterprets_bits() {
        let v = MachineInt::from_u64(0xFF, 8, Signedness::Unsigned);
        let signed = v.sign_cast(Signedness::Signed);
        assert_eq!(signed.as_signed_i64(), -1);
    }

    #[test]
    fn ext_sign_extends_negative_values() {
        let v = MachineInt::from_i64(-1, 8, Signedness::Signed);
        let wide = v.ext(32);
        assert_eq!(wide.as_signed_i64(), -1);
        assert_eq!(wide.bit_width(), 32);
    }

    #[test]
    fn unsigned_division_by_zero_is_none() {
        let a = MachineInt::from_u64(5, 32, Signedness::Unsigned);
        let zero = MachineInt::zero(32, Signedness::Unsigned);
        assert!(a.div_wrap(&zero).is_none());
    }

    #[test]
    fn ashr_sign_extends() {
        let v = MachineInt::from_i64(-8, 8, Signedness::Signed);
        assert_eq!(v.ashr(1).as_signed_i64(), -4);
    }

    #[test]
    #[should_panic(expected = "mixed bit-width")]
    fn mixed_width_operation_panics() {
        let a = MachineInt::zero(8, Signedness::Signed);
        let b = MachineInt::zero(16, Signedness::Signed);
        let _ = a.add_wrap(&b);
    }
}
