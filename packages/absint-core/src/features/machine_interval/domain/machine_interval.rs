//! `MachineIntInterval`: an `[lb, ub]` interval over a fixed bit-width,
//! signed integer (spec.md §4.2). Internally it is an `Interval<ZNumber>`
//! that is always kept inside the representable range `[min_value,
//! max_value]` for its `(bit_width, signedness)`; arithmetic that would
//! escape that range is resolved according to the statement's
//! `OverflowMode` rather than silently clamped.
//!
//! `bit_width`/`signedness` are runtime parameters (carried by the variable
//! the interval abstracts), so this type does not implement the
//! zero-argument `AbstractDomain::bottom()/top()` contract directly,
//! `bottom`/`top` here both take the width and signedness explicitly.

use crate::features::interval::domain::interval::Interval;
use crate::shared::lattice::AbstractDomain;
use crate::shared::models::bound::Bound;
use crate::shared::models::machine_int::{MachineInt, OverflowMode, Signedness};
use crate::shared::models::number::ZNumber;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct MachineIntInterval {
    bit_width: u32,
    signedness: Signedness,
    value: Interval<ZNumber>,
}

fn z_to_machine_int(n: &ZNumber, bit_width: u32, signedness: Signedness) -> MachineInt {
    match signedness {
        Signedness::Signed => {
            MachineInt::from_i64(n.to_i64().expect("interval endpoint outside i64 range"), bit_width, signedness)
        }
        Signedness::Unsigned => {
            MachineInt::from_u64(n.to_u64().expect("interval endpoint outside u64 range"), bit_width, signedness)
        }
    }
}

impl MachineIntInterval {
    pub fn bottom(bit_width: u32, signedness: Signedness) -> Self {
        Self {
            bit_width,
            signedness,
            value: Interval::bottom(),
        }
    }

    pub fn top(bit_width: u32, signedness: Signedness) -> Self {
        Self {
            bit_width,
            signedness,
            value: Self::representable_range(bit_width, signedness),
        }
    }

    pub fn singleton(v: MachineInt) -> Self {
        Self {
            bit_width: v.bit_width(),
            signedness: v.signedness(),
            value: Interval::singleton(v.to_z_number()),
        }
    }

    pub fn bit_width(&self) -> u32 {
        self.bit_width
    }

    pub fn signedness(&self) -> Signedness {
        self.signedness
    }

    fn representable_range(bit_width: u32, signedness: Signedness) -> Interval<ZNumber> {
        let lb = MachineInt::min_value(bit_width, signedness).to_z_number();
        let ub = MachineInt::max_value(bit_width, signedness).to_z_number();
        Interval::new(Bound::Finite(lb), Bound::Finite(ub))
    }

    fn check_compatible(&self, other: &Self) {
        assert_eq!(self.bit_width, other.bit_width, "mixed bit-width interval operation");
        assert_eq!(self.signedness, other.signedness, "mixed signedness interval operation");
    }

    pub fn is_bottom(&self) -> bool {
        self.value.is_bottom()
    }

    pub fn is_top(&self) -> bool {
        self.value == Self::representable_range(self.bit_width, self.signedness)
    }

    pub fn leq(&self, other: &Self) -> bool {
        self.check_compatible(other);
        self.value.leq(&other.value)
    }

    pub fn join(&self, other: &Self) -> Self {
        self.check_compatible(other);
        Self { value: self.value.join(&other.value), ..*self }
    }

    pub fn meet(&self, other: &Self) -> Self {
        self.check_compatible(other);
        Self { value: self.value.meet(&other.value), ..*self }
    }

    pub fn widening(&self, other: &Self) -> Self {
        self.check_compatible(other);
        Self { value: self.value.widening(&other.value), ..*self }
    }

    pub fn narrowing(&self, other: &Self) -> Self {
        self.check_compatible(other);
        Self { value: self.value.narrowing(&other.value), ..*self }
    }

    pub fn to_z_interval(&self) -> Interval<ZNumber> {
        self.value.clone()
    }

    /// Builds a `MachineIntInterval` from an arbitrary-precision interval,
    /// the counterpart to `to_z_interval` (spec.md §4.2 "to/from Z
    /// interval"). Under `Wrap`, a value outside the representable range
    /// soundly widens to the full range; under `NoWrap` the analysis
    /// assumes the source program never actually produces such a value and
    /// intersects instead.
    pub fn from_z_interval(
        z: &Interval<ZNumber>,
        bit_width: u32,
        signedness: Signedness,
        mode: OverflowMode,
    ) -> Self {
        let range = Self::representable_range(bit_width, signedness);
        let value = if z.leq(&range) {
            z.clone()
        } else {
            match mode {
                OverflowMode::Wrap => range,
                OverflowMode::NoWrap => z.meet(&range),
            }
        };
        Self { bit_width, signedness, value }
    }

    fn clamp_after_op(&self, raw: Interval<ZNumber>, mode: OverflowMode) -> Self {
        Self::from_z_interval(&raw, self.bit_width, self.signedness, mode)
    }

    pub fn add(&self, other: &Self, mode: OverflowMode) -> Self {
        self.check_compatible(other);
        self.clamp_after_op(self.value.add(&other.value), mode)
    }

    pub fn sub(&self, other: &Self, mode: OverflowMode) -> Self {
        self.check_compatible(other);
        self.clamp_after_op(self.value.sub(&other.value), mode)
    }

    pub fn mul(&self, other: &Self, mode: OverflowMode) -> Self {
        self.check_compatible(other);
        self.clamp_after_op(self.value.mul(&other.value), mode)
    }

    pub fn div(&self, other: &Self, mode: OverflowMode) -> Self {
        self.check_compatible(other);
        // Division only overflows on the single `MIN / -1` case; the same
        // overflow-mode handling as `add`/`sub`/`mul` applies there.
        self.clamp_after_op(self.value.div(&other.value), mode)
    }

    pub fn neg(&self, mode: OverflowMode) -> Self {
        self.clamp_after_op(self.value.neg(), mode)
    }

    pub fn refine_lt(&self, other: &Self) -> Self {
        self.check_compatible(other);
        Self { value: self.value.refine_lt(&other.value), ..*self }
    }

    pub fn refine_le(&self, other: &Self) -> Self {
        self.check_compatible(other);
        Self { value: self.value.refine_le(&other.value), ..*self }
    }

    pub fn refine_gt(&self, other: &Self) -> Self {
        self.check_compatible(other);
        Self { value: self.value.refine_gt(&other.value), ..*self }
    }

    pub fn refine_ge(&self, other: &Self) -> Self {
        self.check_compatible(other);
        Self { value: self.value.refine_ge(&other.value), ..*self }
    }

    pub fn refine_eq(&self, other: &Self) -> Self {
        self.check_compatible(other);
        Self { value: self.value.refine_eq(&other.value), ..*self }
    }

    fn endpoints_as_machine_ints(&self) -> Option<(MachineInt, MachineInt)> {
        let lb = self.value.lb().as_finite()?;
        let ub = self.value.ub().as_finite()?;
        Some((
            z_to_machine_int(lb, self.bit_width, self.signedness),
            z_to_machine_int(ub, self.bit_width, self.signedness),
        ))
    }

    /// `true` if the interval's span fits inside `2^bits` values, the
    /// precondition under which a bit-reinterpreting cast (`trunc`,
    /// `sign_cast`) can be applied pointwise to the two endpoints without
    /// losing soundness to a wraparound crossing inside the range.
    fn span_fits(&self, bits: u32) -> bool {
        match (self.value.lb().as_finite(), self.value.ub().as_finite()) {
            (Some(lb), Some(ub)) => {
                let span = ub.clone() - lb.clone();
                match span.to_u64() {
                    Some(span) => bits == 64 || span < (1u64 << bits),
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Reduce bit-width (spec.md §4.2 cast table). Pointwise on the two
    /// endpoints when the interval is narrow enough to stay monotone under
    /// truncation, otherwise widened to the full new-width range.
    pub fn trunc(&self, new_bit_width: u32) -> Self {
        if self.is_bottom() {
            return Self::bottom(new_bit_width, self.signedness);
        }
        if !self.span_fits(new_bit_width) {
            return Self::top(new_bit_width, self.signedness);
        }
        let (lo, hi) = self.endpoints_as_machine_ints().unwrap();
        let new_lo = lo.trunc(new_bit_width);
        let new_hi = hi.trunc(new_bit_width);
        if new_lo.cmp_signed_aware(&new_hi) != Ordering::Greater {
            Self {
                bit_width: new_bit_width,
                signedness: self.signedness,
                value: Interval::new(
                    Bound::Finite(new_lo.to_z_number()),
                    Bound::Finite(new_hi.to_z_number()),
                ),
            }
        } else {
            Self::top(new_bit_width, self.signedness)
        }
    }

    /// Sign/zero-extend to a wider bit-width. Always exact: growing the
    /// width never wraps.
    pub fn ext(&self, new_bit_width: u32) -> Self {
        if self.is_bottom() {
            return Self::bottom(new_bit_width, self.signedness);
        }
        let (lo, hi) = match self.endpoints_as_machine_ints() {
            Some(pair) => pair,
            None => return Self::top(new_bit_width, self.signedness),
        };
        Self {
            bit_width: new_bit_width,
            signedness: self.signedness,
            value: Interval::new(
                Bound::Finite(lo.ext(new_bit_width).to_z_number()),
                Bound::Finite(hi.ext(new_bit_width).to_z_number()),
            ),
        }
    }

    /// Reinterpret the same bit-width under a different signedness
    /// (spec.md §4.2). Pointwise when the span fits the width, matching the
    /// `trunc` treatment of the wraparound-crossing case.
    pub fn sign_cast(&self, new_signedness: Signedness) -> Self {
        if self.is_bottom() {
            return Self::bottom(self.bit_width, new_signedness);
        }
        if !self.span_fits(self.bit_width) {
            return Self::top(self.bit_width, new_signedness);
        }
        let (lo, hi) = self.endpoints_as_machine_ints().unwrap();
        let new_lo = lo.sign_cast(new_signedness);
        let new_hi = hi.sign_cast(new_signedness);
        if new_lo.cmp_signed_aware(&new_hi) != Ordering::Greater {
            Self {
                bit_width: self.bit_width,
                signedness: new_signedness,
                value: Interval::new(
                    Bound::Finite(new_lo.to_z_number()),
                    Bound::Finite(new_hi.to_z_number()),
                ),
            }
        } else {
            Self::top(self.bit_width, new_signedness)
        }
    }
}

impl fmt::Display for MachineIntInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}b>", self.value, self.bit_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mi(v: i64, bits: u32) -> MachineInt {
        MachineInt::from_i64(v, bits, Signedness::Signed)
    }

    #[test]
    fn top_spans_the_full_representable_range() {
        let top = MachineIntInterval::top(8, Signedness::Signed);
        assert!(top.is_top());
    }

    #[test]
    fn wrap_overflow_widens_to_top() {
        let max = MachineIntInterval::singleton(mi(127, 8));
        let one = MachineIntInterval::singleton(mi(1, 8));
        let result = max.add(&one, OverflowMode::Wrap);
        assert!(result.is_top());
    }

    #[test]
    fn no_wrap_overflow_is_treated_as_unreachable_and_clamped() {
        let max = MachineIntInterval::singleton(mi(127, 8));
        let one = MachineIntInterval::singleton(mi(1, 8));
        let result = max.add(&one, OverflowMode::NoWrap);
        // 128 does not fit in i8; NoWrap assumes it cannot happen, so the
        // post-state intersects with the representable range and loses no
        // information about values that were already in range.
        assert!(!result.is_top());
    }

    #[test]
    fn trunc_is_exact_for_a_narrow_span() {
        let small = MachineIntInterval::singleton(MachineInt::from_u64(0x12, 16, Signedness::Unsigned))
            .join(&MachineIntInterval::singleton(MachineInt::from_u64(0x14, 16, Signedness::Unsigned)));
        let truncated = small.trunc(8);
        assert!(!truncated.is_top());
    }

    #[test]
    fn ext_preserves_a_negative_singleton() {
        let v = MachineIntInterval::singleton(mi(-1, 8));
        let wide = v.ext(32);
        assert_eq!(wide.bit_width(), 32);
        assert!(!wide.is_top());
    }
}
