//! `Congruence`: the set `{ x | x = a*k + b, k in Z }`, written `aZ + b`
//! (spec.md §4.3). `a = 0` denotes the singleton `{b}`; `a = 1, b = 0` is
//! top (all integers). Unlike the interval lattice, ascending chains of
//! congruences are finite (each join strictly divides the modulus), so
//! widening is just join and narrowing is just meet.

use crate::shared::lattice::AbstractDomain;
use crate::shared::models::number::ZNumber;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Congruence {
    Bottom,
    /// Invariant: `modulus >= 0`; when `modulus > 0`, `0 <= residue < modulus`.
    Value { modulus: ZNumber, residue: ZNumber },
}

impl Congruence {
    pub fn singleton(n: ZNumber) -> Self {
        Congruence::Value { modulus: ZNumber::zero(), residue: n }
    }

    pub fn of(modulus: ZNumber, residue: ZNumber) -> Self {
        if modulus.is_zero() {
            Congruence::Value { modulus, residue }
        } else {
            Congruence::Value { modulus: modulus.clone(), residue: residue.rem_euclid(&modulus) }
        }
    }

    pub fn modulus(&self) -> Option<&ZNumber> {
        match self {
            Congruence::Bottom => None,
            Congruence::Value { modulus, .. } => Some(modulus),
        }
    }

    pub fn residue(&self) -> Option<&ZNumber> {
        match self {
            Congruence::Bottom => None,
            Congruence::Value { residue, .. } => Some(residue),
        }
    }

    pub fn contains(&self, n: &ZNumber) -> bool {
        match self {
            Congruence::Bottom => false,
            Congruence::Value { modulus, residue } if modulus.is_zero() => n == residue,
            Congruence::Value { modulus, residue } => {
                n.clone().rem_euclid(modulus) == *residue
            }
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Congruence::Bottom, _) | (_, Congruence::Bottom) => Congruence::Bottom,
            (
                Congruence::Value { modulus: ma, residue: ra },
                Congruence::Value { modulus: mb, residue: rb },
            ) => Congruence::of(ma.gcd(mb), ra.clone() + rb.clone()),
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        match (self, other) {
            (Congruence::Bottom, _) | (_, Congruence::Bottom) => Congruence::Bottom,
            (
                Congruence::Value { modulus: ma, residue: ra },
                Congruence::Value { modulus: mb, residue: rb },
            ) => Congruence::of(ma.gcd(mb), ra.clone() - rb.clone()),
        }
    }

    pub fn mul(&self, other: &Self) -> Self {
        match (self, other) {
            (Congruence::Bottom, _) | (_, Congruence::Bottom) => Congruence::Bottom,
            (
                Congruence::Value { modulus: ma, residue: ra },
                Congruence::Value { modulus: mb, residue: rb },
            ) => {
                // aZ+b times cZ+d = gcd(a*c, a*d, b*c)Z + b*d, the standard
                // closed form for the product of two residue classes.
                let g = (ma.clone() * mb.clone())
                    .gcd(&(ma.clone() * rb.clone()))
                    .gcd(&(rb.clone() * ma.clone()))
                    .gcd(&(ra.clone() * mb.clone()));
                Congruence::of(g, ra.clone() * rb.clone())
            }
        }
    }

    /// `(aZ+b) / (a'Z+b')` per spec.md §4.3: top unless the divisor is a
    /// singleton `{b'}` with `b' != 0` (division by the exact singleton
    /// `{0}` is bottom, matching [`crate::features::interval::domain::interval::Interval`]'s
    /// convention). When the dividend is itself a singleton the quotient is
    /// exact; when the dividend is a genuine `aZ+b` with `a != 0`, the
    /// closed form `(a/b')Z + (b/b')` is only sound when `b'` evenly
    /// divides both `a` and `b` (otherwise dividing each representative
    /// `a*k+b` by `b'` does not land on a single residue class), so that
    /// case falls back to top.
    pub fn div(&self, other: &Self) -> Self {
        match (self, other) {
            (Congruence::Bottom, _) | (_, Congruence::Bottom) => Congruence::Bottom,
            (
                Congruence::Value { modulus: ma, residue: ra },
                Congruence::Value { modulus: mb, residue: rb },
            ) => {
                if !mb.is_zero() {
                    return Congruence::top();
                }
                if rb.is_zero() {
                    return Congruence::Bottom;
                }
                if ma.is_zero() {
                    return Congruence::singleton(ra.clone().div_rem_divisor_sign(rb).0);
                }
                if ma.clone().rem_euclid(&rb.abs()).is_zero() && ra.clone().rem_euclid(&rb.abs()).is_zero() {
                    let quotient_modulus = ma.clone().div_rem_divisor_sign(rb).0.abs();
                    let quotient_residue = ra.clone().div_rem_divisor_sign(rb).0;
                    Congruence::of(quotient_modulus, quotient_residue)
                } else {
                    Congruence::top()
                }
            }
        }
    }

    /// `(aZ+b) mod (a'Z+b')` closed form (spec.md §4.3's "modulo ... defined
    /// by closed forms when one operand is a constant; otherwise top"),
    /// following the same divisor-constant shape as [`Self::div`]. When `a`
    /// is a multiple of the divisor `b'`, every representative shares the
    /// same residue `b mod b'`, so the result collapses to that singleton;
    /// otherwise top.
    pub fn modulo(&self, other: &Self) -> Self {
        match (self, other) {
            (Congruence::Bottom, _) | (_, Congruence::Bottom) => Congruence::Bottom,
            (
                Congruence::Value { modulus: ma, residue: ra },
                Congruence::Value { modulus: mb, residue: rb },
            ) => {
                if !mb.is_zero() {
                    return Congruence::top();
                }
                if rb.is_zero() {
                    return Congruence::Bottom;
                }
                if ma.is_zero() {
                    return Congruence::singleton(ra.clone().div_rem_divisor_sign(rb).1);
                }
                if ma.clone().rem_euclid(&rb.abs()).is_zero() {
                    Congruence::singleton(ra.clone().div_rem_divisor_sign(rb).1)
                } else {
                    Congruence::top()
                }
            }
        }
    }

    /// `(aZ+b) << (a'Z+b')`, precise when the shift amount is a singleton
    /// `{k}` with `k >= 0`: shifting left by a constant is multiplication by
    /// `2^k`, which distributes exactly over a residue class. Otherwise top.
    pub fn shl(&self, shift: &Self) -> Self {
        match (self, shift) {
            (Congruence::Bottom, _) | (_, Congruence::Bottom) => Congruence::Bottom,
            (Congruence::Value { modulus: ma, residue: ra }, Congruence::Value { modulus: ms, residue: rs }) => {
                if !ms.is_zero() || rs.is_negative() {
                    return Congruence::top();
                }
                let k = match rs.to_u64().and_then(|k| u32::try_from(k).ok()) {
                    Some(k) => k,
                    None => return Congruence::top(),
                };
                Congruence::of(ma.shl(k), ra.shl(k))
            }
        }
    }

    /// Arithmetic right shift by a singleton, non-negative shift amount:
    /// sign-extending, so it is exactly division by `2^k`.
    pub fn ashr(&self, shift: &Self) -> Self {
        match (self, shift) {
            (Congruence::Bottom, _) | (_, Congruence::Bottom) => Congruence::Bottom,
            (_, Congruence::Value { modulus: ms, residue: rs }) if ms.is_zero() && !rs.is_negative() => {
                let k = match rs.to_u64().and_then(|k| u32::try_from(k).ok()) {
                    Some(k) => k,
                    None => return Congruence::top(),
                };
                self.div(&Congruence::singleton(ZNumber::from_i64(2).pow(k)))
            }
            _ => Congruence::top(),
        }
    }

    /// Logical right shift needs a fixed bit width to be sound for negative
    /// values (the vacated high bits are zero-filled, not sign-extended),
    /// which this unbounded-precision domain does not track. It is only
    /// exact when `self` is a non-negative singleton, where logical and
    /// arithmetic shifts coincide; otherwise top.
    pub fn lshr(&self, shift: &Self) -> Self {
        match self {
            Congruence::Value { modulus, residue } if modulus.is_zero() && !residue.is_negative() => {
                self.ashr(shift)
            }
            Congruence::Bottom => Congruence::Bottom,
            _ => Congruence::top(),
        }
    }

    /// Bitwise AND, exact when both operands are singletons (a plain
    /// two's-complement AND), and exact when the divisor-like operand is a
    /// singleton mask `2^k - 1` and `self`'s modulus is a multiple of `2^k`
    /// (every representative then shares the same low `k` bits as `self`'s
    /// residue). Otherwise top.
    pub fn bitand(&self, other: &Self) -> Self {
        match (self, other) {
            (Congruence::Bottom, _) | (_, Congruence::Bottom) => Congruence::Bottom,
            (
                Congruence::Value { modulus: ma, residue: ra },
                Congruence::Value { modulus: mb, residue: rb },
            ) => {
                if ma.is_zero() && mb.is_zero() {
                    return Congruence::singleton(ra.bitand(rb));
                }
                if let Some((constant, mask)) = as_low_bit_mask(self, other) {
                    return Congruence::singleton(constant.bitand(mask));
                }
                Congruence::top()
            }
        }
    }

    /// Bitwise OR, exact only when both operands are singletons; otherwise
    /// top (spec.md §4.3 does not name a closed form for a ranging operand).
    pub fn bitor(&self, other: &Self) -> Self {
        match (self, other) {
            (Congruence::Bottom, _) | (_, Congruence::Bottom) => Congruence::Bottom,
            (
                Congruence::Value { modulus: ma, residue: ra },
                Congruence::Value { modulus: mb, residue: rb },
            ) if ma.is_zero() && mb.is_zero() => Congruence::singleton(ra.bitor(rb)),
            _ => Congruence::top(),
        }
    }

    /// Bitwise XOR, exact only when both operands are singletons.
    pub fn bitxor(&self, other: &Self) -> Self {
        match (self, other) {
            (Congruence::Bottom, _) | (_, Congruence::Bottom) => Congruence::Bottom,
            (
                Congruence::Value { modulus: ma, residue: ra },
                Congruence::Value { modulus: mb, residue: rb },
            ) if ma.is_zero() && mb.is_zero() => Congruence::singleton(ra.bitxor(rb)),
            _ => Congruence::top(),
        }
    }
}

/// If exactly one of `a`, `b` is a non-singleton congruence whose modulus is
/// a multiple of `mask + 1` for a singleton mask of the form `2^k - 1` on
/// the other side, returns `(that congruence's residue, the mask)` so the
/// caller can AND them directly and get every representative's shared low
/// bits. `None` when the shape does not apply.
fn as_low_bit_mask<'a>(a: &'a Congruence, b: &'a Congruence) -> Option<(&'a ZNumber, &'a ZNumber)> {
    let is_low_bit_mask = |m: &ZNumber| !m.is_negative() && (m.clone() + ZNumber::one()).bitand(m).is_zero();
    match (a, b) {
        (
            Congruence::Value { modulus: ma, residue: ra },
            Congruence::Value { modulus: mb, residue: rb },
        ) if !ma.is_zero() && mb.is_zero() && is_low_bit_mask(rb) && ma.clone().rem_euclid(&(rb.clone() + ZNumber::one())).is_zero() => {
            Some((ra, rb))
        }
        (
            Congruence::Value { modulus: ma, residue: ra },
            Congruence::Value { modulus: mb, residue: rb },
        ) if !mb.is_zero() && ma.is_zero() && is_low_bit_mask(ra) && mb.clone().rem_euclid(&(ra.clone() + ZNumber::one())).is_zero() => {
            Some((rb, ra))
        }
        _ => None,
    }
}

/// Extended Euclidean algorithm for positive `a`, `b`: returns `(g, x, y)`
/// with `a*x + b*y = g = gcd(a, b)`.
fn ext_gcd(a: ZNumber, b: ZNumber) -> (ZNumber, ZNumber, ZNumber) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_s, mut s) = (ZNumber::one(), ZNumber::zero());
    let (mut old_t, mut t) = (ZNumber::zero(), ZNumber::one());
    while !r.is_zero() {
        let q = old_r.clone().div_euclid(&r);
        let new_r = old_r - q.clone() * r.clone();
        old_r = r;
        r = new_r;
        let new_s = old_s - q.clone() * s.clone();
        old_s = s;
        s = new_s;
        let new_t = old_t - q * t.clone();
        old_t = t;
        t = new_t;
    }
    (old_r, old_s, old_t)
}

impl AbstractDomain for Congruence {
    fn bottom() -> Self {
        Congruence::Bottom
    }

    fn top() -> Self {
        Congruence::Value { modulus: ZNumber::one(), residue: ZNumber::zero() }
    }

    fn is_bottom(&self) -> bool {
        matches!(self, Congruence::Bottom)
    }

    fn is_top(&self) -> bool {
        matches!(self, Congruence::Value { modulus, residue } if *modulus == ZNumber::one() && residue.is_zero())
    }

    fn leq(&self, other: &Self) -> bool {
        match (self, other) {
            (Congruence::Bottom, _) => true,
            (_, Congruence::Bottom) => false,
            (
                Congruence::Value { modulus: ma, residue: ra },
                Congruence::Value { modulus: mb, residue: rb },
            ) => {
                if mb.is_zero() {
                    ma.is_zero() && ra == rb
                } else if ma.is_zero() {
                    (ra.clone() - rb.clone()).rem_euclid(mb).is_zero()
                } else {
                    ma.clone().rem_euclid(mb).is_zero()
                        && (ra.clone() - rb.clone()).rem_euclid(mb).is_zero()
                }
            }
        }
    }

    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (Congruence::Bottom, x) | (x, Congruence::Bottom) => x.clone(),
            (
                Congruence::Value { modulus: ma, residue: ra },
                Congruence::Value { modulus: mb, residue: rb },
            ) => {
                let diff = (ra.clone() - rb.clone()).abs();
                let g = ma.gcd(mb).gcd(&diff);
                Congruence::of(g, ra.clone())
            }
        }
    }

    fn meet(&self, other: &Self) -> Self {
        match (self, other) {
            (Congruence::Bottom, _) | (_, Congruence::Bottom) => Congruence::Bottom,
            (
                Congruence::Value { modulus: ma, residue: ra },
                Congruence::Value { modulus: mb, residue: rb },
            ) => {
                if ma.is_zero() && mb.is_zero() {
                    return if ra == rb { Congruence::singleton(ra.clone()) } else { Congruence::Bottom };
                }
                if ma.is_zero() {
                    return if (ra.clone() - rb.clone()).rem_euclid(mb).is_zero() {
                        Congruence::singleton(ra.clone())
                    } else {
                        Congruence::Bottom
                    };
                }
                if mb.is_zero() {
                    return if (rb.clone() - ra.clone()).rem_euclid(ma).is_zero() {
                        Congruence::singleton(rb.clone())
                    } else {
                        Congruence::Bottom
                    };
                }
                // Chinese Remainder: solve x = ra (mod ma), x = rb (mod mb).
                let (g, x, _y) = ext_gcd(ma.clone(), mb.clone());
                let diff = rb.clone() - ra.clone();
                if diff.clone().rem_euclid(&g) != ZNumber::zero() {
                    return Congruence::Bottom;
                }
                let lcm = ma.clone().div_euclid(&g) * mb.clone();
                let mb_over_g = mb.clone().div_euclid(&g);
                let t = (diff.div_euclid(&g) * x).rem_euclid(&mb_over_g);
                let solution = ra.clone() + ma.clone() * t;
                Congruence::of(lcm, solution)
            }
        }
    }

    fn widening(&self, other: &Self) -> Self {
        self.join(other)
    }

    fn narrowing(&self, other: &Self) -> Self {
        self.meet(other)
    }
}

impl fmt::Display for Congruence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Congruence::Bottom => write!(f, "bottom"),
            Congruence::Value { modulus, residue } if modulus.is_zero() => write!(f, "{{{}}}", residue),
            Congruence::Value { modulus, residue } => write!(f, "{}Z+{}", modulus, residue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z(n: i64) -> ZNumber {
        ZNumber::from_i64(n)
    }

    #[test]
    fn join_of_two_even_singletons_keeps_the_stride() {
        let two = Congruence::singleton(z(2));
        let four = Congruence::singleton(z(4));
        let joined = two.join(&four);
        assert_eq!(*joined.modulus().unwrap(), z(2));
        assert_eq!(*joined.residue().unwrap(), z(0));
    }

    #[test]
    fn join_of_singletons_with_coprime_difference_loses_all_stride_info() {
        let two = Congruence::singleton(z(2));
        let three = Congruence::singleton(z(3));
        let joined = two.join(&three);
        assert!(joined.is_top());
    }

    #[test]
    fn meet_combines_via_chinese_remainder() {
        // x = 1 mod 2, x = 2 mod 3 => x = 5 mod 6.
        let a = Congruence::of(z(2), z(1));
        let b = Congruence::of(z(3), z(2));
        let meet = a.meet(&b);
        assert_eq!(*meet.modulus().unwrap(), z(6));
        assert_eq!(*meet.residue().unwrap(), z(5));
    }

    #[test]
    fn meet_of_incompatible_congruences_is_bottom() {
        let even = Congruence::of(z(2), z(0));
        let odd = Congruence::of(z(2), z(1));
        assert!(even.meet(&odd).is_bottom());
    }

    #[test]
    fn leq_checks_subset_of_residue_classes() {
        let mod4 = Congruence::of(z(4), z(1));
        let mod2 = Congruence::of(z(2), z(1));
        assert!(mod4.leq(&mod2));
        assert!(!mod2.leq(&mod4));
    }

    #[test]
    fn top_contains_every_integer() {
        let top = Congruence::top();
        assert!(top.contains(&z(12345)));
    }

    #[test]
    fn div_by_a_non_constant_divisor_is_top() {
        let dividend = Congruence::of(z(4), z(1));
        let ranging_divisor = Congruence::of(z(2), z(0));
        assert!(dividend.div(&ranging_divisor).is_top());
    }

    #[test]
    fn div_by_exact_zero_singleton_is_bottom() {
        let dividend = Congruence::singleton(z(7));
        assert!(dividend.div(&Congruence::singleton(z(0))).is_bottom());
    }

    #[test]
    fn div_of_two_singletons_is_exact() {
        let quotient = Congruence::singleton(z(7)).div(&Congruence::singleton(z(-3)));
        assert_eq!(*quotient.residue().unwrap(), z(-3));
    }

    #[test]
    fn div_when_divisor_evenly_divides_modulus_and_residue_keeps_a_stride() {
        // 8Z+4 divided by 4 = 2Z+1.
        let dividend = Congruence::of(z(8), z(4));
        let quotient = dividend.div(&Congruence::singleton(z(4)));
        assert_eq!(*quotient.modulus().unwrap(), z(2));
        assert_eq!(*quotient.residue().unwrap(), z(1));
    }

    #[test]
    fn div_when_divisor_does_not_divide_the_residue_falls_back_to_top() {
        // 4Z+1 divided by 2: 2 divides 4 but not 1, so no single residue
        // class covers every representative's quotient.
        let dividend = Congruence::of(z(4), z(1));
        assert!(dividend.div(&Congruence::singleton(z(2))).is_top());
    }

    #[test]
    fn modulo_when_divisor_divides_the_modulus_collapses_to_a_singleton() {
        // Every element of 4Z+1 leaves remainder 1 when divided by 2.
        let dividend = Congruence::of(z(4), z(1));
        let remainder = dividend.modulo(&Congruence::singleton(z(2)));
        assert_eq!(*remainder.residue().unwrap(), z(1));
        assert!(remainder.modulus().unwrap().is_zero());
    }

    #[test]
    fn modulo_by_a_non_constant_divisor_is_top() {
        let dividend = Congruence::singleton(z(5));
        let ranging_divisor = Congruence::of(z(2), z(1));
        assert!(dividend.modulo(&ranging_divisor).is_top());
    }

    #[test]
    fn shl_by_a_constant_distributes_over_the_stride() {
        // (2Z+1) << 1 = 4Z+2.
        let shifted = Congruence::of(z(2), z(1)).shl(&Congruence::singleton(z(1)));
        assert_eq!(*shifted.modulus().unwrap(), z(4));
        assert_eq!(*shifted.residue().unwrap(), z(2));
    }

    #[test]
    fn shl_by_a_ranging_amount_is_top() {
        let shift_amount = Congruence::of(z(2), z(0));
        assert!(Congruence::singleton(z(3)).shl(&shift_amount).is_top());
    }

    #[test]
    fn ashr_by_a_constant_is_floor_division_by_the_power_of_two() {
        let shifted = Congruence::singleton(z(-7)).ashr(&Congruence::singleton(z(1)));
        assert_eq!(*shifted.residue().unwrap(), z(-4));
    }

    #[test]
    fn lshr_on_a_non_negative_singleton_matches_ashr() {
        let value = Congruence::singleton(z(10));
        let shift_amount = Congruence::singleton(z(1));
        assert_eq!(value.lshr(&shift_amount), value.ashr(&shift_amount));
    }

    #[test]
    fn lshr_on_a_ranging_congruence_is_top() {
        let ranging = Congruence::of(z(4), z(1));
        assert!(ranging.lshr(&Congruence::singleton(z(1))).is_top());
    }

    #[test]
    fn bitand_of_two_singletons_is_exact() {
        let result = Congruence::singleton(z(6)).bitand(&Congruence::singleton(z(3)));
        assert_eq!(*result.residue().unwrap(), z(2));
    }

    #[test]
    fn bitand_with_a_low_bit_mask_keeps_the_known_low_bits() {
        // 8Z+3 AND 3 (mask for the low two bits): every representative
        // shares the low two bits of 3, which is 3.
        let ranging = Congruence::of(z(8), z(3));
        let result = ranging.bitand(&Congruence::singleton(z(3)));
        assert_eq!(*result.residue().unwrap(), z(3));
    }

    #[test]
    fn bitand_with_an_unrelated_mask_is_top() {
        let ranging = Congruence::of(z(3), z(1));
        assert!(ranging.bitand(&Congruence::singleton(z(1))).is_top());
    }

    #[test]
    fn bitor_and_bitxor_of_two_singletons_are_exact() {
        let a = Congruence::singleton(z(6));
        let b = Congruence::singleton(z(3));
        assert_eq!(*a.bitor(&b).residue().unwrap(), z(7));
        assert_eq!(*a.bitxor(&b).residue().unwrap(), z(5));
    }

    #[test]
    fn bitor_of_a_ranging_congruence_is_top() {
        let ranging = Congruence::of(z(2), z(0));
        assert!(ranging.bitor(&Congruence::singleton(z(1))).is_top());
    }
}
