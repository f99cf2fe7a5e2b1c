//! The symbolic transfer function (spec.md §4.12): a [`StatementVisitor`]
//! that applies one IR statement's effect to a numerical abstract state,
//! consulting a precomputed [`PointerInfo`] for indirect calls and
//! load/store aliasing and the [`call_model`] table for external calls.

use crate::errors::{Result, SourceLocation};
use crate::features::interval::domain::interval::Interval;
use crate::features::machine_interval::domain::machine_interval::MachineIntInterval;
use crate::features::pointer_analysis::domain::pointer_info::PointerInfo;
use crate::features::transfer::domain::call_model::{self, CallEffect, SizeArg};
use crate::features::transfer::domain::memory::MemoryModel;
use crate::features::transfer::domain::state::NumericalState;
use crate::shared::ir::{BinaryOperator, CallTarget, CastKind, CompareOperator, Operand, StatementVisitor};
use crate::shared::lattice::AbstractDomain;
use crate::shared::models::{MachineInt, MemoryLocationId, OverflowMode, Signedness, VariableId, VariableKind, ZNumber};
use crate::shared::ports::VariableFactory;

/// Applies one statement at a time to `inv`/`memory`, given read access to
/// a fully-solved points-to map and the variable factory for bit-width and
/// signedness. One instance is built per block (or reused across an
/// entire function, at the caller's discretion) by a [`BlockTransfer`]
/// composition; see `application::block_transfer`.
pub struct TransferFunction<'a, S: NumericalState> {
    pub inv: S,
    pub memory: MemoryModel,
    points_to: &'a PointerInfo,
    var_kinds: &'a dyn VariableFactory,
    size_var_of: Option<&'a dyn Fn(VariableId) -> Option<VariableId>>,
    location: SourceLocation,
}

impl<'a, S: NumericalState> TransferFunction<'a, S> {
    pub fn new(inv: S, memory: MemoryModel, points_to: &'a PointerInfo, var_kinds: &'a dyn VariableFactory) -> Self {
        Self {
            inv,
            memory,
            points_to,
            var_kinds,
            size_var_of: None,
            location: SourceLocation::unknown(),
        }
    }

    /// Registers the convention a frontend uses to associate a pointer
    /// variable returned by `alloca`/an allocating call with the integer
    /// variable tracking its allocation size, if it tracks one at all.
    pub fn with_size_vars(mut self, f: &'a dyn Fn(VariableId) -> Option<VariableId>) -> Self {
        self.size_var_of = Some(f);
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn into_parts(self) -> (S, MemoryModel) {
        (self.inv, self.memory)
    }

    fn integer_kind(&self, v: VariableId) -> Option<(u32, Signedness)> {
        match self.var_kinds.kind_of(v) {
            VariableKind::Integer { bit_width, signedness } => Some((bit_width, signedness)),
            _ => None,
        }
    }

    fn operand_bound(&self, op: &Operand) -> Interval<ZNumber> {
        match op {
            Operand::ConstantInt(c) => Interval::singleton(c.to_z_number()),
            Operand::Var(v) => self.inv.get_bound(*v),
            Operand::Null => Interval::singleton(ZNumber::zero()),
            Operand::ConstantFloat(_) | Operand::Undefined => Interval::top(),
        }
    }

    fn operand_machine_interval(&self, op: &Operand, bit_width: u32, signedness: Signedness) -> MachineIntInterval {
        match op {
            Operand::ConstantInt(c) => MachineIntInterval::singleton(*c),
            _ => MachineIntInterval::from_z_interval(&self.operand_bound(op), bit_width, signedness, OverflowMode::Wrap),
        }
    }

    fn resolve_pointer(&self, pointer: &Operand) -> Option<Vec<MemoryLocationId>> {
        let v = pointer.as_var()?;
        let fact = self.points_to.get(v);
        fact.locations.locations().map(|s| s.iter().copied().collect())
    }

    /// `x = y + c` / `x = c + y` / `x = y - c`: preserved exactly as an
    /// affine relation on relational backings instead of going through
    /// machine-interval arithmetic and losing the relation to `y`. Only
    /// sound when overflow is assumed not to happen, since `assign`
    /// operates on unbounded `ZNumber`, not wrapped machine ints.
    fn try_affine_assign(&mut self, lhs: VariableId, op: BinaryOperator, left: &Operand, right: &Operand) -> bool {
        match op {
            BinaryOperator::Add => {
                if let (Some(v), Some(c)) = (left.as_var(), right.as_constant_int()) {
                    self.inv.assign(lhs, Some(v), c.to_z_number());
                    return true;
                }
                if let (Some(c), Some(v)) = (left.as_constant_int(), right.as_var()) {
                    self.inv.assign(lhs, Some(v), c.to_z_number());
                    return true;
                }
                false
            }
            BinaryOperator::Sub => {
                if let (Some(v), Some(c)) = (left.as_var(), right.as_constant_int()) {
                    self.inv.assign(lhs, Some(v), -c.to_z_number());
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    fn compare_result(op: CompareOperator, left: &Interval<ZNumber>, right: &Interval<ZNumber>) -> Interval<ZNumber> {
        let holds = |op: CompareOperator| -> Option<bool> {
            let refined = match op {
                CompareOperator::Eq => left.refine_eq(right),
                CompareOperator::Ne => return None,
                CompareOperator::Lt => left.refine_lt(right),
                CompareOperator::Le => left.refine_le(right),
                CompareOperator::Gt => left.refine_gt(right),
                CompareOperator::Ge => left.refine_ge(right),
            };
            if refined.is_bottom() {
                Some(false)
            } else if refined == *left && left.is_singleton() {
                Some(true)
            } else {
                None
            }
        };
        match holds(op) {
            Some(true) => Interval::singleton(ZNumber::one()),
            Some(false) => Interval::singleton(ZNumber::zero()),
            None => Interval::new(
                crate::shared::models::Bound::Finite(ZNumber::zero()),
                crate::shared::models::Bound::Finite(ZNumber::one()),
            ),
        }
    }

    /// Refines both comparison operands under the assumption that `left
    /// op right` holds, the "emit the implied linear constraint under
    /// branch conditions" half of spec.md §4.12's `cmp` row, applied by
    /// whichever block-edge handling models the taken branch (this
    /// visitor itself never sees branch edges, only the `Compare`
    /// statement that produces the condition variable).
    pub fn assume(&mut self, op: CompareOperator, left: &Operand, right: &Operand) {
        if self.inv.is_bottom() {
            return;
        }
        let l = self.operand_bound(left);
        let r = self.operand_bound(right);
        let (refined_l, refined_r) = match op {
            CompareOperator::Eq => (l.refine_eq(&r), r.refine_eq(&l)),
            CompareOperator::Ne => (l.clone(), r.clone()),
            CompareOperator::Lt => (l.refine_lt(&r), r.refine_gt(&l)),
            CompareOperator::Le => (l.refine_le(&r), r.refine_ge(&l)),
            CompareOperator::Gt => (l.refine_gt(&r), r.refine_lt(&l)),
            CompareOperator::Ge => (l.refine_ge(&r), r.refine_le(&l)),
        };
        if let Some(v) = left.as_var() {
            self.inv.bound_variable(v, &refined_l);
        }
        if let Some(v) = right.as_var() {
            self.inv.bound_variable(v, &refined_r);
        }
    }

    fn allocate_at(&mut self, lhs: VariableId, size: Interval<ZNumber>) {
        if let Some(f) = self.size_var_of {
            if let Some(size_var) = f(lhs) {
                self.inv.bound_variable(size_var, &size);
            }
        }
    }
}

impl<'a, S: NumericalState> StatementVisitor for TransferFunction<'a, S> {
    type Output = Result<()>;

    fn visit_assign(&mut self, lhs: VariableId, rhs: &Operand) -> Self::Output {
        if self.inv.is_bottom() {
            return Ok(());
        }
        match rhs {
            Operand::ConstantInt(c) => self.inv.assign(lhs, None, c.to_z_number()),
            Operand::Var(v) => self.inv.assign(lhs, Some(*v), ZNumber::zero()),
            Operand::Null => self.inv.assign(lhs, None, ZNumber::zero()),
            Operand::ConstantFloat(_) | Operand::Undefined => self.inv.forget(lhs),
        }
        Ok(())
    }

    fn visit_binary_op(
        &mut self,
        lhs: VariableId,
        op: BinaryOperator,
        left: &Operand,
        right: &Operand,
        overflow: OverflowMode,
    ) -> Self::Output {
        if self.inv.is_bottom() {
            return Ok(());
        }
        let Some((bit_width, signedness)) = self.integer_kind(lhs) else {
            self.inv.forget(lhs);
            return Ok(());
        };

        if matches!(overflow, OverflowMode::NoWrap) && self.try_affine_assign(lhs, op, left, right) {
            return Ok(());
        }

        let l = self.operand_machine_interval(left, bit_width, signedness);
        let r = self.operand_machine_interval(right, bit_width, signedness);
        let result = match op {
            BinaryOperator::Add => Some(l.add(&r, overflow)),
            BinaryOperator::Sub => Some(l.sub(&r, overflow)),
            BinaryOperator::Mul => Some(l.mul(&r, overflow)),
            BinaryOperator::Div => Some(l.div(&r, overflow)),
            // Bitwise/shift/modulo precision is not modeled by
            // `MachineIntInterval` (it has no `rem`/`shl`/`lshr`/`ashr`/
            // `and`/`or`/`xor`); forgetting the destination is sound.
            BinaryOperator::Rem
            | BinaryOperator::Shl
            | BinaryOperator::Lshr
            | BinaryOperator::Ashr
            | BinaryOperator::And
            | BinaryOperator::Or
            | BinaryOperator::Xor => None,
        };
        match result {
            Some(r) => self.inv.bound_variable(lhs, &r.to_z_interval()),
            None => self.inv.forget(lhs),
        }
        Ok(())
    }

    fn visit_compare(&mut self, lhs: VariableId, op: CompareOperator, left: &Operand, right: &Operand) -> Self::Output {
        if self.inv.is_bottom() {
            return Ok(());
        }
        let l = self.operand_bound(left);
        let r = self.operand_bound(right);
        let result = Self::compare_result(op, &l, &r);
        self.inv.bound_variable(lhs, &result);
        Ok(())
    }

    fn visit_cast(&mut self, lhs: VariableId, kind: CastKind, operand: &Operand, bit_width: u32) -> Self::Output {
        if self.inv.is_bottom() {
            return Ok(());
        }
        if kind == CastKind::Bitcast {
            // Integer<->pointer bitcast is the pointer-constraint
            // generator's concern, not the numerical domain's.
            self.inv.forget(lhs);
            return Ok(());
        }
        let Some((dest_width, dest_signedness)) = self.integer_kind(lhs) else {
            self.inv.forget(lhs);
            return Ok(());
        };
        let (src_width, src_signedness) = match operand.as_var().and_then(|v| self.integer_kind(v)) {
            Some(k) => k,
            None => (dest_width, dest_signedness),
        };
        let src = self.operand_machine_interval(operand, src_width, src_signedness);
        let result = match kind {
            CastKind::Trunc => src.trunc(bit_width),
            CastKind::Ext => src.ext(bit_width),
            CastKind::SignCast => src.sign_cast(dest_signedness),
            CastKind::Bitcast => unreachable!("handled above"),
        };
        self.inv.bound_variable(lhs, &result.to_z_interval());
        Ok(())
    }

    fn visit_allocate(&mut self, lhs: VariableId, element_bit_width: u32, count: &Operand) -> Self::Output {
        if self.inv.is_bottom() {
            return Ok(());
        }
        let count_bound = self.operand_bound(count);
        let elem_bytes = Interval::singleton(ZNumber::from_i64(((element_bit_width as i64) + 7) / 8));
        let size = count_bound.mul(&elem_bytes);
        self.allocate_at(lhs, size);
        Ok(())
    }

    fn visit_address_of(&mut self, _lhs: VariableId, _location: MemoryLocationId) -> Self::Output {
        // Pointer identity lives entirely in the points-to domain; the
        // numerical state has nothing to record here.
        Ok(())
    }

    fn visit_pointer_shift(&mut self, _lhs: VariableId, _pointer: &Operand, _offsets: &[crate::shared::ir::OffsetTerm]) -> Self::Output {
        // Handled by the pointer-constraint generator (spec.md §4.11);
        // the offset interval it derives is fed back in as a numeric
        // hint on future loads/stores through that pointer, not stored
        // on the numerical state directly.
        Ok(())
    }

    fn visit_load(&mut self, lhs: VariableId, pointer: &Operand) -> Self::Output {
        if self.inv.is_bottom() {
            return Ok(());
        }
        match self.resolve_pointer(pointer) {
            None => self.inv.forget(lhs),
            Some(locations) if locations.is_empty() => self.inv.set_to_bottom(),
            Some(locations) => {
                let mut acc = Interval::bottom();
                for loc in locations {
                    acc = acc.join(&self.memory.get(loc));
                }
                self.inv.bound_variable(lhs, &acc);
            }
        }
        Ok(())
    }

    fn visit_store(&mut self, pointer: &Operand, value: &Operand) -> Self::Output {
        if self.inv.is_bottom() {
            return Ok(());
        }
        let value_bound = self.operand_bound(value);
        match self.resolve_pointer(pointer) {
            // An unknown (top) target could be any location in the
            // program; without a closed location universe to iterate,
            // the only sound move is to leave memory as-is rather than
            // guess which cell to weaken.
            None => {}
            Some(locations) if locations.len() == 1 => {
                self.memory.strong_update(locations[0], value_bound);
            }
            Some(locations) => {
                for loc in locations {
                    self.memory.weak_update(loc, &value_bound);
                }
            }
        }
        Ok(())
    }

    fn visit_extract_element(&mut self, lhs: VariableId, _aggregate: &Operand, _index: u64) -> Self::Output {
        self.inv.forget(lhs);
        Ok(())
    }

    fn visit_insert_element(&mut self, lhs: VariableId, _aggregate: &Operand, _index: u64, _value: &Operand) -> Self::Output {
        self.inv.forget(lhs);
        Ok(())
    }

    fn visit_call(&mut self, lhs: Option<VariableId>, callee: &CallTarget, args: &[Operand]) -> Self::Output {
        if self.inv.is_bottom() {
            return Ok(());
        }
        match callee {
            // A direct user-defined callee's summary is inlined by the
            // caller substituting its own already-analyzed post-state
            // before this statement runs at all (spec.md §4.12's
            // interprocedural half, orchestrated above this visitor); by
            // the time a `Direct` name reaches here unresolved, it is
            // either a recognized external symbol or genuinely unknown,
            // so both cases share the same model-table lookup.
            CallTarget::Direct(name) | CallTarget::External(name) => self.apply_external_or_unknown(lhs, name, args),
            CallTarget::Indirect(pointer) => {
                // Resolve via points-to; without callee summaries wired
                // in at this layer, soundly forget the result, a caller
                // that wants precision here should inline each resolved
                // direct callee's summary before falling through to us.
                let _ = self.resolve_pointer(pointer);
                if let Some(v) = lhs {
                    self.inv.forget(v);
                }
                Ok(())
            }
        }
    }

    fn visit_invoke(
        &mut self,
        lhs: Option<VariableId>,
        callee: &CallTarget,
        args: &[Operand],
        _normal_dest: crate::shared::models::BlockId,
        _unwind_dest: crate::shared::models::BlockId,
    ) -> Self::Output {
        // Identical numerical effect to `call`; branch-splitting to the
        // normal/unwind destination is the block-transfer composition's
        // job (it calls this visitor once per outgoing edge).
        self.visit_call(lhs, callee, args)
    }

    fn visit_return(&mut self, _value: &Option<Operand>) -> Self::Output {
        Ok(())
    }

    fn visit_unreachable(&mut self) -> Self::Output {
        self.inv.set_to_bottom();
        Ok(())
    }

    fn visit_landing_pad(&mut self, lhs: VariableId) -> Self::Output {
        self.inv.forget(lhs);
        Ok(())
    }

    fn visit_resume(&mut self, _value: &Operand) -> Self::Output {
        self.inv.set_to_bottom();
        Ok(())
    }

    fn visit_vararg_intrinsic(&mut self, lhs: Option<VariableId>, _args: &[Operand]) -> Self::Output {
        if let Some(v) = lhs {
            self.inv.forget(v);
        }
        Ok(())
    }
}

impl<'a, S: NumericalState> TransferFunction<'a, S> {
    fn apply_external_or_unknown(&mut self, lhs: Option<VariableId>, name: &str, args: &[Operand]) -> Result<()> {
        let Some(effect) = call_model::lookup(name) else {
            if let Some(v) = lhs {
                self.inv.forget(v);
            }
            return Ok(());
        };
        match effect {
            CallEffect::Allocates { size_arg } => {
                let size = match size_arg {
                    SizeArg::Bytes(i) => args.get(i).map(|a| self.operand_bound(a)).unwrap_or_else(Interval::top),
                    SizeArg::CountTimesElemSize(i, j) => {
                        let count = args.get(i).map(|a| self.operand_bound(a)).unwrap_or_else(Interval::top);
                        let elem = args.get(j).map(|a| self.operand_bound(a)).unwrap_or_else(Interval::top);
                        count.mul(&elem)
                    }
                };
                if let Some(v) = lhs {
                    self.allocate_at(v, size);
                }
            }
            CallEffect::Deallocates | CallEffect::TouchesErrno => {}
            CallEffect::Copies | CallEffect::Fills | CallEffect::AliasesArg0 => {
                if let Some(v) = lhs {
                    if let Some(a0) = args.first().and_then(Operand::as_var) {
                        self.inv.assign(v, Some(a0), ZNumber::zero());
                    } else {
                        self.inv.forget(v);
                    }
                }
            }
            CallEffect::Searches => {
                if let Some(v) = lhs {
                    self.inv.bound_variable(
                        v,
                        &Interval::new(crate::shared::models::Bound::Finite(ZNumber::zero()), crate::shared::models::Bound::PlusInfinity),
                    );
                }
            }
            CallEffect::NoReturn => {
                self.inv.set_to_bottom();
            }
            CallEffect::Opaque => {
                if let Some(v) = lhs {
                    self.inv.forget(v);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::interval::domain::interval::Interval as Iv;
    use crate::features::numerical_domain::domain::non_relational::NonRelationalDomain;
    use crate::shared::ir::OffsetTerm;
    use crate::shared::models::bound::Bound;

    struct AllInts;
    impl VariableFactory for AllInts {
        fn kind_of(&self, _var: VariableId) -> VariableKind {
            VariableKind::Integer {
                bit_width: 32,
                signedness: Signedness::Signed,
            }
        }
    }

    fn iv(lo: i64, hi: i64) -> Interval<ZNumber> {
        Interval::new(Bound::Finite(ZNumber::from_i64(lo)), Bound::Finite(ZNumber::from_i64(hi)))
    }

    type Store = NonRelationalDomain<Interval<ZNumber>>;

    fn tf<'a>(inv: Store, points_to: &'a PointerInfo, kinds: &'a AllInts) -> TransferFunction<'a, Store> {
        TransferFunction::new(inv, MemoryModel::new(), points_to, kinds)
    }

    #[test]
    fn assigning_a_constant_binds_an_exact_interval() {
        let points_to = PointerInfo::new();
        let kinds = AllInts;
        let mut f = tf(Store::top(), &points_to, &kinds);
        f.visit_assign(1, &Operand::ConstantInt(MachineInt::from_i64(7, 32, Signedness::Signed))).unwrap();
        assert_eq!(f.inv.get_bound(1), iv(7, 7));
    }

    #[test]
    fn no_wrap_add_by_a_constant_stays_affine() {
        let points_to = PointerInfo::new();
        let kinds = AllInts;
        let mut inv = Store::top();
        inv.set(2, iv(0, 10));
        let mut f = tf(inv, &points_to, &kinds);
        f.visit_binary_op(1, BinaryOperator::Add, &Operand::Var(2), &Operand::ConstantInt(MachineInt::from_i64(5, 32, Signedness::Signed)), OverflowMode::NoWrap)
            .unwrap();
        assert_eq!(f.inv.get_bound(1), iv(5, 15));
    }

    #[test]
    fn an_unreachable_statement_collapses_the_state_to_bottom() {
        let points_to = PointerInfo::new();
        let kinds = AllInts;
        let mut f = tf(Store::top(), &points_to, &kinds);
        f.visit_unreachable().unwrap();
        assert!(f.inv.is_bottom());
    }

    #[test]
    fn loading_through_an_empty_points_to_set_is_unreachable() {
        let points_to = PointerInfo::new();
        let kinds = AllInts;
        let mut f = tf(Store::top(), &points_to, &kinds);
        f.visit_load(1, &Operand::Var(99)).unwrap();
        assert!(f.inv.is_bottom());
    }

    #[test]
    fn loading_through_an_unknown_pointer_forgets_the_destination() {
        let mut points_to = PointerInfo::new();
        points_to.set_unknown(42);
        let kinds = AllInts;
        let mut inv = Store::top();
        inv.set(1, iv(0, 0));
        let mut f = tf(inv, &points_to, &kinds);
        f.visit_load(1, &Operand::Var(42)).unwrap();
        assert!(f.inv.get_bound(1).is_top());
    }

    #[test]
    fn store_then_load_through_a_singleton_points_to_set_round_trips() {
        let mut points_to = PointerInfo::new();
        points_to.entry_mut(5).locations.insert(100);
        let kinds = AllInts;
        let mut f = tf(Store::top(), &points_to, &kinds);
        f.visit_store(&Operand::Var(5), &Operand::ConstantInt(MachineInt::from_i64(3, 32, Signedness::Signed))).unwrap();
        f.visit_load(1, &Operand::Var(5)).unwrap();
        assert_eq!(f.inv.get_bound(1), iv(3, 3));
    }

    #[test]
    fn malloc_binds_the_registered_size_variable() {
        let points_to = PointerInfo::new();
        let kinds = AllInts;
        let size_of = |v: VariableId| if v == 1 { Some(2u32) } else { None };
        let mut f = tf(Store::top(), &points_to, &kinds).with_size_vars(&size_of);
        f.visit_call(Some(1), &CallTarget::External("malloc".into()), &[Operand::ConstantInt(MachineInt::from_i64(64, 32, Signedness::Signed))])
            .unwrap();
        assert_eq!(f.inv.get_bound(2), iv(64, 64));
    }

    #[test]
    fn assume_less_than_refines_both_sides() {
        let points_to = PointerInfo::new();
        let kinds = AllInts;
        let mut inv = Store::top();
        inv.set(1, iv(0, 100));
        inv.set(2, iv(0, 100));
        let mut f = tf(inv, &points_to, &kinds);
        f.assume(CompareOperator::Lt, &Operand::Var(1), &Operand::Var(2));
        assert_eq!(f.inv.get_bound(1), iv(0, 99));
        assert_eq!(f.inv.get_bound(2), iv(1, 100));
    }

    #[test]
    fn an_unmodeled_external_call_forgets_its_result() {
        let points_to = PointerInfo::new();
        let kinds = AllInts;
        let mut f = tf(Store::top(), &points_to, &kinds);
        f.visit_call(Some(1), &CallTarget::External("some_app_specific_function".into()), &[]).unwrap();
        assert!(f.inv.get_bound(1).is_top());
    }

    #[test]
    fn pointer_shift_is_a_no_op_on_the_numerical_state() {
        let points_to = PointerInfo::new();
        let kinds = AllInts;
        let mut f = tf(Store::top(), &points_to, &kinds);
        f.visit_pointer_shift(1, &Operand::Var(2), &[OffsetTerm { coefficient: 1, operand: Operand::ConstantInt(MachineInt::from_i64(4, 32, Signedness::Signed)) }])
            .unwrap();
        assert!(f.inv.get_bound(1).is_top());
    }
}
