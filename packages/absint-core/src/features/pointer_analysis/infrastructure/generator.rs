//! Walks the IR once per statement and emits pointer constraints
//! (spec.md §4.11), independently of the numerical fixpoint. An optional
//! numeric hint closure lets a caller that already has numerical
//! invariants in hand (e.g. a second analysis pass) resolve offset
//! operands precisely; without one, a variable offset is conservatively
//! `Interval::top()`.

use crate::features::interval::domain::interval::Interval;
use crate::features::pointer_analysis::domain::abstract_location::synthesize_dynamic_location;
use crate::features::pointer_analysis::domain::constraint::PointerConstraint;
use crate::shared::ir::{CastKind, Operand, OffsetTerm, Statement, StatementVisitor};
use crate::shared::lattice::AbstractDomain;
use crate::shared::models::{BlockId, StatementId, VariableId, VariableKind, ZNumber};
use crate::shared::ports::VariableFactory;

pub struct ConstraintGenerator<'a> {
    constraints: Vec<PointerConstraint>,
    var_kinds: &'a dyn VariableFactory,
    numeric_hint: Option<Box<dyn Fn(VariableId) -> Interval<ZNumber> + 'a>>,
    current_statement: StatementId,
    call_context: u32,
}

impl<'a> ConstraintGenerator<'a> {
    pub fn new(var_kinds: &'a dyn VariableFactory) -> Self {
        Self {
            constraints: Vec::new(),
            var_kinds,
            numeric_hint: None,
            current_statement: 0,
            call_context: 0,
        }
    }

    pub fn with_numeric_hint(mut self, hint: impl Fn(VariableId) -> Interval<ZNumber> + 'a) -> Self {
        self.numeric_hint = Some(Box::new(hint));
        self
    }

    /// Must be called before visiting each statement so `Allocate` can
    /// synthesize a stable location id from `(statement, call_context)`.
    pub fn set_position(&mut self, statement: StatementId, call_context: u32) {
        self.current_statement = statement;
        self.call_context = call_context;
    }

    pub fn constraints(&self) -> &[PointerConstraint] {
        &self.constraints
    }

    pub fn into_constraints(self) -> Vec<PointerConstraint> {
        self.constraints
    }

    fn push(&mut self, c: PointerConstraint) {
        self.constraints.push(c);
    }

    fn is_pointer(&self, v: VariableId) -> bool {
        matches!(self.var_kinds.kind_of(v), VariableKind::Pointer)
    }

    fn operand_offset(&self, op: &Operand) -> Interval<ZNumber> {
        match op {
            Operand::ConstantInt(mi) => Interval::singleton(mi.to_z_number()),
            Operand::Var(v) => match &self.numeric_hint {
                Some(hint) => hint(*v),
                None => Interval::top(),
            },
            _ => Interval::top(),
        }
    }

    fn combine_offsets(&self, offsets: &[OffsetTerm]) -> Interval<ZNumber> {
        offsets.iter().fold(Interval::singleton(ZNumber::zero()), |acc, term| {
            let coeff = Interval::singleton(ZNumber::from_i64(term.coefficient));
            acc.add(&coeff.mul(&self.operand_offset(&term.operand)))
        })
    }
}

impl<'a> StatementVisitor for ConstraintGenerator<'a> {
    type Output = ();

    fn visit_assign(&mut self, lhs: VariableId, rhs: &Operand) {
        if !self.is_pointer(lhs) {
            return;
        }
        match rhs {
            Operand::Var(q) => self.push(PointerConstraint::copy(lhs, *q)),
            Operand::Null => self.push(PointerConstraint::address_of(
                lhs,
                crate::features::pointer_analysis::domain::abstract_location::NULL_LOCATION,
            )),
            _ => {}
        }
    }

    fn visit_binary_op(
        &mut self,
        _lhs: VariableId,
        _op: crate::shared::ir::BinaryOperator,
        _left: &Operand,
        _right: &Operand,
        _overflow: crate::shared::models::OverflowMode,
    ) {
    }

    fn visit_compare(
        &mut self,
        _lhs: VariableId,
        _op: crate::shared::ir::CompareOperator,
        _left: &Operand,
        _right: &Operand,
    ) {
    }

    fn visit_cast(&mut self, lhs: VariableId, kind: CastKind, operand: &Operand, _bit_width: u32) {
        // Pointer<->integer bitcasts are this generator's job (shared/ir.rs
        // `CastKind::Bitcast` doc comment); every other cast is purely
        // numerical and has no points-to effect.
        if kind == CastKind::Bitcast {
            if let Some(q) = operand.as_var() {
                self.push(PointerConstraint::copy(lhs, q));
            }
        }
    }

    fn visit_allocate(&mut self, lhs: VariableId, _element_bit_width: u32, _count: &Operand) {
        let location = synthesize_dynamic_location(self.current_statement, self.call_context);
        self.push(PointerConstraint::address_of(lhs, location));
    }

    fn visit_address_of(&mut self, lhs: VariableId, location: crate::shared::models::MemoryLocationId) {
        self.push(PointerConstraint::address_of(lhs, location));
    }

    fn visit_pointer_shift(&mut self, lhs: VariableId, pointer: &Operand, offsets: &[OffsetTerm]) {
        if let Some(q) = pointer.as_var() {
            let shift = self.combine_offsets(offsets);
            self.push(PointerConstraint::copy_shifted(lhs, q, shift));
        }
    }

    fn visit_load(&mut self, lhs: VariableId, pointer: &Operand) {
        if let Some(q) = pointer.as_var() {
            self.push(PointerConstraint::load(lhs, q));
        }
    }

    fn visit_store(&mut self, pointer: &Operand, value: &Operand) {
        if let (Some(p), Some(q)) = (pointer.as_var(), value.as_var()) {
            if self.is_pointer(q) {
                self.push(PointerConstraint::store(p, q));
            }
        }
    }

    fn visit_extract_element(&mut self, _lhs: VariableId, _aggregate: &Operand, _index: u64) {}

    fn visit_insert_element(&mut self, _lhs: VariableId, _aggregate: &Operand, _index: u64, _value: &Operand) {}

    fn visit_call(&mut self, _lhs: Option<VariableId>, _callee: &crate::shared::ir::CallTarget, _args: &[Operand]) {
        // Indirect-call resolution reads the solved points-to set back
        // out (spec.md §4.12); it doesn't add constraints of its own.
    }

    fn visit_invoke(
        &mut self,
        lhs: Option<VariableId>,
        callee: &crate::shared::ir::CallTarget,
        args: &[Operand],
        _normal_dest: BlockId,
        _unwind_dest: BlockId,
    ) {
        self.visit_call(lhs, callee, args);
    }

    fn visit_return(&mut self, _value: &Option<Operand>) {}

    fn visit_unreachable(&mut self) {}

    fn visit_landing_pad(&mut self, _lhs: VariableId) {}

    fn visit_resume(&mut self, _value: &Operand) {}

    fn visit_vararg_intrinsic(&mut self, _lhs: Option<VariableId>, _args: &[Operand]) {}
}

/// Walks every statement in `stmts`, feeding each one's index in as its
/// `StatementId` for allocation-site synthesis.
pub fn generate(generator: &mut ConstraintGenerator<'_>, stmts: &[Statement], call_context: u32) {
    for (i, stmt) in stmts.iter().enumerate() {
        generator.set_position(i as StatementId, call_context);
        generator.visit(stmt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::pointer_analysis::domain::abstract_location::NULL_LOCATION;
    use crate::shared::models::MemoryLocationId;

    struct AllPointers;
    impl VariableFactory for AllPointers {
        fn kind_of(&self, _var: VariableId) -> VariableKind {
            VariableKind::Pointer
        }
    }

    #[test]
    fn assign_of_a_variable_emits_a_copy_constraint() {
        let vf = AllPointers;
        let mut gen = ConstraintGenerator::new(&vf);
        gen.visit_assign(1, &Operand::Var(2));
        assert_eq!(gen.constraints(), &[PointerConstraint::copy(1, 2)]);
    }

    #[test]
    fn assign_null_points_at_the_null_location() {
        let vf = AllPointers;
        let mut gen = ConstraintGenerator::new(&vf);
        gen.visit_assign(1, &Operand::Null);
        assert_eq!(gen.constraints(), &[PointerConstraint::address_of(1, NULL_LOCATION)]);
    }

    #[test]
    fn allocate_synthesizes_a_stable_location_from_position() {
        let vf = AllPointers;
        let mut gen = ConstraintGenerator::new(&vf);
        gen.set_position(3, 0);
        gen.visit_allocate(1, 64, &Operand::ConstantInt(crate::shared::models::MachineInt::from_i64(
            1,
            32,
            crate::shared::models::Signedness::Signed,
        )));
        match &gen.constraints()[0] {
            PointerConstraint::AddressOf { p, location, .. } => {
                assert_eq!(*p, 1);
                assert_ne!(*location, MemoryLocationId::MAX);
            }
            _ => panic!("expected AddressOf"),
        }
    }

    #[test]
    fn bitcast_propagates_points_to_like_a_copy() {
        let vf = AllPointers;
        let mut gen = ConstraintGenerator::new(&vf);
        gen.visit_cast(1, CastKind::Bitcast, &Operand::Var(2), 64);
        assert_eq!(gen.constraints(), &[PointerConstraint::copy(1, 2)]);
    }
}
