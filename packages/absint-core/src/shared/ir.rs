//! The closed IR statement hierarchy the core consumes (spec.md §6
//! "Statement visitor").
//!
//! The source analyzer this is distilled from models each statement kind as
//! a subclass of one base, dispatched through a visitor. Per spec.md §9
//! ("Design Notes, Virtual statement hierarchy") that is modeled here as a
//! single closed `enum` with one variant per statement kind; the "visitor"
//! becomes the [`StatementVisitor`] trait, whose default `visit` method is
//! an exhaustive match.

use super::models::{BlockId, MachineInt, MemoryLocationId, OverflowMode, VariableId};

/// An operand as resolved by the literal factory (spec.md §6).
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    ConstantInt(MachineInt),
    /// Bit pattern of an IEEE-754 value; the core only ever forgets/tops
    /// float-typed variables, it never computes on floats.
    ConstantFloat(u64),
    Null,
    Undefined,
    Var(VariableId),
}

impl Operand {
    pub fn as_var(&self) -> Option<VariableId> {
        match self {
            Operand::Var(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_constant_int(&self) -> Option<&MachineInt> {
        match self {
            Operand::ConstantInt(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Lshr,
    Ashr,
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOperator {
    pub fn negate(self) -> Self {
        match self {
            CompareOperator::Eq => CompareOperator::Ne,
            CompareOperator::Ne => CompareOperator::Eq,
            CompareOperator::Lt => CompareOperator::Ge,
            CompareOperator::Le => CompareOperator::Gt,
            CompareOperator::Gt => CompareOperator::Le,
            CompareOperator::Ge => CompareOperator::Lt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    Trunc,
    Ext,
    SignCast,
    /// Integer <-> pointer bitcast; the numerical domain forgets the
    /// destination, the pointer-constraint generator handles it instead.
    Bitcast,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallTarget {
    Direct(String),
    /// Indirect call through a function pointer, resolved via the
    /// pointer-constraint solver's points-to set (spec.md §4.11).
    Indirect(Operand),
    /// A modeled external call (spec.md §4.12 "external call model table").
    External(String),
}

/// One coefficient*operand term of a pointer shift (`p + Σ cᵢ·eᵢ`, spec.md
/// §4.12).
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetTerm {
    pub coefficient: i64,
    pub operand: Operand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign {
        lhs: VariableId,
        rhs: Operand,
    },
    BinaryOp {
        lhs: VariableId,
        op: BinaryOperator,
        left: Operand,
        right: Operand,
        overflow: OverflowMode,
    },
    Compare {
        lhs: VariableId,
        op: CompareOperator,
        left: Operand,
        right: Operand,
    },
    Cast {
        lhs: VariableId,
        kind: CastKind,
        operand: Operand,
        bit_width: u32,
    },
    Allocate {
        lhs: VariableId,
        element_bit_width: u32,
        count: Operand,
    },
    AddressOf {
        lhs: VariableId,
        location: MemoryLocationId,
    },
    PointerShift {
        lhs: VariableId,
        pointer: Operand,
        offsets: Vec<OffsetTerm>,
    },
    Load {
        lhs: VariableId,
        pointer: Operand,
    },
    Store {
        pointer: Operand,
        value: Operand,
    },
    ExtractElement {
        lhs: VariableId,
        aggregate: Operand,
        index: u64,
    },
    InsertElement {
        lhs: VariableId,
        aggregate: Operand,
        index: u64,
        value: Operand,
    },
    Call {
        lhs: Option<VariableId>,
        callee: CallTarget,
        args: Vec<Operand>,
    },
    Invoke {
        lhs: Option<VariableId>,
        callee: CallTarget,
        args: Vec<Operand>,
        normal_dest: BlockId,
        unwind_dest: BlockId,
    },
    Return {
        value: Option<Operand>,
    },
    Unreachable,
    LandingPad {
        lhs: VariableId,
    },
    Resume {
        value: Operand,
    },
    VarArgIntrinsic {
        lhs: Option<VariableId>,
        args: Vec<Operand>,
    },
}

/// Double dispatch over the closed statement hierarchy. A blanket default
/// `visit` pattern-matches; implementors only override the variants they
/// care about (the transfer function overrides every one, a checker that
/// only needs `Load`/`Store` can rely on the no-op defaults for the rest).
pub trait StatementVisitor {
    type Output;

    fn visit(&mut self, stmt: &Statement) -> Self::Output {
        match stmt {
            Statement::Assign { lhs, rhs } => self.visit_assign(*lhs, rhs),
            Statement::BinaryOp {
                lhs,
                op,
                left,
                right,
                overflow,
            } => self.visit_binary_op(*lhs, *op, left, right, *overflow),
            Statement::Compare { lhs, op, left, right } => self.visit_compare(*lhs, *op, left, right),
            Statement::Cast {
                lhs,
                kind,
                operand,
                bit_width,
            } => self.visit_cast(*lhs, *kind, operand, *bit_width),
            Statement::Allocate {
                lhs,
                element_bit_width,
                count,
            } => self.visit_allocate(*lhs, *element_bit_width, count),
            Statement::AddressOf { lhs, location } => self.visit_address_of(*lhs, *location),
            Statement::PointerShift {
                lhs,
                pointer,
                offsets,
            } => self.visit_pointer_shift(*lhs, pointer, offsets),
            Statement::Load { lhs, pointer } => self.visit_load(*lhs, pointer),
            Statement::Store { pointer, value } => self.visit_store(pointer, value),
            Statement::ExtractElement {
                lhs,
                aggregate,
                index,
            } => self.visit_extract_element(*lhs, aggregate, *index),
            Statement::InsertElement {
                lhs,
                aggregate,
                index,
                value,
            } => self.visit_insert_element(*lhs, aggregate, *index, value),
            Statement::Call { lhs, callee, args } => self.visit_call(*lhs, callee, args),
            Statement::Invoke {
                lhs,
                callee,
                args,
                normal_dest,
                unwind_dest,
            } => self.visit_invoke(*lhs, callee, args, *normal_dest, *unwind_dest),
            Statement::Return { value } => self.visit_return(value),
            Statement::Unreachable => self.visit_unreachable(),
            Statement::LandingPad { lhs } => self.visit_landing_pad(*lhs),
            Statement::Resume { value } => self.visit_resume(value),
            Statement::VarArgIntrinsic { lhs, args } => self.visit_vararg_intrinsic(*lhs, args),
        }
    }

    fn visit_assign(&mut self, lhs: VariableId, rhs: &Operand) -> Self::Output;
    fn visit_binary_op(
        &mut self,
        lhs: VariableId,
        op: BinaryOperator,
        left: &Operand,
        right: &Operand,
        overflow: OverflowMode,
    ) -> Self::Output;
    fn visit_compare(
        &mut self,
        lhs: VariableId,
        op: CompareOperator,
        left: &Operand,
        right: &Operand,
    ) -> Self::Output;
    fn visit_cast(&mut self, lhs: VariableId, kind: CastKind, operand: &Operand, bit_width: u32) -> Self::Output;
    fn visit_allocate(&mut self, lhs: VariableId, element_bit_width: u32, count: &Operand) -> Self::Output;
    fn visit_address_of(&mut self, lhs: VariableId, location: MemoryLocationId) -> Self::Output;
    fn visit_pointer_shift(&mut self, lhs: VariableId, pointer: &Operand, offsets: &[OffsetTerm]) -> Self::Output;
    fn visit_load(&mut self, lhs: VariableId, pointer: &Operand) -> Self::Output;
    fn visit_store(&mut self, pointer: &Operand, value: &Operand) -> Self::Output;
    fn visit_extract_element(&mut self, lhs: VariableId, aggregate: &Operand, index: u64) -> Self::Output;
    fn visit_insert_element(
        &mut self,
        lhs: VariableId,
        aggregate: &Operand,
        index: u64,
        value: &Operand,
    ) -> Self::Output;
    fn visit_call(&mut self, lhs: Option<VariableId>, callee: &CallTarget, args: &[Operand]) -> Self::Output;
    fn visit_invoke(
        &mut self,
        lhs: Option<VariableId>,
        callee: &CallTarget,
        args: &[Operand],
        normal_dest: BlockId,
        unwind_dest: BlockId,
    ) -> Self::Output;
    fn visit_return(&mut self, value: &Option<Operand>) -> Self::Output;
    fn visit_unreachable(&mut self) -> Self::Output;
    fn visit_landing_pad(&mut self, lhs: VariableId) -> Self::Output;
    fn visit_resume(&mut self, value: &Operand) -> Self::Output;
    fn visit_vararg_intrinsic(&mut self, lhs: Option<VariableId>, args: &[Operand]) -> Self::Output;
}
