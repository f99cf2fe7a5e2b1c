//! Wires the per-statement [`TransferFunction`] into a whole-block
//! [`BlockTransfer`] the forward fixpoint iterator can drive (spec.md
//! §4.12 meets §4.13): folds a block's statements in order, carrying the
//! numerical state and the memory-cell model together as the one
//! propagated value `D`.

use crate::errors::Result;
use crate::features::fixpoint::application::iterator::BlockTransfer;
use crate::features::pointer_analysis::domain::pointer_info::PointerInfo;
use crate::features::transfer::domain::memory::MemoryModel;
use crate::features::transfer::domain::state::NumericalState;
use crate::features::transfer::infrastructure::transfer_function::TransferFunction;
use crate::shared::ir::StatementVisitor;
use crate::shared::lattice::AbstractDomain;
use crate::shared::models::{BlockId, VariableId};
use crate::shared::ports::{ControlFlowGraph, VariableFactory};

/// The register file (`S`) and memory-cell contents propagated together
/// as one lattice value, `D` in spec.md §4.13's fixpoint iterator.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisState<S> {
    pub numerical: S,
    pub memory: MemoryModel,
}

impl<S: NumericalState> AnalysisState<S> {
    pub fn new(numerical: S, memory: MemoryModel) -> Self {
        Self { numerical, memory }
    }
}

impl<S: NumericalState> AbstractDomain for AnalysisState<S> {
    fn bottom() -> Self {
        Self {
            numerical: S::bottom(),
            memory: MemoryModel::new(),
        }
    }

    fn top() -> Self {
        Self {
            numerical: S::top(),
            memory: MemoryModel::new(),
        }
    }

    fn is_bottom(&self) -> bool {
        self.numerical.is_bottom()
    }

    fn is_top(&self) -> bool {
        self.numerical.is_top() && self.memory.is_top()
    }

    fn set_to_bottom(&mut self) {
        self.numerical.set_to_bottom();
        self.memory = MemoryModel::new();
    }

    fn set_to_top(&mut self) {
        self.numerical.set_to_top();
        self.memory = MemoryModel::new();
    }

    /// `⊥` is absorbing on either side, same as every other domain here
    /// (an unreachable block imposes no constraint on a reachable one).
    fn leq(&self, other: &Self) -> bool {
        if self.is_bottom() {
            return true;
        }
        if other.is_bottom() {
            return false;
        }
        self.numerical.leq(&other.numerical) && self.memory.leq(&other.memory)
    }

    fn join(&self, other: &Self) -> Self {
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        Self {
            numerical: self.numerical.join(&other.numerical),
            memory: self.memory.join(&other.memory),
        }
    }

    fn meet(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom();
        }
        Self {
            numerical: self.numerical.meet(&other.numerical),
            memory: self.memory.meet(&other.memory),
        }
    }

    fn widening(&self, other: &Self) -> Self {
        if self.is_bottom() {
            return other.clone();
        }
        Self {
            numerical: self.numerical.widening(&other.numerical),
            memory: self.memory.widening(&other.memory),
        }
    }

    fn widening_threshold(&self, other: &Self, thresholds: &[i64]) -> Self {
        if self.is_bottom() {
            return other.clone();
        }
        Self {
            numerical: self.numerical.widening_threshold(&other.numerical, thresholds),
            memory: self.memory.widening(&other.memory),
        }
    }

    fn narrowing(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom();
        }
        Self {
            numerical: self.numerical.narrowing(&other.numerical),
            memory: self.memory.narrowing(&other.memory),
        }
    }
}

/// A [`BlockTransfer`] that runs every statement of a block through a
/// fresh [`TransferFunction`] seeded from the incoming [`AnalysisState`].
pub struct StatementListTransfer<'a, S: NumericalState> {
    cfg: &'a dyn ControlFlowGraph,
    points_to: &'a PointerInfo,
    var_kinds: &'a dyn VariableFactory,
    size_var_of: Option<&'a dyn Fn(VariableId) -> Option<VariableId>>,
    _numerical_state: std::marker::PhantomData<S>,
}

impl<'a, S: NumericalState> StatementListTransfer<'a, S> {
    pub fn new(cfg: &'a dyn ControlFlowGraph, points_to: &'a PointerInfo, var_kinds: &'a dyn VariableFactory) -> Self {
        Self {
            cfg,
            points_to,
            var_kinds,
            size_var_of: None,
            _numerical_state: std::marker::PhantomData,
        }
    }

    pub fn with_size_vars(mut self, f: &'a dyn Fn(VariableId) -> Option<VariableId>) -> Self {
        self.size_var_of = Some(f);
        self
    }
}

impl<'a, S: NumericalState> BlockTransfer<AnalysisState<S>> for StatementListTransfer<'a, S> {
    fn apply(&mut self, block: BlockId, pre: &AnalysisState<S>) -> Result<AnalysisState<S>> {
        if pre.is_bottom() {
            return Ok(pre.clone());
        }
        let mut tf = TransferFunction::new(pre.numerical.clone(), pre.memory.clone(), self.points_to, self.var_kinds);
        if let Some(f) = self.size_var_of {
            tf = tf.with_size_vars(f);
        }
        for stmt in self.cfg.statements(block) {
            tf.visit(stmt)?;
        }
        let (numerical, memory) = tf.into_parts();
        Ok(AnalysisState { numerical, memory })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::interval::domain::interval::Interval;
    use crate::features::numerical_domain::domain::non_relational::NonRelationalDomain;
    use crate::shared::ir::{BinaryOperator, Operand, Statement};
    use crate::shared::models::bound::Bound;
    use crate::shared::models::{MachineInt, OverflowMode, Signedness, VariableKind, ZNumber};

    struct AllInts;
    impl VariableFactory for AllInts {
        fn kind_of(&self, _var: VariableId) -> VariableKind {
            VariableKind::Integer {
                bit_width: 32,
                signedness: Signedness::Signed,
            }
        }
    }

    struct OneBlockCfg {
        stmts: Vec<Statement>,
    }

    impl ControlFlowGraph for OneBlockCfg {
        fn entry(&self) -> BlockId {
            0
        }
        fn exit_blocks(&self) -> Vec<BlockId> {
            vec![0]
        }
        fn blocks(&self) -> Vec<BlockId> {
            vec![0]
        }
        fn successors(&self, _block: BlockId) -> Vec<BlockId> {
            Vec::new()
        }
        fn predecessors(&self, _block: BlockId) -> Vec<BlockId> {
            Vec::new()
        }
        fn statements(&self, _block: BlockId) -> &[Statement] {
            &self.stmts
        }
    }

    type Store = NonRelationalDomain<Interval<ZNumber>>;

    fn iv(lo: i64, hi: i64) -> Interval<ZNumber> {
        Interval::new(Bound::Finite(ZNumber::from_i64(lo)), Bound::Finite(ZNumber::from_i64(hi)))
    }

    #[test]
    fn a_block_folds_its_statements_in_order() {
        let cfg = OneBlockCfg {
            stmts: vec![
                Statement::Assign {
                    lhs: 1,
                    rhs: Operand::ConstantInt(MachineInt::from_i64(10, 32, Signedness::Signed)),
                },
                Statement::BinaryOp {
                    lhs: 2,
                    op: BinaryOperator::Add,
                    left: Operand::Var(1),
                    right: Operand::ConstantInt(MachineInt::from_i64(5, 32, Signedness::Signed)),
                    overflow: OverflowMode::NoWrap,
                },
            ],
        };
        let points_to = PointerInfo::new();
        let kinds = AllInts;
        let mut transfer = StatementListTransfer::<Store>::new(&cfg, &points_to, &kinds);
        let pre = AnalysisState::new(Store::top(), MemoryModel::new());
        let post = transfer.apply(0, &pre).unwrap();
        assert_eq!(post.numerical.get_bound(2), iv(15, 15));
    }

    #[test]
    fn a_bottom_pre_state_short_circuits_the_whole_block() {
        let cfg = OneBlockCfg {
            stmts: vec![Statement::Unreachable],
        };
        let points_to = PointerInfo::new();
        let kinds = AllInts;
        let mut transfer = StatementListTransfer::<Store>::new(&cfg, &points_to, &kinds);
        let pre = AnalysisState::new(Store::bottom(), MemoryModel::new());
        let post = transfer.apply(0, &pre).unwrap();
        assert!(post.is_bottom());
    }

    #[test]
    fn join_is_absorbed_by_bottom_on_either_side() {
        let a = AnalysisState::<Store>::bottom();
        let mut b = AnalysisState::<Store>::top();
        b.numerical.set(1, iv(0, 10));
        assert_eq!(a.join(&b), b);
        assert_eq!(b.join(&a), b);
    }
}
