//! Turns a completed [`FixpointResult`] (one invariant per block) into a
//! [`ResultsTable`] keyed at statement granularity, by replaying each
//! block's statements from its recorded `pre` state (spec.md §4.14: "a
//! mapping (program-point, call-context) -> abstract value populated by
//! the iterator").
//!
//! The fixpoint iterator itself only ever needs a block's `pre`/`post`
//! pair to drive widening/narrowing (`features::fixpoint`); recovering
//! the invariant *between* two statements of the same block is this
//! module's job, done by re-running the already-converged transfer
//! function one statement at a time instead of teaching the iterator
//! itself to remember every intermediate state.

use crate::errors::Result;
use crate::features::fixpoint::application::iterator::FixpointResult;
use crate::features::pointer_analysis::domain::pointer_info::PointerInfo;
use crate::features::transfer::application::block_transfer::AnalysisState;
use crate::features::transfer::domain::state::NumericalState;
use crate::features::transfer::infrastructure::transfer_function::TransferFunction;
use crate::shared::ir::StatementVisitor;
use crate::shared::lattice::AbstractDomain;
use crate::shared::ports::{ControlFlowGraph, VariableFactory};

use super::super::domain::program_point::ProgramPoint;
use super::super::domain::results_table::ResultsTable;

pub struct ProgramPointCollector<'a> {
    points_to: &'a PointerInfo,
    var_kinds: &'a dyn VariableFactory,
    call_context: u32,
}

impl<'a> ProgramPointCollector<'a> {
    pub fn new(points_to: &'a PointerInfo, var_kinds: &'a dyn VariableFactory, call_context: u32) -> Self {
        Self { points_to, var_kinds, call_context }
    }

    pub fn collect<S: NumericalState>(&self, cfg: &dyn ControlFlowGraph, fixpoint: &FixpointResult<AnalysisState<S>>) -> Result<ResultsTable<AnalysisState<S>>> {
        let mut table = ResultsTable::new();
        for block in cfg.blocks() {
            let Some(pre) = fixpoint.pre.get(&block) else {
                continue;
            };
            table.record(ProgramPoint::block_entry(self.call_context, block), pre.clone());
            if pre.is_bottom() {
                for (i, _) in cfg.statements(block).iter().enumerate() {
                    table.record(ProgramPoint::new(self.call_context, block, i as u32 + 1), pre.clone());
                }
                continue;
            }
            let mut tf = TransferFunction::new(pre.numerical.clone(), pre.memory.clone(), self.points_to, self.var_kinds);
            for (i, stmt) in cfg.statements(block).iter().enumerate() {
                tf.visit(stmt)?;
                let snapshot = AnalysisState::new(tf.inv.clone(), tf.memory.clone());
                table.record(ProgramPoint::new(self.call_context, block, i as u32 + 1), snapshot);
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::features::fixpoint::application::iterator::{BlockTransfer, FixpointIterator};
    use crate::features::interval::domain::interval::Interval;
    use crate::features::numerical_domain::domain::non_relational::NonRelationalDomain;
    use crate::features::transfer::application::block_transfer::StatementListTransfer;
    use crate::features::transfer::domain::memory::MemoryModel;
    use crate::shared::ir::{BinaryOperator, Operand, Statement};
    use crate::shared::lattice::AbstractDomain;
    use crate::shared::models::bound::Bound;
    use crate::shared::models::{BlockId, MachineInt, OverflowMode, Signedness, VariableId, VariableKind, ZNumber};
    use crate::shared::ports::NeverCancel;

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
    fn each_statement_gets_its_own_recorded_invariant() {
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
        let config = AnalysisConfig::default();
        let never = NeverCancel;

        let iter = FixpointIterator::<AnalysisState<Store>>::new(&cfg, &config, &never);
        let mut transfer = StatementListTransfer::<Store>::new(&cfg, &points_to, &kinds);
        let entry = AnalysisState::new(Store::top(), MemoryModel::new());
        let fixpoint = iter.run(entry, transfer).unwrap();

        let collector = ProgramPointCollector::new(&points_to, &kinds, 0);
        let table = collector.collect(&cfg, &fixpoint).unwrap();

        let after_first = table.get(ProgramPoint::new(0, 0, 1)).unwrap();
        assert_eq!(after_first.numerical.get_bound(1), iv(10, 10));
        let after_second = table.get(ProgramPoint::new(0, 0, 2)).unwrap();
        assert_eq!(after_second.numerical.get_bound(2), iv(15, 15));
    }

    #[test]
    fn an_unreachable_block_records_bottom_at_every_point() {
        let cfg = OneBlockCfg {
            stmts: vec![Statement::Unreachable],
        };
        let points_to = PointerInfo::new();
        let kinds = AllInts;
        let collector = ProgramPointCollector::new(&points_to, &kinds, 0);
        let mut fixpoint = FixpointResult {
            pre: Default::default(),
            post: Default::default(),
            cancelled: false,
        };
        fixpoint.pre.insert(0, AnalysisState::<Store>::bottom());
        let table = collector.collect(&cfg, &fixpoint).unwrap();
        assert!(table.is_unreachable(ProgramPoint::block_entry(0, 0)));
        assert!(table.is_unreachable(ProgramPoint::new(0, 0, 1)));
    }
}
