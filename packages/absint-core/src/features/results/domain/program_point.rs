//! Keys into the results table (spec.md §4.14): a program point identifies
//! "after statement `statement` of block `block`", and a call context
//! distinguishes otherwise-identical program points reached under
//! different calling contexts (the same `u32` call-context convention
//! [`crate::features::pointer_analysis::domain::abstract_location`] uses
//! for dynamic-allocation sites).

use crate::shared::models::{BlockId, StatementId};

/// One point in one function's control-flow graph, under one call context.
///
/// `statement` indexes into [`crate::shared::ports::ControlFlowGraph::statements`]'s
/// slice for `block`; it is a position, not a global id, since the core
/// never allocates statement identity itself (spec.md §6 "Variable
/// factory" / "Memory-location factory", statements get no factory of
/// their own).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ProgramPoint {
    pub call_context: u32,
    pub block: BlockId,
    pub statement: StatementId,
}

impl ProgramPoint {
    pub fn new(call_context: u32, block: BlockId, statement: StatementId) -> Self {
        Self { call_context, block, statement }
    }

    /// The point just before the block's first statement, the fixpoint
    /// iterator's own per-block `pre` state, reindexed under this table's
    /// key shape.
    pub fn block_entry(call_context: u32, block: BlockId) -> Self {
        Self::new(call_context, block, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_by_context_then_block_then_statement() {
        let a = ProgramPoint::new(0, 1, 5);
        let b = ProgramPoint::new(0, 1, 6);
        let c = ProgramPoint::new(1, 0, 0);
        assert!(a < b);
        assert!(b < c);
    }
}
