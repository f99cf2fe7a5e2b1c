//! External interfaces the core consumes (spec.md §6): a CFG, a variable
//! factory, a memory-location factory. These are traits, not concrete
//! types; the IR builder / frontend (outside this crate's scope)
//! implements them.

use super::ir::Statement;
use super::models::{BlockId, MemoryLocationId, MemoryLocationKind, VariableId, VariableKind};

/// A basic block's statements plus its control-flow neighbors.
pub trait ControlFlowGraph {
    fn entry(&self) -> BlockId;
    fn exit_blocks(&self) -> Vec<BlockId>;
    fn blocks(&self) -> Vec<BlockId>;
    fn successors(&self, block: BlockId) -> Vec<BlockId>;
    fn predecessors(&self, block: BlockId) -> Vec<BlockId>;
    fn statements(&self, block: BlockId) -> &[Statement];

    /// A precomputed weak topological ordering, if the frontend already
    /// has one; otherwise the core computes it itself (spec.md §6, §4.13).
    fn precomputed_wto(&self) -> Option<&crate::features::fixpoint::domain::wto::Wto> {
        None
    }
}

/// Supplies stable variable kinds (spec.md §6 "Variable factory"). Variable
/// *indices* themselves are handed out by the frontend and simply carried
/// as `VariableId`; the core never allocates one.
pub trait VariableFactory {
    fn kind_of(&self, var: VariableId) -> VariableKind;
}

/// Supplies stable kinds for abstract memory locations (spec.md §6
/// "Memory-location factory").
pub trait MemoryLocationFactory {
    fn kind_of(&self, location: MemoryLocationId) -> MemoryLocationKind;
}

/// Cooperative cancellation/timeout hook (spec.md §5, §6
/// `cancellation_flag`). Checked by the fixpoint iterator between CFG
/// nodes, never inside a block.
pub trait CancellationFlag {
    fn is_cancelled(&self) -> bool;
}

impl CancellationFlag for std::sync::atomic::AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(std::sync::atomic::Ordering::Relaxed)
    }
}

/// A flag that never cancels, for callers that do not need the hook.
pub struct NeverCancel;

impl CancellationFlag for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}
