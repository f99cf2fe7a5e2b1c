//! The symbolic transfer function (spec.md §4.12): per-statement effects
//! on a numerical abstract state, generic over which concrete domain
//! backs it, plus the external call model table and the block-level
//! composition the forward fixpoint iterator drives.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::block_transfer::{AnalysisState, StatementListTransfer};
pub use domain::call_model::{self, CallEffect, SizeArg};
pub use domain::memory::MemoryModel;
pub use domain::state::NumericalState;
pub use infrastructure::transfer_function::TransferFunction;
