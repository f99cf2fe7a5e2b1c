pub mod call_model;
pub mod memory;
pub mod state;

pub use memory::MemoryModel;
pub use state::NumericalState;
