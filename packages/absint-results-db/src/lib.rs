//! Results-database collaborator for the abstract-interpretation engine.
//!
//! The core (`absint-core`) produces [`CheckResult`] rows keyed by
//! `(check_kind, call_context, source_location, statement_id)` and hands
//! them to whatever implements [`CheckResultStore`] here; it never opens a
//! connection or picks a schema itself. This crate owns that choice: an
//! in-memory store for tests and short-lived runs, and a `rusqlite`-backed
//! store (behind the `sqlite` feature, on by default) for anything that
//! outlives the process.

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::{BlockId, CheckResult, CheckResultStore, CheckStatus, ProgramPoint, StatementId};
pub use error::{ErrorKind, Result, StorageError};
pub use infrastructure::memory::InMemoryResultStore;

#[cfg(feature = "sqlite")]
pub use infrastructure::sqlite::SqliteResultStore;
