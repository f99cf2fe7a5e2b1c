//! The persisted shape of a check result and the storage contract every
//! backend (in-memory, SQLite) implements. The result types themselves are
//! not redefined here: this crate depends on `absint-core`, never the other
//! way around, so it simply re-exports the core's own `CheckResult` /
//! `CheckStatus` / `ProgramPoint`.

use async_trait::async_trait;

pub use absint_core::features::results::{CheckResult, CheckStatus, ProgramPoint};
pub use absint_core::shared::models::{BlockId, StatementId};

use crate::error::Result;

/// A durable sink for [`CheckResult`]s, keyed the way the results database
/// is keyed: `(check_kind, call_context, source_location, statement_id)`.
#[async_trait]
pub trait CheckResultStore: Send + Sync {
    async fn save_result(&self, result: &CheckResult) -> Result<()>;

    async fn save_results(&self, results: &[CheckResult]) -> Result<()>;

    async fn get_result(
        &self,
        check_kind: &str,
        call_context: u32,
        block: BlockId,
        statement_id: StatementId,
    ) -> Result<CheckResult>;

    async fn get_results_for_check(&self, check_kind: &str) -> Result<Vec<CheckResult>>;

    async fn get_results_by_status(&self, status: CheckStatus) -> Result<Vec<CheckResult>>;

    async fn count_by_status(&self, status: CheckStatus) -> Result<usize>;
}
