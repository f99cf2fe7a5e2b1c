//! An in-memory [`CheckResultStore`], useful for tests and for analysis
//! runs that consume their results in-process without ever touching disk.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{BlockId, CheckResult, CheckResultStore, CheckStatus, StatementId};
use crate::error::{Result, StorageError};

#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    results: Mutex<Vec<CheckResult>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckResultStore for InMemoryResultStore {
    async fn save_result(&self, result: &CheckResult) -> Result<()> {
        let mut results = self.results.lock().unwrap();
        results.retain(|r| !matches_key(r, &result.check_kind, result.call_context, result.block, result.statement_id));
        results.push(result.clone());
        Ok(())
    }

    async fn save_results(&self, results: &[CheckResult]) -> Result<()> {
        for r in results {
            self.save_result(r).await?;
        }
        Ok(())
    }

    async fn get_result(&self, check_kind: &str, call_context: u32, block: BlockId, statement_id: StatementId) -> Result<CheckResult> {
        self.results
            .lock()
            .unwrap()
            .iter()
            .find(|r| matches_key(r, check_kind, call_context, block, statement_id))
            .cloned()
            .ok_or_else(|| StorageError::result_not_found(check_kind, call_context, statement_id))
    }

    async fn get_results_for_check(&self, check_kind: &str) -> Result<Vec<CheckResult>> {
        Ok(self.results.lock().unwrap().iter().filter(|r| r.check_kind == check_kind).cloned().collect())
    }

    async fn get_results_by_status(&self, status: CheckStatus) -> Result<Vec<CheckResult>> {
        Ok(self.results.lock().unwrap().iter().filter(|r| r.status == status).cloned().collect())
    }

    async fn count_by_status(&self, status: CheckStatus) -> Result<usize> {
        Ok(self.results.lock().unwrap().iter().filter(|r| r.status == status).count())
    }
}

fn matches_key(r: &CheckResult, check_kind: &str, call_context: u32, block: BlockId, statement_id: StatementId) -> bool {
    r.check_kind == check_kind && r.call_context == call_context && r.block == block && r.statement_id == statement_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use absint_core::errors::SourceLocation;

    fn result(check_kind: &str, status: CheckStatus) -> CheckResult {
        CheckResult::new(check_kind, 0, SourceLocation::unknown(), 0, 1, status)
    }

    #[tokio::test]
    async fn a_saved_result_round_trips() {
        let store = InMemoryResultStore::new();
        store.save_result(&result("null-deref", CheckStatus::Warning)).await.unwrap();
        let got = store.get_result("null-deref", 0, 0, 1).await.unwrap();
        assert_eq!(got.status, CheckStatus::Warning);
    }

    #[tokio::test]
    async fn saving_the_same_key_twice_replaces_rather_than_duplicates() {
        let store = InMemoryResultStore::new();
        store.save_result(&result("null-deref", CheckStatus::Warning)).await.unwrap();
        store.save_result(&result("null-deref", CheckStatus::Ok)).await.unwrap();
        let all = store.get_results_for_check("null-deref").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, CheckStatus::Ok);
    }

    #[tokio::test]
    async fn an_unknown_key_reports_result_not_found() {
        let store = InMemoryResultStore::new();
        let err = store.get_result("null-deref", 0, 0, 1).await.unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::ResultNotFound);
    }

    #[tokio::test]
    async fn counts_and_filters_by_status() {
        let store = InMemoryResultStore::new();
        store.save_results(&[result("a", CheckStatus::Ok), result("b", CheckStatus::Error)]).await.unwrap();
        assert_eq!(store.count_by_status(CheckStatus::Error).await.unwrap(), 1);
        assert_eq!(store.get_results_by_status(CheckStatus::Ok).await.unwrap().len(), 1);
    }
}
