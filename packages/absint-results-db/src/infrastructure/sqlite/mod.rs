//! SQLite-backed [`CheckResultStore`]: file-based persistent storage for
//! runs whose results need to outlive the process.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use absint_core::errors::SourceLocation;

use crate::domain::{BlockId, CheckResult, CheckResultStore, CheckStatus, StatementId};
use crate::error::{Result, StorageError};

#[derive(Clone)]
pub struct SqliteResultStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteResultStore {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self { conn: Arc::new(Mutex::new(conn)) };
        store.init_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn: Arc::new(Mutex::new(conn)) };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS check_results (
                check_kind TEXT NOT NULL,
                call_context INTEGER NOT NULL,
                source_file TEXT NOT NULL,
                source_line INTEGER NOT NULL,
                source_column INTEGER NOT NULL,
                block INTEGER NOT NULL,
                statement_id INTEGER NOT NULL,
                status TEXT NOT NULL,
                payload TEXT NOT NULL,
                PRIMARY KEY (check_kind, call_context, block, statement_id)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_check_results_status ON check_results(status)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_check_results_kind ON check_results(check_kind)",
            [],
        )?;
        Ok(())
    }

    fn insert(tx: &rusqlite::Connection, result: &CheckResult) -> Result<()> {
        tx.execute(
            "INSERT OR REPLACE INTO check_results
             (check_kind, call_context, source_file, source_line, source_column, block, statement_id, status, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &result.check_kind,
                result.call_context,
                &result.source_location.file,
                result.source_location.line,
                result.source_location.column,
                result.block,
                result.statement_id,
                result.status.as_str(),
                serde_json::to_string(&result.payload)?,
            ],
        )?;
        Ok(())
    }
}

fn status_from_str(s: &str) -> rusqlite::Result<CheckStatus> {
    match s {
        "ok" => Ok(CheckStatus::Ok),
        "warning" => Ok(CheckStatus::Warning),
        "error" => Ok(CheckStatus::Error),
        "unreachable" => Ok(CheckStatus::Unreachable),
        other => Err(rusqlite::Error::InvalidColumnType(0, format!("unknown check status '{other}'"), rusqlite::types::Type::Text)),
    }
}

fn row_to_result(row: &rusqlite::Row<'_>) -> rusqlite::Result<CheckResult> {
    let status_str: String = row.get(7)?;
    let payload_str: String = row.get(8)?;
    Ok(CheckResult {
        check_kind: row.get(0)?,
        call_context: row.get(1)?,
        source_location: SourceLocation::new(row.get::<_, String>(2)?, row.get(3)?, row.get(4)?),
        block: row.get(5)?,
        statement_id: row.get(6)?,
        status: status_from_str(&status_str)?,
        payload: serde_json::from_str(&payload_str).unwrap_or(serde_json::Value::Null),
    })
}

#[async_trait]
impl CheckResultStore for SqliteResultStore {
    async fn save_result(&self, result: &CheckResult) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        Self::insert(&conn, result)
    }

    async fn save_results(&self, results: &[CheckResult]) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let tx = conn.unchecked_transaction()?;
        for result in results {
            Self::insert(&tx, result)?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn get_result(&self, check_kind: &str, call_context: u32, block: BlockId, statement_id: StatementId) -> Result<CheckResult> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT check_kind, call_context, source_file, source_line, source_column, block, statement_id, status, payload
             FROM check_results WHERE check_kind = ?1 AND call_context = ?2 AND block = ?3 AND statement_id = ?4",
            params![check_kind, call_context, block, statement_id],
            row_to_result,
        )
        .optional()?
        .ok_or_else(|| StorageError::result_not_found(check_kind, call_context, statement_id))
    }

    async fn get_results_for_check(&self, check_kind: &str) -> Result<Vec<CheckResult>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT check_kind, call_context, source_file, source_line, source_column, block, statement_id, status, payload
             FROM check_results WHERE check_kind = ?1",
        )?;
        let rows = stmt.query_map(params![check_kind], row_to_result)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn get_results_by_status(&self, status: CheckStatus) -> Result<Vec<CheckResult>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT check_kind, call_context, source_file, source_line, source_column, block, statement_id, status, payload
             FROM check_results WHERE status = ?1",
        )?;
        let rows = stmt.query_map(params![status.as_str()], row_to_result)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn count_by_status(&self, status: CheckStatus) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM check_results WHERE status = ?1", params![status.as_str()], |row| row.get(0))?;
        Ok(count as usize)
    }
}
