//! The exported check-result record (spec.md §6 "Results database", §7
//! "Error handling design"): the unit the core hands to the external
//! results database, one per `(check_kind, call_context, source_location,
//! statement_id)`.

use crate::errors::SourceLocation;
use crate::shared::models::{BlockId, StatementId};

/// §7's three-way (four-way, counting `Unreachable`) outcome a single
/// check can have. Domain contradictions (the producing state was `⊥`)
/// and plain imprecision are both ordinary data here, never a Rust
/// `Result::Err`, only [`crate::errors::AnalyzerError`] aborts a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CheckStatus {
    /// The property was proved to hold.
    Ok,
    /// Could not prove the property; reported alongside the abstract
    /// state that produced it (§7 class 2, "imprecision").
    Warning,
    /// The property was disproved (§7 class 1 manifesting as a concrete
    /// violation, not the unreachable-sink case below).
    Error,
    /// The program point itself is unreachable (its invariant is `⊥`);
    /// any check anchored there is vacuously true but reported
    /// separately so a caller can tell "proved safe" from "can't happen".
    Unreachable,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "ok",
            CheckStatus::Warning => "warning",
            CheckStatus::Error => "error",
            CheckStatus::Unreachable => "unreachable",
        }
    }

    /// §7: "a process exit code reflects only outright analyzer errors;
    /// individual check warnings are data, not failures", so nothing
    /// reported through `CheckResult` ever fails a run by itself.
    pub fn is_failure_signal(&self) -> bool {
        false
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row bound for the results database's primary key, with a
/// JSON-shaped payload the check emitter controls the contents of. The
/// core never interprets `payload`; it only carries it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CheckResult {
    pub check_kind: String,
    pub call_context: u32,
    pub source_location: SourceLocation,
    pub block: BlockId,
    pub statement_id: StatementId,
    pub status: CheckStatus,
    pub payload: serde_json::Value,
}

impl CheckResult {
    pub fn new(check_kind: impl Into<String>, call_context: u32, source_location: SourceLocation, block: BlockId, statement_id: StatementId, status: CheckStatus) -> Self {
        Self {
            check_kind: check_kind.into(),
            call_context,
            source_location,
            block,
            statement_id,
            status,
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_match_the_database_vocabulary() {
        assert_eq!(CheckStatus::Ok.as_str(), "ok");
        assert_eq!(CheckStatus::Warning.as_str(), "warning");
        assert_eq!(CheckStatus::Error.as_str(), "error");
        assert_eq!(CheckStatus::Unreachable.as_str(), "unreachable");
    }

    #[test]
    fn no_check_status_is_itself_a_run_failure() {
        for s in [CheckStatus::Ok, CheckStatus::Warning, CheckStatus::Error, CheckStatus::Unreachable] {
            assert!(!s.is_failure_signal());
        }
    }

    #[test]
    fn a_result_carries_whatever_payload_the_caller_attaches() {
        let r = CheckResult::new("null-deref", 0, SourceLocation::unknown(), 3, 7, CheckStatus::Warning)
            .with_payload(serde_json::json!({"variable": "p"}));
        assert_eq!(r.payload["variable"], "p");
    }
}
