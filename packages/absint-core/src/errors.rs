//! Analyzer error types
//!
//! Three classes of failure are distinguished by the engine (see crate docs):
//! domain contradictions and imprecision are *not* errors, they are
//! ordinary lattice values (`⊥`) and [`crate::features::results::domain::CheckStatus::Warning`]
//! records respectively. Only IR malformedness, unsupported statements, and
//! lattice type mismatches are fatal `AnalyzerError`s that abort the current
//! analysis run.

use thiserror::Error;

use crate::shared::models::StatementId;

/// A source-level location, used to annotate fatal errors and check results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    pub fn unknown() -> Self {
        Self::new("<unknown>", 0, 0)
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Fatal analyzer error (§7 class 3). Carries `(kind, location, reason)`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalyzerError {
    #[error("malformed IR at {location}: {reason}")]
    MalformedIr {
        location: SourceLocation,
        reason: String,
    },

    #[error("unsupported statement {statement:?} at {location}")]
    UnsupportedStatement {
        statement: StatementId,
        location: SourceLocation,
    },

    #[error("type mismatch at {location}: operand has kind {found:?}, expected {expected:?}")]
    TypeMismatch {
        location: SourceLocation,
        expected: &'static str,
        found: &'static str,
    },

    #[error("mixed bit-width/signedness operation at {location}: {lhs_bits}/{lhs_signed} vs {rhs_bits}/{rhs_signed}")]
    MixedMachineIntWidth {
        location: SourceLocation,
        lhs_bits: u32,
        lhs_signed: bool,
        rhs_bits: u32,
        rhs_signed: bool,
    },

    #[error("variable-packing invariant violated: variable {var} present in two equivalence classes")]
    PackingInvariantViolated { var: u32 },

    #[error("fixpoint iterator exceeded configured cancellation/timeout budget")]
    Cancelled,

    #[error("APRON backend '{backend}' requested but not available in this build: {reason}")]
    UnsupportedBackend { backend: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
