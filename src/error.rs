use thiserror::Error;

/// Convenience result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Convenience result type for raw ledger client calls.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error type returned by the import pipeline and the single-item ledger calls.
///
/// Stage-level failures abort the whole import. Row-level problems are only surfaced here
/// when [`crate::ingestion::RowErrorPolicy::Abort`] is selected; otherwise they are absorbed
/// as [`crate::ingestion::RowDiagnostic`]s.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The import file could not be read (missing file, permission denied, invalid UTF-8).
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),

    /// The CSV reader failed below the row level.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The header line does not match the fixed product schema.
    #[error("Invalid CSV format. Please use the correct headers. ({message})")]
    Format { message: String },

    /// A data row failed validation while the abort policy was selected.
    #[error("row at line {line} rejected: {reason}")]
    RowRejected { line: u64, reason: RowError },

    /// Nothing survived parsing, so there is nothing to submit.
    #[error("no valid product rows to submit")]
    EmptyBatch,

    /// The ledger rejected the transaction. `message` is the first line of the ledger error.
    #[error("{message}")]
    Submission { message: String },

    /// Another import on the same pipeline has not reached a terminal state yet.
    #[error("an import is already in progress")]
    ImportInProgress,
}

/// Why a single data row was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("column '{column}' is not a non-negative integer: {message} (raw='{raw}')")]
    InvalidInteger {
        column: String,
        raw: String,
        message: String,
    },

    #[error("column '{column}' is not a date: {message} (raw='{raw}')")]
    InvalidDate {
        column: String,
        raw: String,
        message: String,
    },
}

/// Error reported by a [`crate::ledger::LedgerClient`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger or the signer refused the call (revert, insufficient funds, declined signature).
    #[error("{message}")]
    Rejected { message: String },

    /// A read call returned a value of an unexpected shape.
    #[error("unexpected response from '{method}': {message}")]
    UnexpectedResponse { method: String, message: String },
}

impl LedgerError {
    /// Build a [`LedgerError::Rejected`] from any message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}
