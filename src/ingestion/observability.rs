use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::json;

use crate::error::ImportError;
use crate::pipeline::ImportState;
use crate::types::Account;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (nothing was submitted, nothing is broken).
    Warning,
    /// Error-level event (import failed).
    Error,
    /// Critical error (typically I/O failures reading the import file).
    Critical,
}

impl ImportSeverity {
    /// Classify an import failure.
    pub fn for_error(error: &ImportError) -> Self {
        match error {
            ImportError::Read(_) => Self::Critical,
            ImportError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Error,
            },
            ImportError::Format { .. }
            | ImportError::RowRejected { .. }
            | ImportError::Submission { .. } => Self::Error,
            ImportError::EmptyBatch | ImportError::ImportInProgress => Self::Warning,
        }
    }
}

/// Context about an import attempt.
#[derive(Debug, Clone)]
pub struct ImportContext {
    /// Path or caller-supplied label of the import source.
    pub source: String,
    /// Account the batch is submitted from.
    pub account: Account,
}

/// Stats reported on a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStats {
    /// Records submitted in the batch transaction.
    pub records: usize,
    /// Rows dropped during parsing (only counted when diagnostics are collected).
    pub skipped: usize,
    pub transaction_hash: String,
}

/// Observer interface for import progress and outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ImportObserver: Send + Sync {
    /// Called on every pipeline state transition.
    fn on_state_change(&self, _ctx: &ImportContext, _from: ImportState, _to: ImportState) {}

    /// Called when the batch lands on the ledger.
    fn on_success(&self, _ctx: &ImportContext, _stats: &ImportStats) {}

    /// Called when the import fails.
    fn on_failure(&self, _ctx: &ImportContext, _severity: ImportSeverity, _error: &ImportError) {}

    /// Called when an import failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ImportObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ImportObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ImportObserver for CompositeObserver {
    fn on_state_change(&self, ctx: &ImportContext, from: ImportState, to: ImportState) {
        for o in &self.observers {
            o.on_state_change(ctx, from, to);
        }
    }

    fn on_success(&self, ctx: &ImportContext, stats: &ImportStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Forwards import events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ImportObserver for TracingObserver {
    fn on_state_change(&self, ctx: &ImportContext, from: ImportState, to: ImportState) {
        tracing::debug!(source = %ctx.source, ?from, ?to, "import state changed");
    }

    fn on_success(&self, ctx: &ImportContext, stats: &ImportStats) {
        tracing::info!(
            source = %ctx.source,
            account = %ctx.account,
            records = stats.records,
            skipped = stats.skipped,
            tx = %stats.transaction_hash,
            "import submitted"
        );
    }

    fn on_failure(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        tracing::warn!(source = %ctx.source, ?severity, %error, "import failed");
    }

    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        tracing::error!(source = %ctx.source, ?severity, %error, "import alert");
    }
}

/// Appends import outcomes to a local log file as JSON lines.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, event: serde_json::Value) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{event}");
        }
    }
}

impl ImportObserver for FileObserver {
    fn on_success(&self, ctx: &ImportContext, stats: &ImportStats) {
        self.append(json!({
            "ts": Utc::now().timestamp(),
            "event": "ok",
            "source": ctx.source,
            "account": ctx.account,
            "records": stats.records,
            "skipped": stats.skipped,
            "transactionHash": stats.transaction_hash,
        }));
    }

    fn on_failure(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        self.append(json!({
            "ts": Utc::now().timestamp(),
            "event": "fail",
            "severity": format!("{severity:?}"),
            "source": ctx.source,
            "account": ctx.account,
            "error": error.to_string(),
        }));
    }

    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        self.append(json!({
            "ts": Utc::now().timestamp(),
            "event": "alert",
            "severity": format!("{severity:?}"),
            "source": ctx.source,
            "account": ctx.account,
            "error": error.to_string(),
        }));
    }
}
