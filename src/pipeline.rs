//! The import pipeline: load → parse → assemble → submit.
//!
//! Most callers should build one [`ImportPipeline`] per acting user and call
//! [`ImportPipeline::run_from_path`] (or one of the other `run_*` entrypoints).
//!
//! - Each invocation walks [`ImportState`] from `Loading` to `Succeeded` or `Failed`.
//! - While an invocation is in a non-terminal state, further invocations on the same pipeline
//!   are rejected with [`ImportError::ImportInProgress`].
//! - If an [`ImportObserver`] is configured, state changes and outcomes are reported to it.

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::AsyncRead;
use tracing::Instrument;

use crate::batch::to_batch;
use crate::error::{ImportError, ImportResult};
use crate::ingestion::csv::{RowDiagnostic, RowErrorPolicy, parse_products};
use crate::ingestion::loader::{load_text, load_text_from_reader};
use crate::ingestion::observability::{ImportContext, ImportObserver, ImportSeverity, ImportStats};
use crate::ledger::LedgerClient;
use crate::ledger::inventory::InventoryRefresher;
use crate::ledger::methods;
use crate::submit::Submitter;
use crate::types::Account;

/// Position of a pipeline in its per-invocation state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ImportState {
    /// Never run.
    #[default]
    Idle,
    Loading,
    Parsing,
    Assembling,
    Submitting,
    Succeeded,
    Failed,
}

impl ImportState {
    /// True for every state between `Idle` and a terminal state.
    pub fn is_in_progress(self) -> bool {
        matches!(
            self,
            Self::Loading | Self::Parsing | Self::Assembling | Self::Submitting
        )
    }
}

/// Options controlling pipeline behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ImportOptions {
    /// What happens to rows that fail validation.
    pub row_errors: RowErrorPolicy,
    /// Contract method receiving the batch.
    pub method: String,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ImportObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ImportSeverity,
}

impl fmt::Debug for ImportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportOptions")
            .field("row_errors", &self.row_errors)
            .field("method", &self.method)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            row_errors: RowErrorPolicy::default(),
            method: methods::BATCH_REGISTER_PRODUCTS.to_string(),
            observer: None,
            alert_at_or_above: ImportSeverity::Critical,
        }
    }
}

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Records registered by the batch transaction (all or nothing).
    pub records: usize,
    /// Rows dropped during parsing. Empty unless diagnostics are collected.
    pub skipped: Vec<RowDiagnostic>,
    pub transaction_hash: String,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Successfully registered {} products from CSV!",
            self.records
        )?;
        write!(f, "Transaction Hash: {}", self.transaction_hash)?;
        if !self.skipped.is_empty() {
            write!(f, "\nSkipped {} rows:", self.skipped.len())?;
            for diag in &self.skipped {
                write!(f, "\n  {diag}")?;
            }
        }
        Ok(())
    }
}

/// Render the result-panel text for an import outcome.
pub fn status_message(result: &ImportResult<ImportReport>) -> String {
    match result {
        Ok(report) => report.to_string(),
        Err(e) => format!("Error processing CSV: {e}"),
    }
}

/// CSV-to-ledger import pipeline.
///
/// Share it behind an `Arc` if imports can be triggered from several tasks; the in-flight
/// guard then keeps overlapping imports from racing each other.
pub struct ImportPipeline {
    submitter: Submitter,
    options: ImportOptions,
    state: Mutex<ImportState>,
}

impl fmt::Debug for ImportPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportPipeline")
            .field("state", &self.state())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ImportPipeline {
    pub fn new(
        client: Arc<dyn LedgerClient>,
        refresher: Arc<dyn InventoryRefresher>,
        options: ImportOptions,
    ) -> Self {
        let submitter = Submitter::new(client, refresher).with_method(options.method.clone());
        Self {
            submitter,
            options,
            state: Mutex::new(ImportState::Idle),
        }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Current state (the last invocation's terminal state once it has finished).
    pub fn state(&self) -> ImportState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Import the file at `path`, submitting from `account`.
    pub async fn run_from_path(
        &self,
        path: impl AsRef<Path>,
        account: &Account,
    ) -> ImportResult<ImportReport> {
        let path = path.as_ref();
        self.run(path.display().to_string(), account, load_text(path))
            .await
    }

    /// Import from an async reader. `label` identifies the source in logs and observer events.
    pub async fn run_from_reader<R>(
        &self,
        label: impl Into<String>,
        reader: R,
        account: &Account,
    ) -> ImportResult<ImportReport>
    where
        R: AsyncRead + Unpin,
    {
        self.run(label.into(), account, load_text_from_reader(reader))
            .await
    }

    /// Import text that is already in memory.
    pub async fn run_from_text(
        &self,
        label: impl Into<String>,
        text: &str,
        account: &Account,
    ) -> ImportResult<ImportReport> {
        let text = text.to_owned();
        self.run(label.into(), account, async move { Ok(text) }).await
    }

    async fn run<F>(&self, source: String, account: &Account, load: F) -> ImportResult<ImportReport>
    where
        F: Future<Output = ImportResult<String>>,
    {
        let ctx = ImportContext {
            source,
            account: account.clone(),
        };
        let span = tracing::info_span!("import", source = %ctx.source, account = %ctx.account);
        async {
            let result = self.execute(&ctx, load).await;
            self.report(&ctx, &result);
            result
        }
        .instrument(span)
        .await
    }

    async fn execute<F>(&self, ctx: &ImportContext, load: F) -> ImportResult<ImportReport>
    where
        F: Future<Output = ImportResult<String>>,
    {
        let run = self.begin(ctx)?;
        let result = self.stages(&run, ctx, load).await;
        run.finish(if result.is_ok() {
            ImportState::Succeeded
        } else {
            ImportState::Failed
        });
        result
    }

    async fn stages<F>(&self, run: &Run<'_>, ctx: &ImportContext, load: F) -> ImportResult<ImportReport>
    where
        F: Future<Output = ImportResult<String>>,
    {
        let text = load.await?;

        run.advance(ImportState::Parsing);
        let parsed = parse_products(&text, self.options.row_errors)?;

        run.advance(ImportState::Assembling);
        let batch = to_batch(&parsed.records);

        run.advance(ImportState::Submitting);
        let outcome = self.submitter.submit(batch, &ctx.account).await?;

        Ok(ImportReport {
            records: outcome.records,
            skipped: parsed.skipped,
            transaction_hash: outcome.transaction_hash,
        })
    }

    fn begin<'a>(&'a self, ctx: &'a ImportContext) -> ImportResult<Run<'a>> {
        let from = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.is_in_progress() {
                return Err(ImportError::ImportInProgress);
            }
            std::mem::replace(&mut *state, ImportState::Loading)
        };
        self.notify(ctx, from, ImportState::Loading);
        Ok(Run {
            pipeline: self,
            ctx,
            finished: false,
        })
    }

    fn transition(&self, ctx: &ImportContext, to: ImportState) {
        let from = std::mem::replace(
            &mut *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            to,
        );
        self.notify(ctx, from, to);
    }

    fn notify(&self, ctx: &ImportContext, from: ImportState, to: ImportState) {
        tracing::debug!(?from, ?to, "import stage");
        if let Some(obs) = self.options.observer.as_ref() {
            obs.on_state_change(ctx, from, to);
        }
    }

    fn report(&self, ctx: &ImportContext, result: &ImportResult<ImportReport>) {
        let Some(obs) = self.options.observer.as_ref() else {
            return;
        };
        match result {
            Ok(report) => obs.on_success(
                ctx,
                &ImportStats {
                    records: report.records,
                    skipped: report.skipped.len(),
                    transaction_hash: report.transaction_hash.clone(),
                },
            ),
            Err(e) => {
                let sev = ImportSeverity::for_error(e);
                obs.on_failure(ctx, sev, e);
                if sev >= self.options.alert_at_or_above {
                    obs.on_alert(ctx, sev, e);
                }
            }
        }
    }
}

/// Holds the pipeline's in-flight slot for one invocation.
///
/// Dropping it before [`Run::finish`] (e.g. the caller dropped the future mid-submit) marks
/// the pipeline `Failed` so the next invocation is not locked out.
struct Run<'a> {
    pipeline: &'a ImportPipeline,
    ctx: &'a ImportContext,
    finished: bool,
}

impl Run<'_> {
    fn advance(&self, to: ImportState) {
        self.pipeline.transition(self.ctx, to);
    }

    fn finish(mut self, to: ImportState) {
        self.finished = true;
        self.pipeline.transition(self.ctx, to);
    }
}

impl Drop for Run<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.pipeline.transition(self.ctx, ImportState::Failed);
        }
    }
}
