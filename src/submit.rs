//! Sending an assembled batch to the ledger.

use std::fmt;
use std::sync::Arc;

use crate::batch::BatchPayload;
use crate::error::{ImportError, ImportResult};
use crate::ledger::calls::submission_error;
use crate::ledger::inventory::InventoryRefresher;
use crate::ledger::{LedgerClient, methods};
use crate::types::Account;

/// Result of a batch that landed on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Records carried by the transaction. The call is atomic, so this is all of them.
    pub records: usize,
    pub transaction_hash: String,
}

/// Sends a [`BatchPayload`] as one ledger transaction, then triggers an inventory refresh.
pub struct Submitter {
    client: Arc<dyn LedgerClient>,
    refresher: Arc<dyn InventoryRefresher>,
    method: String,
}

impl fmt::Debug for Submitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submitter")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl Submitter {
    pub fn new(client: Arc<dyn LedgerClient>, refresher: Arc<dyn InventoryRefresher>) -> Self {
        Self {
            client,
            refresher,
            method: methods::BATCH_REGISTER_PRODUCTS.to_string(),
        }
    }

    /// Override the contract method (defaults to `batchRegisterProducts`).
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Submit `batch` from `sender`.
    ///
    /// - An empty batch is rejected with [`ImportError::EmptyBatch`] before any call is made.
    /// - On success exactly one write call and one refresh happen.
    /// - On failure the error carries the first line of the ledger message; nothing is
    ///   retried and no refresh happens.
    pub async fn submit(&self, batch: BatchPayload, sender: &Account) -> ImportResult<SubmitOutcome> {
        if batch.is_empty() {
            return Err(ImportError::EmptyBatch);
        }
        let records = batch.len();

        let receipt = self
            .client
            .submit_transaction(&self.method, batch.into_call_args(), sender)
            .await
            .map_err(|e| submission_error(&self.method, &e))?;

        tracing::info!(
            records,
            tx = %receipt.transaction_hash,
            "batch registered"
        );
        self.refresher.refresh().await;

        Ok(SubmitOutcome {
            records,
            transaction_hash: receipt.transaction_hash,
        })
    }
}
