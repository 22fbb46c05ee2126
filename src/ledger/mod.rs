//! The external ledger contract, seen as an opaque client.
//!
//! This crate never talks to a network itself. Callers provide a [`LedgerClient`] that knows
//! how to sign and send a contract transaction and how to run a read-only contract call.
//!
//! - [`calls`]: single-item register / transfer / confirm-receipt calls
//! - [`inventory`]: reading an owner's holdings back from the ledger

pub mod calls;
pub mod inventory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LedgerResult;
use crate::types::Account;

/// Contract method names used by this crate.
pub mod methods {
    pub const REGISTER_PRODUCT: &str = "registerProduct";
    pub const BATCH_REGISTER_PRODUCTS: &str = "batchRegisterProducts";
    pub const INITIATE_TRANSFER: &str = "initiateTransfer";
    pub const CONFIRM_RECEIVED: &str = "confirmReceived";
    pub const GET_OWNER_PRODUCT_COUNT: &str = "getOwnerProductCount";
    pub const GET_OWNER_PRODUCT_AT: &str = "getOwnerProductAt";
    pub const GET_PRODUCT: &str = "getProduct";
}

/// Receipt of an accepted write call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
}

impl TransactionReceipt {
    pub fn new(transaction_hash: impl Into<String>) -> Self {
        Self {
            transaction_hash: transaction_hash.into(),
        }
    }
}

/// Client for the ledger contract.
///
/// A write either lands in full or fails in full; the client has no way to report per-item
/// outcomes.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Sign and send a state-changing contract call from `sender`.
    async fn submit_transaction(
        &self,
        method: &str,
        args: Vec<Value>,
        sender: &Account,
    ) -> LedgerResult<TransactionReceipt>;

    /// Run a read-only contract call.
    async fn query_state(&self, method: &str, args: Vec<Value>) -> LedgerResult<Value>;
}

/// First line of a (possibly multi-line) ledger error message.
///
/// Ledger errors often append a JSON dump of the failing call after the human-readable line.
pub fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("").trim_end()
}
