//! Single-item ledger calls: register one product, hand it over, confirm receipt.

use chrono::Utc;
use rand::Rng;
use serde_json::{Value, json};

use super::{LedgerClient, TransactionReceipt, first_line, methods};
use crate::error::{ImportError, ImportResult, LedgerError};
use crate::types::{Account, ProductRecord};

/// Outcome of [`register_product`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// The UID actually registered (generated when the record had none).
    pub uid: String,
    pub receipt: TransactionReceipt,
}

/// Generate a product UID of the form `INV-<last 6 digits of epoch millis>-<4 random digits>`.
pub fn generate_uid() -> String {
    let millis = Utc::now().timestamp_millis().to_string();
    let tail = &millis[millis.len().saturating_sub(6)..];
    let random: u32 = rand::rng().random_range(0..10_000);
    format!("INV-{tail}-{random:04}")
}

/// Register a single product. An empty UID is replaced with [`generate_uid`].
pub async fn register_product(
    client: &dyn LedgerClient,
    sender: &Account,
    mut record: ProductRecord,
) -> ImportResult<Registration> {
    if record.uid.trim().is_empty() {
        record.uid = generate_uid();
    }
    let args = vec![
        json!(record.uid),
        json!(record.name),
        json!(record.category),
        json!(record.quantity),
        json!(record.unit),
        json!(record.production_timestamp),
        json!(record.shelf_life_days),
        json!(record.storage_requirements),
    ];

    let receipt = send(client, methods::REGISTER_PRODUCT, args, sender).await?;
    tracing::info!(uid = %record.uid, tx = %receipt.transaction_hash, "product registered");
    Ok(Registration {
        uid: record.uid,
        receipt,
    })
}

/// Start handing a product over to `recipient`. The product shows as in transit until the
/// recipient confirms.
pub async fn initiate_transfer(
    client: &dyn LedgerClient,
    sender: &Account,
    uid: &str,
    recipient: &Account,
) -> ImportResult<TransactionReceipt> {
    let args = vec![json!(uid), json!(recipient)];
    let receipt = send(client, methods::INITIATE_TRANSFER, args, sender).await?;
    tracing::info!(uid, %recipient, tx = %receipt.transaction_hash, "transfer initiated");
    Ok(receipt)
}

/// Confirm receipt of a product that is in transit to `sender`.
pub async fn confirm_received(
    client: &dyn LedgerClient,
    sender: &Account,
    uid: &str,
) -> ImportResult<TransactionReceipt> {
    let receipt = send(client, methods::CONFIRM_RECEIVED, vec![json!(uid)], sender).await?;
    tracing::info!(uid, tx = %receipt.transaction_hash, "receipt confirmed");
    Ok(receipt)
}

async fn send(
    client: &dyn LedgerClient,
    method: &str,
    args: Vec<Value>,
    sender: &Account,
) -> ImportResult<TransactionReceipt> {
    client
        .submit_transaction(method, args, sender)
        .await
        .map_err(|e| submission_error(method, &e))
}

pub(crate) fn submission_error(method: &str, error: &LedgerError) -> ImportError {
    let full = error.to_string();
    tracing::warn!(method, error = %full, "ledger call rejected");
    ImportError::Submission {
        message: first_line(&full).to_string(),
    }
}
