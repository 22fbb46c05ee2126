//! Reading an owner's holdings back from the ledger.
//!
//! Holdings are enumerated the only way the contract allows: ask for the owner's product
//! count, then the UID at each index, then each product. Contract integers may come back
//! either as JSON numbers or as decimal strings, so both are accepted.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{LedgerClient, methods};
use crate::error::{LedgerError, LedgerResult};
use crate::types::Account;

/// Whether a holding can be handed over right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HoldingStatus {
    Available,
    InTransit,
}

impl fmt::Display for HoldingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => f.write_str("Available"),
            Self::InTransit => f.write_str("In Transit"),
        }
    }
}

/// A product as the ledger reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub name: String,
    pub category: String,
    #[serde(deserialize_with = "lenient_int")]
    pub quantity: u64,
    pub unit: String,
    #[serde(deserialize_with = "lenient_int")]
    pub production_timestamp: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub expiry_timestamp: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub shelf_life_days: u64,
    pub storage_requirements: String,
    #[serde(default)]
    pub in_transit: bool,
}

impl ProductView {
    pub fn status(&self) -> HoldingStatus {
        if self.in_transit {
            HoldingStatus::InTransit
        } else {
            HoldingStatus::Available
        }
    }

    /// UTC calendar date of production.
    pub fn production_date(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.production_timestamp, 0).map(|dt| dt.date_naive())
    }

    /// UTC calendar date of expiry.
    pub fn expiry_date(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.expiry_timestamp, 0).map(|dt| dt.date_naive())
    }
}

/// One of an owner's holdings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    pub uid: String,
    pub product: ProductView,
}

impl InventoryItem {
    /// Only available holdings can start a transfer.
    pub fn is_transferable(&self) -> bool {
        self.product.status() == HoldingStatus::Available
    }
}

/// Load every product currently held by `owner`, in ledger index order.
pub async fn load_owner_products(
    client: &dyn LedgerClient,
    owner: &Account,
) -> LedgerResult<Vec<InventoryItem>> {
    let count_value = client
        .query_state(methods::GET_OWNER_PRODUCT_COUNT, vec![json!(owner)])
        .await?;
    let count: u64 = int_from_value(&count_value)
        .ok_or_else(|| unexpected(methods::GET_OWNER_PRODUCT_COUNT, &count_value))?;

    let mut items = Vec::new();
    for index in 0..count {
        let uid_value = client
            .query_state(methods::GET_OWNER_PRODUCT_AT, vec![json!(owner), json!(index)])
            .await?;
        let uid = uid_value
            .as_str()
            .ok_or_else(|| unexpected(methods::GET_OWNER_PRODUCT_AT, &uid_value))?
            .to_string();

        let product_value = client
            .query_state(methods::GET_PRODUCT, vec![json!(uid)])
            .await?;
        let product: ProductView =
            serde_json::from_value(product_value).map_err(|e| LedgerError::UnexpectedResponse {
                method: methods::GET_PRODUCT.to_string(),
                message: e.to_string(),
            })?;
        items.push(InventoryItem { uid, product });
    }

    tracing::debug!(%owner, count = items.len(), "loaded owner products");
    Ok(items)
}

/// Hook run after a batch lands, so whatever displays holdings can catch up.
#[async_trait]
pub trait InventoryRefresher: Send + Sync {
    async fn refresh(&self);
}

/// Last known holdings of an owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InventorySnapshot {
    #[default]
    NotLoaded,
    Loaded(Vec<InventoryItem>),
    /// The last reload failed; holds the error message.
    Failed(String),
}

/// [`InventoryRefresher`] that reloads an owner's holdings from the ledger.
pub struct LedgerInventory {
    client: Arc<dyn LedgerClient>,
    owner: Mutex<Account>,
    snapshot: Mutex<InventorySnapshot>,
}

impl fmt::Debug for LedgerInventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerInventory")
            .field("owner", &self.owner())
            .field("snapshot", &self.latest())
            .finish()
    }
}

impl LedgerInventory {
    pub fn new(client: Arc<dyn LedgerClient>, owner: Account) -> Self {
        Self {
            client,
            owner: Mutex::new(owner),
            snapshot: Mutex::new(InventorySnapshot::NotLoaded),
        }
    }

    pub fn owner(&self) -> Account {
        self.owner.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Switch to another account. The snapshot is cleared until the next reload.
    pub fn set_owner(&self, owner: Account) {
        *self.owner.lock().unwrap_or_else(PoisonError::into_inner) = owner;
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) =
            InventorySnapshot::NotLoaded;
    }

    /// The most recent reload result.
    pub fn latest(&self) -> InventorySnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reload holdings now and store the result as the latest snapshot.
    pub async fn reload(&self) -> LedgerResult<Vec<InventoryItem>> {
        let owner = self.owner();
        let result = load_owner_products(self.client.as_ref(), &owner).await;
        let snapshot = match &result {
            Ok(items) => InventorySnapshot::Loaded(items.clone()),
            Err(e) => InventorySnapshot::Failed(e.to_string()),
        };
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
        result
    }
}

#[async_trait]
impl InventoryRefresher for LedgerInventory {
    async fn refresh(&self) {
        if let Err(error) = self.reload().await {
            tracing::warn!(%error, "error loading products");
        }
    }
}

fn unexpected(method: &str, value: &Value) -> LedgerError {
    LedgerError::UnexpectedResponse {
        method: method.to_string(),
        message: format!("expected an integer or string, got {value}"),
    }
}

fn int_from_value<T: FromStr>(value: &Value) -> Option<T> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_int<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let value = Value::deserialize(deserializer)?;
    int_from_value(&value)
        .ok_or_else(|| de::Error::custom(format!("expected an integer, got {value}")))
}

#[cfg(test)]
mod tests {
    use super::{HoldingStatus, ProductView};
    use serde_json::json;

    #[test]
    fn product_view_accepts_stringified_integers() {
        let view: ProductView = serde_json::from_value(json!({
            "0": "ignored positional copy",
            "name": "Apples",
            "category": "Produce",
            "quantity": "100",
            "unit": "kg",
            "productionTimestamp": "1704067200",
            "expiryTimestamp": 1706659200,
            "shelfLifeDays": "30",
            "storageRequirements": "Refrigerated",
            "inTransit": true
        }))
        .unwrap();

        assert_eq!(view.quantity, 100);
        assert_eq!(view.shelf_life_days, 30);
        assert_eq!(view.status(), HoldingStatus::InTransit);
        assert_eq!(view.status().to_string(), "In Transit");
        assert_eq!(view.expiry_date().unwrap().to_string(), "2024-01-31");
    }

    #[test]
    fn product_view_rejects_non_numeric_quantity() {
        let err = serde_json::from_value::<ProductView>(json!({
            "name": "Apples",
            "category": "Produce",
            "quantity": "lots",
            "unit": "kg",
            "productionTimestamp": 0,
            "expiryTimestamp": 0,
            "shelfLifeDays": 0,
            "storageRequirements": ""
        }))
        .unwrap_err();
        assert!(err.to_string().contains("expected an integer"));
    }
}
