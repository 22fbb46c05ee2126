#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use inventory_import::ledger::inventory::InventoryRefresher;
use inventory_import::ledger::{LedgerClient, TransactionReceipt, methods};
use inventory_import::types::Account;
use inventory_import::{LedgerError, LedgerResult};
use serde_json::{Value, json};
use tokio::sync::Semaphore;

pub const HEADER: &str =
    "UID,Name,Category,Quantity,Unit,ProductionDate,ShelfLifeDays,StorageRequirements";

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub args: Vec<Value>,
    pub sender: Account,
}

/// In-memory ledger: records writes, keeps a flat list of holdings, can reject or stall writes.
#[derive(Default)]
pub struct MockLedger {
    pub calls: Mutex<Vec<RecordedCall>>,
    pub holdings: Mutex<Vec<(String, Value)>>,
    reject_with: Mutex<Option<String>>,
    fail_queries: Mutex<bool>,
    gate: Option<Semaphore>,
    tx_counter: AtomicUsize,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes block until [`MockLedger::release`] is called.
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn reject_writes(&self, message: &str) {
        *self.reject_with.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_queries(&self) {
        *self.fail_queries.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn hold(&self, uid: &str, product: Value) {
        self.holdings.lock().unwrap().push((uid.to_string(), product));
    }

    fn register_batch(&self, args: &[Value]) {
        let column = |i: usize| args[i].as_array().cloned().unwrap_or_default();
        let (uids, names, categories, quantities) = (column(0), column(1), column(2), column(3));
        let (units, produced, shelf, storage) = (column(4), column(5), column(6), column(7));
        for i in 0..uids.len() {
            let produced_at = produced[i].as_i64().unwrap_or(0);
            let shelf_days = shelf[i].as_i64().unwrap_or(0);
            self.hold(
                uids[i].as_str().unwrap_or(""),
                json!({
                    "name": names[i],
                    "category": categories[i],
                    "quantity": quantities[i].to_string(),
                    "unit": units[i],
                    "productionTimestamp": produced_at.to_string(),
                    "expiryTimestamp": (produced_at + shelf_days * 86_400).to_string(),
                    "shelfLifeDays": shelf[i],
                    "storageRequirements": storage[i],
                    "inTransit": false
                }),
            );
        }
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn submit_transaction(
        &self,
        method: &str,
        args: Vec<Value>,
        sender: &Account,
    ) -> LedgerResult<TransactionReceipt> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            args: args.clone(),
            sender: sender.clone(),
        });

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let rejection = self.reject_with.lock().unwrap().clone();
        if let Some(message) = rejection {
            return Err(LedgerError::rejected(message));
        }

        if method == methods::BATCH_REGISTER_PRODUCTS {
            self.register_batch(&args);
        }
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TransactionReceipt::new(format!("0x{n:064x}")))
    }

    async fn query_state(&self, method: &str, args: Vec<Value>) -> LedgerResult<Value> {
        if *self.fail_queries.lock().unwrap() {
            return Err(LedgerError::rejected("node unreachable\nretry later"));
        }
        let holdings = self.holdings.lock().unwrap();
        match method {
            methods::GET_OWNER_PRODUCT_COUNT => Ok(json!(holdings.len().to_string())),
            methods::GET_OWNER_PRODUCT_AT => {
                let idx = args[1].as_u64().unwrap() as usize;
                Ok(json!(holdings[idx].0))
            }
            methods::GET_PRODUCT => {
                let uid = args[0].as_str().unwrap();
                holdings
                    .iter()
                    .find(|(u, _)| u == uid)
                    .map(|(_, p)| p.clone())
                    .ok_or_else(|| LedgerError::rejected("product not found"))
            }
            other => Err(LedgerError::rejected(format!("unknown method {other}"))),
        }
    }
}

/// Counts refresh calls.
#[derive(Debug, Default)]
pub struct CountingRefresher {
    pub count: AtomicUsize,
}

impl CountingRefresher {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventoryRefresher for CountingRefresher {
    async fn refresh(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn account() -> Account {
    Account::new("0x00000000000000000000000000000000000000a1")
}

pub fn csv_text(rows: &[&str]) -> String {
    let mut out = String::from(HEADER);
    for row in rows {
        out.push('\n');
        out.push_str(row);
    }
    out.push('\n');
    out
}
