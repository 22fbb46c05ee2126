//! `inventory-import` bulk-registers inventory products on an external ledger contract from a
//! plain CSV file, and wraps the handful of single-item ledger calls around it.
//!
//! The primary entrypoint is [`pipeline::ImportPipeline`], which runs four stages:
//!
//! 1. **Load** the file as text ([`ingestion::loader`]).
//! 2. **Parse** it against the fixed product header, turning each good row into a
//!    [`types::ProductRecord`] ([`ingestion::csv`]).
//! 3. **Assemble** the records into eight parallel columns ([`batch::BatchPayload`]).
//! 4. **Submit** the columns as one `batchRegisterProducts` transaction, then refresh the
//!    displayed holdings ([`submit::Submitter`]).
//!
//! ## Input format
//!
//! ```text
//! UID,Name,Category,Quantity,Unit,ProductionDate,ShelfLifeDays,StorageRequirements
//! INV-001,Apples,Produce,100,kg,2024-01-01,30,Refrigerated
//! ,Bread,Bakery,50,loaves,2024-01-02,7,Dry
//! ```
//!
//! - The header is matched positionally and case-insensitively. A mismatch aborts the import.
//! - Blank lines are ignored.
//! - Rows with the wrong number of fields, or with a bad quantity, shelf life or date, are
//!   dropped. [`ingestion::RowErrorPolicy`] decides whether they are reported or abort the
//!   import.
//! - There is no quoting, so a comma inside a field breaks that row.
//!
//! ## Parsing without a ledger
//!
//! ```rust
//! use inventory_import::batch::to_batch;
//! use inventory_import::ingestion::{RowErrorPolicy, parse_products};
//!
//! let text = "UID,Name,Category,Quantity,Unit,ProductionDate,ShelfLifeDays,StorageRequirements\n\
//!             INV-001,Apples,Produce,100,kg,2024-01-15,30,Refrigerated\n\
//!             bad,row,only,three\n";
//!
//! let parsed = parse_products(text, RowErrorPolicy::Collect).unwrap();
//! assert_eq!(parsed.records.len(), 1);
//! assert_eq!(parsed.records[0].production_timestamp, 1_705_276_800);
//! assert_eq!(parsed.skipped[0].line, 3);
//!
//! let batch = to_batch(&parsed.records);
//! assert_eq!(batch.uids(), ["INV-001"]);
//! ```
//!
//! ## Running an import
//!
//! The ledger itself is supplied by the caller through [`ledger::LedgerClient`].
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use inventory_import::ledger::LedgerClient;
//! use inventory_import::ledger::inventory::LedgerInventory;
//! use inventory_import::pipeline::{ImportOptions, ImportPipeline, status_message};
//! use inventory_import::types::Account;
//!
//! # async fn demo(client: Arc<dyn LedgerClient>) {
//! let account = Account::new("0x52908400098527886E0F7030069857D2E4169EE7");
//! let inventory = Arc::new(LedgerInventory::new(client.clone(), account.clone()));
//! let pipeline = ImportPipeline::new(client, inventory.clone(), ImportOptions::default());
//!
//! let result = pipeline.run_from_path("products.csv", &account).await;
//! println!("{}", status_message(&result));
//! println!("{:?}", inventory.latest());
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: import schema, product records, accounts
//! - [`ingestion`]: loading, parsing, observer hooks
//! - [`batch`]: the columnar batch payload
//! - [`ledger`]: the ledger client seam, single-item calls, holdings read-back
//! - [`submit`]: sending a batch
//! - [`pipeline`]: the state-machine-driven import entrypoint
//! - [`error`]: error types

pub mod batch;
pub mod error;
pub mod ingestion;
pub mod ledger;
pub mod pipeline;
pub mod submit;
pub mod types;

pub use error::{ImportError, ImportResult, LedgerError, LedgerResult, RowError};
