//! Pivoting parsed records into the columnar shape of a batched ledger call.

use serde::Serialize;
use serde_json::Value;

use crate::types::ProductRecord;

/// Eight parallel columns, one per [`ProductRecord`] field.
///
/// Position `i` in every column describes record `i`. The columns can only be built from a
/// record slice, so they always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayload {
    uids: Vec<String>,
    names: Vec<String>,
    categories: Vec<String>,
    quantities: Vec<u64>,
    units: Vec<String>,
    production_timestamps: Vec<i64>,
    shelf_life_days: Vec<u64>,
    storage_requirements: Vec<String>,
}

impl BatchPayload {
    /// Project records into columns, preserving order. No validation is done here.
    pub fn from_records(records: &[ProductRecord]) -> Self {
        let n = records.len();
        let mut out = Self {
            uids: Vec::with_capacity(n),
            names: Vec::with_capacity(n),
            categories: Vec::with_capacity(n),
            quantities: Vec::with_capacity(n),
            units: Vec::with_capacity(n),
            production_timestamps: Vec::with_capacity(n),
            shelf_life_days: Vec::with_capacity(n),
            storage_requirements: Vec::with_capacity(n),
        };
        for r in records {
            out.uids.push(r.uid.clone());
            out.names.push(r.name.clone());
            out.categories.push(r.category.clone());
            out.quantities.push(r.quantity);
            out.units.push(r.unit.clone());
            out.production_timestamps.push(r.production_timestamp);
            out.shelf_life_days.push(r.shelf_life_days);
            out.storage_requirements.push(r.storage_requirements.clone());
        }
        out
    }

    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.uids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uids.is_empty()
    }

    pub fn uids(&self) -> &[String] {
        &self.uids
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn quantities(&self) -> &[u64] {
        &self.quantities
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn production_timestamps(&self) -> &[i64] {
        &self.production_timestamps
    }

    pub fn shelf_life_days(&self) -> &[u64] {
        &self.shelf_life_days
    }

    pub fn storage_requirements(&self) -> &[String] {
        &self.storage_requirements
    }

    /// Consume the batch into the eight call arguments, in ledger argument order:
    /// uids, names, categories, quantities, units, productionTimestamps, shelfLifeDays,
    /// storageRequirements.
    pub fn into_call_args(self) -> Vec<Value> {
        vec![
            Value::from(self.uids),
            Value::from(self.names),
            Value::from(self.categories),
            Value::from(self.quantities),
            Value::from(self.units),
            Value::from(self.production_timestamps),
            Value::from(self.shelf_life_days),
            Value::from(self.storage_requirements),
        ]
    }
}

impl From<&[ProductRecord]> for BatchPayload {
    fn from(records: &[ProductRecord]) -> Self {
        Self::from_records(records)
    }
}

/// Convenience wrapper around [`BatchPayload::from_records`].
pub fn to_batch(records: &[ProductRecord]) -> BatchPayload {
    BatchPayload::from_records(records)
}
