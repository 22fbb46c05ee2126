//! Core data model types for product import.
//!
//! The import file follows one fixed [`Schema`] (an ordered list of [`Field`]s). Every data row that
//! passes validation becomes a [`ProductRecord`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single named column in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Header name as users write it (matched case-insensitively).
    pub name: String,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Ordered list of fields describing the expected header of an import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// The product import layout:
    /// `UID,Name,Category,Quantity,Unit,ProductionDate,ShelfLifeDays,StorageRequirements`.
    pub fn products() -> Self {
        Self::new(vec![
            Field::new("UID"),
            Field::new("Name"),
            Field::new("Category"),
            Field::new("Quantity"),
            Field::new("Unit"),
            Field::new("ProductionDate"),
            Field::new("ShelfLifeDays"),
            Field::new("StorageRequirements"),
        ])
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name (case-insensitive), if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Positional, case-insensitive header comparison.
    ///
    /// Returns a human-readable reason on mismatch.
    pub fn check_header<'a, I>(&self, header: I) -> Result<(), String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let found: Vec<&str> = header.into_iter().map(str::trim).collect();
        if found.len() != self.fields.len() {
            return Err(format!(
                "expected {} columns, found {}. headers={found:?}",
                self.fields.len(),
                found.len()
            ));
        }
        for (idx, (field, got)) in self.fields.iter().zip(&found).enumerate() {
            if !field.name.eq_ignore_ascii_case(got) {
                return Err(format!(
                    "column {} must be '{}', found '{got}'",
                    idx + 1,
                    field.name
                ));
            }
        }
        Ok(())
    }
}

/// One validated, schema-conformant product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// User-supplied identifier. May be empty; the import path never generates one.
    pub uid: String,
    pub name: String,
    pub category: String,
    pub quantity: u64,
    pub unit: String,
    /// Seconds since the Unix epoch.
    pub production_timestamp: i64,
    pub shelf_life_days: u64,
    pub storage_requirements: String,
}

/// Ledger account (address) acting as transaction sender or holdings owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Account(String);

impl Account {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Account {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
