//! Getting products out of an import file.
//!
//! - [`loader`]: async read of the user-selected file into text
//! - [`csv`]: header validation and typed row parsing, with per-row diagnostics
//! - [`observability`]: observer hooks and severities for the import pipeline

pub mod csv;
pub mod loader;
pub mod observability;

pub use self::csv::{ParsedImport, RowDiagnostic, RowErrorPolicy, parse_products};
pub use loader::{load_text, load_text_from_reader};
pub use observability::{
    CompositeObserver, FileObserver, ImportContext, ImportObserver, ImportSeverity, ImportStats,
    TracingObserver,
};
