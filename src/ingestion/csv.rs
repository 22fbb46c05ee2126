//! CSV product parsing.
//!
//! The format is deliberately plain: comma separated, no quoting, one header line followed by
//! data rows. A comma inside a field shifts the alignment of the row, which then fails the
//! field-count check.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use serde::Deserialize;

use crate::error::{ImportError, ImportResult, RowError};
use crate::types::{ProductRecord, Schema};

/// What to do with a data row that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowErrorPolicy {
    /// Drop the row without recording a diagnostic.
    Skip,
    /// Drop the row and record a [`RowDiagnostic`].
    #[default]
    Collect,
    /// Fail the whole parse on the first bad row.
    Abort,
}

impl FromStr for RowErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "collect" => Ok(Self::Collect),
            "abort" => Ok(Self::Abort),
            other => Err(format!(
                "unknown row error policy '{other}' (expected skip/collect/abort)"
            )),
        }
    }
}

/// A dropped data row and why it was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDiagnostic {
    /// 1-based line number in the source text.
    pub line: u64,
    pub reason: RowError,
}

impl fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Output of a successful parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedImport {
    /// Accepted records, in source row order.
    pub records: Vec<ProductRecord>,
    /// Rows dropped for validation failures. Always empty under [`RowErrorPolicy::Skip`].
    pub skipped: Vec<RowDiagnostic>,
}

/// Reader configuration matching the import format.
///
/// Headers are handled by the parser itself, quoting is disabled and field counts may vary
/// (mismatches become row errors instead of reader errors). Only `\n` ends a line; the `\r`
/// of a CRLF ending stays on the last field and is trimmed away with the rest.
fn product_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_reader(text.as_bytes())
}

/// Parse import text into product records.
///
/// Rules:
///
/// - The first line must be the header and match [`Schema::products`] positionally
///   (case-insensitive, trimmed). Otherwise [`ImportError::Format`] and no records.
/// - Blank lines are ignored.
/// - Rows with the wrong field count, a malformed quantity/shelf life, or an unparseable
///   production date are handled according to `policy`.
pub fn parse_products(text: &str, policy: RowErrorPolicy) -> ImportResult<ParsedImport> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let schema = Schema::products();
    let mut lines = LineLocator::new(text);
    let mut rdr = product_reader(text);
    let mut records = rdr.records();

    let header = match records.next() {
        Some(result) => result?,
        None => {
            return Err(ImportError::Format {
                message: "input is empty".to_string(),
            });
        }
    };
    // The reader swallows leading blank lines; the header still has to be line 1.
    let header_line = lines.line_of(&header);
    if header_line != 1 {
        return Err(ImportError::Format {
            message: format!("header must be on line 1, found on line {header_line}"),
        });
    }
    schema
        .check_header(header.iter())
        .map_err(|message| ImportError::Format { message })?;

    let mut out = ParsedImport::default();
    for result in records {
        let record = result?;
        let line = lines.line_of(&record);

        if is_blank(&record) {
            continue;
        }

        match parse_record(&schema, &record) {
            Ok(product) => out.records.push(product),
            Err(reason) => {
                tracing::debug!(line, %reason, "skipping import row");
                match policy {
                    RowErrorPolicy::Skip => {}
                    RowErrorPolicy::Collect => out.skipped.push(RowDiagnostic { line, reason }),
                    RowErrorPolicy::Abort => return Err(ImportError::RowRejected { line, reason }),
                }
            }
        }
    }

    Ok(out)
}

/// Maps record byte offsets back to 1-based source lines.
///
/// A record's position points just past the previous record, before any empty lines the
/// reader skipped, so those are stepped over first. Offsets must be fed in increasing order.
struct LineLocator<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: u64,
}

impl<'a> LineLocator<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_of(&mut self, record: &StringRecord) -> u64 {
        let pos = record
            .position()
            .map_or(self.offset, |p| usize::try_from(p.byte()).unwrap_or(usize::MAX));
        let mut start = pos.min(self.bytes.len());
        while start < self.bytes.len() && self.bytes[start] == b'\n' {
            start += 1;
        }
        if start > self.offset {
            let newlines = self.bytes[self.offset..start]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.line += newlines as u64;
            self.offset = start;
        }
        self.line
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(|f| f.trim().is_empty())
}

fn parse_record(schema: &Schema, record: &StringRecord) -> Result<ProductRecord, RowError> {
    if record.len() != schema.len() {
        return Err(RowError::FieldCount {
            expected: schema.len(),
            found: record.len(),
        });
    }

    let field = |idx: usize| record.get(idx).unwrap_or("").trim();
    let column = |idx: usize| schema.fields.get(idx).map_or("", |f| f.name.as_str());

    Ok(ProductRecord {
        uid: field(0).to_owned(),
        name: field(1).to_owned(),
        category: field(2).to_owned(),
        quantity: parse_count(column(3), field(3))?,
        unit: field(4).to_owned(),
        production_timestamp: parse_timestamp(column(5), field(5))?,
        shelf_life_days: parse_count(column(6), field(6))?,
        storage_requirements: field(7).to_owned(),
    })
}

fn parse_count(column: &str, raw: &str) -> Result<u64, RowError> {
    raw.parse::<u64>().map_err(|e| RowError::InvalidInteger {
        column: column.to_owned(),
        raw: raw.to_owned(),
        message: e.to_string(),
    })
}

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Convert date text to epoch seconds.
///
/// Plain dates are midnight UTC. Date-times without an offset are read as UTC.
fn parse_timestamp(column: &str, raw: &str) -> Result<i64, RowError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().timestamp());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp());
    }
    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt.and_utc().timestamp());
        }
    }

    Err(RowError::InvalidDate {
        column: column.to_owned(),
        raw: raw.to_owned(),
        message: "expected YYYY-MM-DD or an RFC 3339 date-time".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{RowErrorPolicy, parse_timestamp};

    #[test]
    fn plain_date_is_midnight_utc() {
        assert_eq!(parse_timestamp("ProductionDate", "2024-01-15").unwrap(), 1_705_276_800);
    }

    #[test]
    fn rfc3339_offset_is_honoured() {
        assert_eq!(
            parse_timestamp("ProductionDate", "2024-01-15T02:00:00+02:00").unwrap(),
            1_705_276_800
        );
    }

    #[test]
    fn naive_date_time_is_read_as_utc() {
        assert_eq!(
            parse_timestamp("ProductionDate", "2024-01-15 01:00").unwrap(),
            1_705_276_800 + 3_600
        );
    }

    #[test]
    fn garbage_date_is_an_error() {
        let err = parse_timestamp("ProductionDate", "yesterday").unwrap_err();
        assert!(err.to_string().contains("column 'ProductionDate' is not a date"));
    }

    #[test]
    fn policy_parses_from_config_text() {
        assert_eq!("Abort".parse::<RowErrorPolicy>().unwrap(), RowErrorPolicy::Abort);
        assert_eq!(RowErrorPolicy::default(), RowErrorPolicy::Collect);
        assert!("retry".parse::<RowErrorPolicy>().is_err());
    }
}
