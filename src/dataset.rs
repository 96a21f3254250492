//! In-memory dataset of exported listings with typed columns.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Result, TrendsError};
use crate::export::parse_source_timestamp;
use crate::models::{ListingRow, MergedRecord};

/// Date-time layouts accepted in the ItemCreationDate column.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
/// Day-only layouts; parsed as midnight.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Parse an ItemCreationDate cell.
pub fn parse_creation_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(ts);
        }
    }
    if let Some(ts) = parse_source_timestamp(value) {
        return Some(ts);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl ListingRow {
    /// Type a raw record. `row` is the 1-based data row used in errors.
    ///
    /// An empty creation date or price becomes `None`. A non-empty date that
    /// does not parse is a [`TrendsError::DateParse`]; a non-numeric price
    /// is a schema error.
    pub fn from_record(record: MergedRecord, row: usize) -> Result<Self> {
        let raw_date = record.item_creation_date.trim();
        let created = if raw_date.is_empty() {
            None
        } else {
            Some(
                parse_creation_date(raw_date).ok_or_else(|| TrendsError::DateParse {
                    value: raw_date.to_string(),
                    row,
                })?,
            )
        };

        let raw_price = record.price.trim();
        let price = if raw_price.is_empty() {
            None
        } else {
            match raw_price.parse::<f64>() {
                Ok(p) if p.is_finite() => Some(p),
                _ => {
                    return Err(TrendsError::Schema(format!(
                        "row {}: Price {:?} is not a number",
                        row, raw_price
                    )))
                }
            }
        };

        Ok(Self {
            price,
            created,
            record,
        })
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Ordered rows sharing the export schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<ListingRow>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<ListingRow>) -> Self {
        Self { rows }
    }

    /// Type every record, failing on the first bad row.
    pub fn from_records(records: Vec<MergedRecord>) -> Result<Self> {
        let rows = records
            .into_iter()
            .enumerate()
            .map(|(i, r)| ListingRow::from_record(r, i + 1))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ListingRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListingRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows without a creation date.
    pub fn undated(&self) -> usize {
        self.rows.iter().filter(|r| r.created.is_none()).count()
    }

    /// Distinct brands, sorted.
    pub fn brands(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.brand().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rows whose Brand equals `brand` exactly.
    pub fn filter_brand(&self, brand: &str) -> Dataset {
        Dataset {
            rows: self
                .rows
                .iter()
                .filter(|r| r.brand() == brand)
                .cloned()
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a ListingRow;
    type IntoIter = std::slice::Iter<'a, ListingRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
