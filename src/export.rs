//! CSV export of merged listings, and concatenation of export files.
//!
//! The header is always written, so an empty run still produces a valid
//! file. Columns follow [`COLUMNS`] exactly.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime};

use crate::error::{Result, TrendsError};
use crate::models::{ListingDetail, ListingSummary, MergedRecord, COLUMNS};

/// Timestamp format of `itemCreationDate` in search results.
pub const SOURCE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
/// Timestamp format written to the ItemCreationDate column.
pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// What to do with a creation timestamp that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePolicy {
    /// Write an empty cell and keep going.
    #[default]
    Lenient,
    /// Abort the export with [`TrendsError::DateParse`].
    Strict,
}

/// Parse a search-result timestamp such as `2024-03-05T10:15:30.000Z`.
pub fn parse_source_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, SOURCE_DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Flatten a summary and its detail into the export schema.
///
/// `row` is only used to label a [`TrendsError::DateParse`] under
/// [`DatePolicy::Strict`].
pub fn merge_record(
    summary: &ListingSummary,
    detail: &ListingDetail,
    brand: &str,
    policy: DatePolicy,
    row: usize,
) -> Result<MergedRecord> {
    let raw_date = summary.item_creation_date.trim();
    let item_creation_date = if raw_date.is_empty() {
        String::new()
    } else {
        match parse_source_timestamp(raw_date) {
            Some(ts) => ts.format(EXPORT_DATE_FORMAT).to_string(),
            None => match policy {
                DatePolicy::Lenient => {
                    tracing::warn!(value = raw_date, row, "unparseable creation date left empty");
                    String::new()
                }
                DatePolicy::Strict => {
                    return Err(TrendsError::DateParse {
                        value: raw_date.to_string(),
                        row,
                    })
                }
            },
        }
    };

    Ok(MergedRecord {
        title: summary.title.clone(),
        short_description: detail.short_description.clone(),
        condition: summary.condition.clone(),
        seller_item_revision: detail.seller_item_revision.clone(),
        item_id: detail.item_id.clone(),
        price: summary.price_value().to_string(),
        currency: summary.currency().to_string(),
        color: detail.color.clone(),
        size: detail.size.clone(),
        material: detail.material.clone(),
        brand: brand.to_string(),
        seller_username: detail.seller_username().to_string(),
        item_web_url: summary.item_web_url.clone(),
        item_creation_date,
        item_href: summary.item_href.clone(),
        image_url: summary.image_url().to_string(),
    })
}

// ---------------------------------------------------------------------------
// RecordExporter
// ---------------------------------------------------------------------------

pub struct RecordExporter {
    brand: String,
    policy: DatePolicy,
}

impl RecordExporter {
    pub fn new(brand: &str) -> Self {
        Self {
            brand: brand.to_string(),
            policy: DatePolicy::default(),
        }
    }

    pub fn date_policy(mut self, policy: DatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Merge every pair into a record, in input order.
    pub fn merge_all(&self, pairs: &[(ListingSummary, ListingDetail)]) -> Result<Vec<MergedRecord>> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (summary, detail))| {
                merge_record(summary, detail, &self.brand, self.policy, i + 1)
            })
            .collect()
    }

    /// Write pairs as CSV to `writer`. Returns the number of data rows.
    pub fn write<W: Write>(
        &self,
        writer: W,
        pairs: &[(ListingSummary, ListingDetail)],
    ) -> Result<usize> {
        let records = self.merge_all(pairs)?;
        write_records(writer, &records)
    }

    /// Write pairs to `path`, creating parent directories as needed.
    pub fn export_to_path(
        &self,
        path: &Path,
        pairs: &[(ListingSummary, ListingDetail)],
    ) -> Result<usize> {
        // Merge before touching the file so a strict date failure leaves nothing behind.
        let records = self.merge_all(pairs)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = fs::File::create(path)?;
        let rows = write_records(file, &records)?;
        tracing::info!(path = %path.display(), rows, brand = %self.brand, "export written");
        Ok(rows)
    }
}

/// Write the header followed by one row per record.
pub fn write_records<W: Write>(writer: W, records: &[MergedRecord]) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for record in records {
        wtr.write_record(record.values())?;
    }
    wtr.flush()?;
    Ok(records.len())
}

// ---------------------------------------------------------------------------
// Combining exports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineReport {
    pub files: Vec<PathBuf>,
    pub rows: usize,
}

/// Concatenate every `*.csv` in `input_dir` into `output`.
///
/// Files are read in file-name order. Each must carry the export header;
/// a file with any other header is a [`TrendsError::Schema`]. `output`
/// itself is skipped if it lives inside `input_dir`.
pub fn combine_exports(input_dir: &Path, output: &Path) -> Result<CombineReport> {
    let output_abs = fs::canonicalize(output).ok();

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().map_or(true, |e| e != "csv") {
            continue;
        }
        if output_abs.is_some() && fs::canonicalize(&path).ok() == output_abs {
            continue;
        }
        files.push(path);
    }
    files.sort();

    if files.is_empty() {
        tracing::warn!(dir = %input_dir.display(), "no CSV files to combine");
    }

    let mut rows: Vec<csv::StringRecord> = Vec::new();
    for path in &files {
        let mut rdr = csv::Reader::from_path(path)?;
        let headers = rdr.headers()?.clone();
        if headers.iter().ne(COLUMNS.iter().copied()) {
            return Err(TrendsError::Schema(format!(
                "{} has header [{}]",
                path.display(),
                headers.iter().collect::<Vec<_>>().join(", ")
            )));
        }
        for record in rdr.records() {
            rows.push(record?);
        }
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output)?;
    wtr.write_record(COLUMNS)?;
    for row in &rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;

    tracing::info!(files = files.len(), rows = rows.len(), output = %output.display(), "exports combined");
    Ok(CombineReport {
        files,
        rows: rows.len(),
    })
}
