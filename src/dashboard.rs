//! Brand selector session over one dataset source.
//!
//! The dataset is loaded once per session (memoized by the store); each
//! brand selection recomputes metrics and the three chart series from the
//! cached table.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::cache::{CacheManager, DataSource};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::metrics::compute_metrics;
use crate::models::{MetricsSnapshot, MonthlyCount, PriceBucket, PricePoint};
use crate::store::DatasetStore;
use crate::views;

/// Widest bar drawn for a chart row.
const BAR_WIDTH: usize = 40;

/// Everything shown for one selected brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandReport {
    pub brand: String,
    pub rows: usize,
    /// Rows with an empty creation date, left out of the monthly metrics and
    /// the time series.
    pub undated: usize,
    pub metrics: MetricsSnapshot,
    pub volume: Vec<MonthlyCount>,
    pub prices: Vec<PricePoint>,
    pub distribution: Vec<PriceBucket>,
}

/// Compute the report for a dataset already filtered to `brand`.
pub fn build_report(dataset: &Dataset, brand: &str, now: NaiveDateTime) -> Result<BrandReport> {
    Ok(BrandReport {
        brand: brand.to_string(),
        rows: dataset.len(),
        undated: dataset.undated(),
        metrics: compute_metrics(dataset, now),
        volume: views::volume_over_time(dataset),
        prices: views::price_over_time(dataset),
        distribution: views::price_distribution(dataset)?,
    })
}

pub struct Dashboard {
    store: DatasetStore,
    source: DataSource,
}

impl Dashboard {
    pub fn new(store: DatasetStore, source: DataSource) -> Self {
        Self { store, source }
    }

    /// Open a dashboard over `source` with a fresh store.
    pub fn open(
        source: DataSource,
        cache_dir: Option<PathBuf>,
        offline: bool,
        timeout: Duration,
    ) -> Result<Self> {
        let cache = CacheManager::new(cache_dir, offline, timeout)?;
        Ok(Self::new(DatasetStore::new(cache)?, source))
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// Choices for the brand selector.
    pub fn brands(&self) -> Result<Vec<String>> {
        let handle = self.store.load(&self.source)?;
        self.store.brands(&handle)
    }

    /// Metrics and chart series for one brand as of `now`.
    pub fn select(&self, brand: &str, now: NaiveDateTime) -> Result<BrandReport> {
        let handle = self.store.load(&self.source)?;
        let dataset = self.store.dataset(&handle, Some(brand))?;
        tracing::debug!(brand, rows = dataset.len(), "brand selected");
        build_report(&dataset, brand, now)
    }

    /// Drop the memoized dataset so the next selection re-reads the source.
    pub fn reload(&self) -> Result<bool> {
        self.store.invalidate(&self.source)
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn bar(count: usize, max: usize) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    let len = ((count * BAR_WIDTH) as f64 / max as f64).ceil() as usize;
    "#".repeat(len.max(1))
}

/// Plain-text rendering: two metric cards, then the line, scatter and
/// histogram series.
impl fmt::Display for BrandReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metrics;
        let avg = match m.avg_price_this_month {
            Some(v) => format!("${:.2}", v),
            None => "n/a".to_string(),
        };

        writeln!(f, "Brand: {} ({} listings)", self.brand, self.rows)?;
        writeln!(
            f,
            "Average Price This Month: {} ({:.2}%)",
            avg, m.avg_price_change_pct
        )?;
        writeln!(
            f,
            "Number of Items This Month: {} ({:.2}%)",
            m.items_this_month, m.items_change_pct
        )?;
        if self.undated > 0 {
            writeln!(f, "({} listings have no creation date)", self.undated)?;
        }

        writeln!(f, "\nNumber of Items Over Time")?;
        let max_volume = self.volume.iter().map(|v| v.count).max().unwrap_or(0);
        for point in &self.volume {
            writeln!(
                f,
                "  {}  {:>5}  {}",
                point.month.format("%Y-%m"),
                point.count,
                bar(point.count, max_volume)
            )?;
        }

        writeln!(f, "\nPrice Over Time")?;
        for point in &self.prices {
            writeln!(
                f,
                "  {}  {:>10.2}",
                point.created.format("%Y-%m-%d %H:%M"),
                point.price
            )?;
        }

        writeln!(f, "\nPrice Buckets")?;
        let max_bucket = self.distribution.iter().map(|b| b.count).max().unwrap_or(0);
        for bucket in &self.distribution {
            writeln!(
                f,
                "  {:>7.0}-{:<7.0} {:>5}  {}",
                bucket.lower,
                bucket.upper,
                bucket.count,
                bar(bucket.count, max_bucket)
            )?;
        }

        if self.rows == 0 {
            writeln!(f, "\n(no listings for this brand)")?;
        }
        Ok(())
    }
}

/// Text form of a report, as printed by the dashboard command.
pub fn render(report: &BrandReport) -> String {
    report.to_string()
}
