//! Chart series derived from a brand-filtered dataset.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::dataset::Dataset;
use crate::error::{Result, TrendsError};
use crate::models::{MonthlyCount, PriceBucket, PricePoint};

/// Width of one price-distribution bucket, in currency units.
pub const PRICE_BUCKET_WIDTH: f64 = 100.0;

/// Largest histogram [`price_distribution`] will build (prices below 1,000,000).
pub const MAX_PRICE_BUCKETS: usize = 10_000;

/// Row count per calendar month of creation, oldest first. Undated rows
/// are not counted.
pub fn volume_over_time(dataset: &Dataset) -> Vec<MonthlyCount> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for created in dataset.iter().filter_map(|row| row.created) {
        if let Some(month) = NaiveDate::from_ymd_opt(created.year(), created.month(), 1) {
            *counts.entry(month).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(month, count)| MonthlyCount { month, count })
        .collect()
}

/// Unaggregated `(creation date, price)` pairs in dataset order.
/// Rows without a price or a date are skipped.
pub fn price_over_time(dataset: &Dataset) -> Vec<PricePoint> {
    dataset
        .iter()
        .filter_map(|row| match (row.created, row.price) {
            (Some(created), Some(price)) => Some(PricePoint { created, price }),
            _ => None,
        })
        .collect()
}

/// Number of buckets needed for a maximum price: `floor(max / 100) + 1`.
///
/// Fails with [`TrendsError::InvalidArgument`] when that exceeds
/// [`MAX_PRICE_BUCKETS`].
pub fn bucket_count(max_price: f64) -> Result<usize> {
    let full = (max_price.max(0.0) / PRICE_BUCKET_WIDTH).floor();
    if !full.is_finite() || full >= MAX_PRICE_BUCKETS as f64 {
        return Err(TrendsError::InvalidArgument(format!(
            "price {} needs more than {} histogram buckets",
            max_price, MAX_PRICE_BUCKETS
        )));
    }
    Ok(full as usize + 1)
}

/// Fixed-width histogram of prices starting at 0.
///
/// Empty when no row has a price. Negative prices count toward the first
/// bucket.
pub fn price_distribution(dataset: &Dataset) -> Result<Vec<PriceBucket>> {
    let prices: Vec<f64> = dataset.iter().filter_map(|r| r.price).collect();
    let Some(max_price) = prices.iter().copied().reduce(f64::max) else {
        return Ok(Vec::new());
    };

    let n = bucket_count(max_price)?;
    let mut buckets: Vec<PriceBucket> = (0..n)
        .map(|i| PriceBucket {
            lower: i as f64 * PRICE_BUCKET_WIDTH,
            upper: (i + 1) as f64 * PRICE_BUCKET_WIDTH,
            count: 0,
        })
        .collect();

    for price in prices {
        let idx = ((price.max(0.0) / PRICE_BUCKET_WIDTH).floor() as usize).min(n - 1);
        buckets[idx].count += 1;
    }
    Ok(buckets)
}
