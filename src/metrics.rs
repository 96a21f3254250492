//! Month-over-month price and volume metrics.
//!
//! Stateless: every call recomputes from the rows it is given.

use chrono::{Datelike, NaiveDateTime};

use crate::dataset::Dataset;
use crate::models::{ListingRow, MetricsSnapshot};

/// Calendar month before `(year, month)`, rolling January back to December.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month > 1 {
        (year, month - 1)
    } else {
        (year - 1, 12)
    }
}

/// Undated rows belong to no month.
fn in_month(row: &ListingRow, year: i32, month: u32) -> bool {
    row.created
        .is_some_and(|created| created.year() == year && created.month() == month)
}

/// Mean of the non-empty prices, `None` if there are none.
fn mean_price<'a>(rows: impl Iterator<Item = &'a ListingRow>) -> Option<f64> {
    let (sum, n) = rows
        .filter_map(|r| r.price)
        .fold((0.0, 0usize), |(s, n), p| (s + p, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// `(current - prior) / prior * 100`, or 0 when `prior` is zero.
pub fn percent_change(current: f64, prior: f64) -> f64 {
    if prior == 0.0 {
        0.0
    } else {
        (current - prior) / prior * 100.0
    }
}

/// Compare the calendar month containing `now` with the month before it.
///
/// `dataset` is expected to be filtered to a single brand already. The
/// price change is 0 whenever either month has no priced rows.
pub fn compute_metrics(dataset: &Dataset, now: NaiveDateTime) -> MetricsSnapshot {
    let (year, month) = (now.year(), now.month());
    let (last_year, last_month) = previous_month(year, month);

    let this_rows: Vec<&ListingRow> = dataset.iter().filter(|r| in_month(r, year, month)).collect();
    let last_rows: Vec<&ListingRow> = dataset
        .iter()
        .filter(|r| in_month(r, last_year, last_month))
        .collect();

    let avg_this = mean_price(this_rows.iter().copied());
    let avg_last = mean_price(last_rows.iter().copied());

    let avg_price_change_pct = match (avg_this, avg_last) {
        (Some(current), Some(prior)) => percent_change(current, prior),
        _ => 0.0,
    };

    MetricsSnapshot {
        avg_price_this_month: avg_this,
        avg_price_last_month: avg_last,
        avg_price_change_pct,
        items_this_month: this_rows.len(),
        items_last_month: last_rows.len(),
        items_change_pct: percent_change(this_rows.len() as f64, last_rows.len() as f64),
    }
}
