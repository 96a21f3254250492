use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MetricsSnapshot: month-over-month comparison for one brand
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct MetricsSnapshot {
    /// Mean price of this month's rows; `None` when no row has a price.
    pub avg_price_this_month: Option<f64>,
    pub avg_price_last_month: Option<f64>,
    pub avg_price_change_pct: f64,
    pub items_this_month: usize,
    pub items_last_month: usize,
    pub items_change_pct: f64,
}

impl MetricsSnapshot {
    /// `(avg price this month, price % change, items this month, count % change)`.
    pub fn as_tuple(&self) -> (Option<f64>, f64, usize, f64) {
        (
            self.avg_price_this_month,
            self.avg_price_change_pct,
            self.items_this_month,
            self.items_change_pct,
        )
    }
}

// ---------------------------------------------------------------------------
// View points
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct MonthlyCount {
    /// First day of the calendar month.
    pub month: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct PricePoint {
    pub created: NaiveDateTime,
    pub price: f64,
}

/// Half-open bucket `[lower, upper)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct PriceBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}
