//! Shared test fixtures for the listing-trends integration tests.
//!
//! Provides an in-process [`FakeApi`] standing in for the browse API, record
//! builders, and `open_store()` which creates an offline `DatasetStore`
//! backed by a temporary cache directory.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use listing_trends::client::BrowseApi;
use listing_trends::export::write_records;
use listing_trends::models::{
    Amount, Image, ListingDetail, ListingRow, ListingSummary, MergedRecord, SearchPage, Seller,
};
use listing_trends::{CacheManager, DatasetStore, Result, SearchQuery, TrendsError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// FakeApi
// ---------------------------------------------------------------------------

/// Scripted response for one search call.
pub enum PageResponse {
    Page(SearchPage),
    Status(u16),
}

/// Browse API double: search calls consume `pages` in order, detail
/// lookups are answered from `details` or fail with the status scripted in
/// `detail_statuses` (anything else is a 404).
pub struct FakeApi {
    pages: RefCell<Vec<PageResponse>>,
    details: HashMap<String, ListingDetail>,
    detail_statuses: HashMap<String, u16>,
    pub search_offsets: RefCell<Vec<usize>>,
    pub detail_calls: RefCell<Vec<String>>,
}

impl FakeApi {
    pub fn new(pages: Vec<PageResponse>) -> Self {
        Self {
            pages: RefCell::new(pages),
            details: HashMap::new(),
            detail_statuses: HashMap::new(),
            search_offsets: RefCell::new(Vec::new()),
            detail_calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_detail(mut self, href: &str, detail: ListingDetail) -> Self {
        self.details.insert(href.to_string(), detail);
        self
    }

    pub fn with_detail_status(mut self, href: &str, status: u16) -> Self {
        self.detail_statuses.insert(href.to_string(), status);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_offsets.borrow().len()
    }
}

impl BrowseApi for FakeApi {
    fn search_page(&self, _query: &SearchQuery, offset: usize) -> Result<SearchPage> {
        self.search_offsets.borrow_mut().push(offset);
        let mut pages = self.pages.borrow_mut();
        if pages.is_empty() {
            return Err(TrendsError::Fetch {
                status: 500,
                body: "no scripted page".to_string(),
            });
        }
        match pages.remove(0) {
            PageResponse::Page(page) => Ok(page),
            PageResponse::Status(status) => Err(TrendsError::Fetch {
                status,
                body: format!("scripted {}", status),
            }),
        }
    }

    fn item_detail(&self, item_href: &str) -> Result<ListingDetail> {
        self.detail_calls.borrow_mut().push(item_href.to_string());
        if let Some(&status) = self.detail_statuses.get(item_href) {
            return Err(TrendsError::DetailLookup {
                href: item_href.to_string(),
                status,
            });
        }
        self.details
            .get(item_href)
            .cloned()
            .ok_or_else(|| TrendsError::DetailLookup {
                href: item_href.to_string(),
                status: 404,
            })
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn summary(id: &str, price: &str, created: &str) -> ListingSummary {
    ListingSummary {
        item_id: id.to_string(),
        title: format!("Item {}", id),
        condition: "Pre-owned".to_string(),
        price: Some(Amount {
            value: price.to_string(),
            currency: "AUD".to_string(),
        }),
        item_creation_date: created.to_string(),
        item_web_url: format!("https://www.example.com/itm/{}", id),
        item_href: format!("https://api.example.com/item/{}", id),
        image: Some(Image {
            image_url: format!("https://img.example.com/{}.jpg", id),
        }),
    }
}

pub fn detail(id: &str) -> ListingDetail {
    ListingDetail {
        short_description: format!("Description of {}", id),
        seller_item_revision: "3".to_string(),
        item_id: format!("v1|{}|0", id),
        color: "Blue".to_string(),
        size: "M".to_string(),
        material: "Cotton".to_string(),
        seller: Some(Seller {
            username: "seller_one".to_string(),
        }),
    }
}

pub fn page(items: Vec<ListingSummary>, total: usize) -> PageResponse {
    PageResponse::Page(SearchPage {
        item_summaries: items,
        total,
    })
}

pub fn query(brand: &str, page_size: usize) -> SearchQuery {
    SearchQuery::new("63861", brand, page_size).unwrap()
}

pub fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn record(brand: &str, price: &str, created: &str) -> MergedRecord {
    MergedRecord {
        title: format!("{} listing", brand),
        brand: brand.to_string(),
        price: price.to_string(),
        currency: "AUD".to_string(),
        item_creation_date: created.to_string(),
        ..Default::default()
    }
}

pub fn row(brand: &str, price: Option<f64>, created: NaiveDateTime) -> ListingRow {
    ListingRow {
        price,
        created: Some(created),
        record: MergedRecord {
            title: format!("{} listing", brand),
            brand: brand.to_string(),
            currency: "AUD".to_string(),
            ..Default::default()
        },
    }
}

pub fn undated_row(brand: &str, price: Option<f64>) -> ListingRow {
    ListingRow {
        created: None,
        ..row(brand, price, ts(2000, 1, 1))
    }
}

// ---------------------------------------------------------------------------
// Files and stores
// ---------------------------------------------------------------------------

/// Write `records` as an export-format CSV at `dir/name`.
pub fn write_dataset(dir: &Path, name: &str, records: &[MergedRecord]) -> PathBuf {
    let path = dir.join(name);
    let file = fs::File::create(&path).unwrap();
    write_records(file, records).unwrap();
    path
}

/// Create an offline `DatasetStore` whose cache lives in a fresh temp dir.
///
/// Returns `(DatasetStore, tempfile::TempDir)`. The caller must keep the
/// `TempDir` alive for the duration of the test.
pub fn open_store() -> (DatasetStore, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let cache = CacheManager::new(
        Some(tmp_dir.path().join("cache")),
        true,
        Duration::from_secs(30),
    )
    .unwrap();
    let store = DatasetStore::new(cache).unwrap();
    (store, tmp_dir)
}
