//! Paginated listing search.
//!
//! [`ListingFetcher::pages`] walks the search endpoint lazily, one page per
//! `next()`, until the offset reaches the server-reported total. The first
//! error ends pagination; nothing is retried.

use crate::client::BrowseApi;
use crate::error::{Result, TrendsError};
use crate::models::ListingSummary;

// ---------------------------------------------------------------------------
// SearchQuery
// ---------------------------------------------------------------------------

/// Category, brand and page size for one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub category_id: String,
    pub brand: String,
    pub page_size: usize,
}

impl SearchQuery {
    pub fn new(category_id: &str, brand: &str, page_size: usize) -> Result<Self> {
        if brand.trim().is_empty() {
            return Err(TrendsError::InvalidArgument("brand must not be empty".into()));
        }
        if page_size == 0 {
            return Err(TrendsError::InvalidArgument("page size must be > 0".into()));
        }
        Ok(Self {
            category_id: category_id.to_string(),
            brand: brand.trim().to_string(),
            page_size,
        })
    }
}

// ---------------------------------------------------------------------------
// ListingFetcher
// ---------------------------------------------------------------------------

/// Result of a full pagination.
///
/// `error` holds the failure that stopped pagination early, if any; `items`
/// holds everything collected before it.
#[derive(Debug)]
pub struct FetchOutcome {
    pub items: Vec<ListingSummary>,
    pub pages: usize,
    pub error: Option<TrendsError>,
}

pub struct ListingFetcher<'a, A: BrowseApi + ?Sized> {
    api: &'a A,
    query: SearchQuery,
}

impl<'a, A: BrowseApi + ?Sized> ListingFetcher<'a, A> {
    pub fn new(api: &'a A, query: SearchQuery) -> Self {
        Self { api, query }
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Lazy page iterator starting at offset zero.
    pub fn pages(&self) -> ListingPages<'_, A> {
        ListingPages {
            api: self.api,
            query: &self.query,
            offset: 0,
            done: false,
        }
    }

    /// Collect every page into one sequence.
    pub fn fetch_all(&self) -> FetchOutcome {
        let mut outcome = FetchOutcome {
            items: Vec::new(),
            pages: 0,
            error: None,
        };

        for page in self.pages() {
            match page {
                Ok(items) => {
                    outcome.pages += 1;
                    outcome.items.extend(items);
                }
                Err(e) => {
                    tracing::warn!(
                        brand = %self.query.brand,
                        collected = outcome.items.len(),
                        error = %e,
                        "listing search stopped"
                    );
                    outcome.error = Some(e);
                }
            }
        }

        tracing::info!(
            brand = %self.query.brand,
            pages = outcome.pages,
            items = outcome.items.len(),
            "listing search finished"
        );
        outcome
    }
}

/// Iterator over search pages. Finite; yields at most one error, then ends.
pub struct ListingPages<'a, A: BrowseApi + ?Sized> {
    api: &'a A,
    query: &'a SearchQuery,
    offset: usize,
    done: bool,
}

impl<A: BrowseApi + ?Sized> ListingPages<'_, A> {
    /// Offset of the next page to request.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Start again from the first page.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.done = false;
    }
}

impl<A: BrowseApi + ?Sized> Iterator for ListingPages<'_, A> {
    type Item = Result<Vec<ListingSummary>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.api.search_page(self.query, self.offset) {
            Ok(page) => {
                tracing::debug!(
                    offset = self.offset,
                    total = page.total,
                    received = page.item_summaries.len(),
                    "search page received"
                );
                self.offset += self.query.page_size;
                if self.offset >= page.total {
                    self.done = true;
                }
                Some(Ok(page.item_summaries))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
