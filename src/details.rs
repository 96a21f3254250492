//! Per-listing detail lookups.
//!
//! One sequential request per summary. A failed lookup is logged and
//! replaced with an empty [`ListingDetail`] so the run continues, except
//! for an expired token, which stops enrichment.

use crate::client::BrowseApi;
use crate::error::Result;
use crate::models::{ListingDetail, ListingSummary};

pub struct DetailEnricher<'a, A: BrowseApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: BrowseApi + ?Sized> DetailEnricher<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Look up the detail for one summary, or an empty detail on failure.
    ///
    /// Only an expired token is returned as an error.
    pub fn enrich(&self, summary: &ListingSummary) -> Result<ListingDetail> {
        match self.api.item_detail(&summary.item_href) {
            Ok(detail) => Ok(detail),
            Err(e) if e.is_token_expired() => Err(e),
            Err(e) => {
                tracing::warn!(href = %summary.item_href, error = %e, "no item details");
                Ok(ListingDetail::default())
            }
        }
    }

    /// Pair every summary with its detail, preserving input order.
    pub fn enrich_all(
        &self,
        summaries: Vec<ListingSummary>,
    ) -> Result<Vec<(ListingSummary, ListingDetail)>> {
        self.enrich_all_with(summaries, |_| {})
    }

    /// Like [`enrich_all`](Self::enrich_all), calling `on_item` after each lookup.
    ///
    /// Stops at the first expired-token error; nothing enriched so far is
    /// returned.
    pub fn enrich_all_with<F>(
        &self,
        summaries: Vec<ListingSummary>,
        mut on_item: F,
    ) -> Result<Vec<(ListingSummary, ListingDetail)>>
    where
        F: FnMut(&ListingSummary),
    {
        let mut out = Vec::with_capacity(summaries.len());
        let mut missing = 0usize;
        for summary in summaries {
            let detail = match self.enrich(&summary) {
                Ok(detail) => detail,
                Err(e) => {
                    tracing::error!(done = out.len(), error = %e, "detail lookups stopped");
                    return Err(e);
                }
            };
            if detail.is_empty() {
                missing += 1;
            }
            on_item(&summary);
            out.push((summary, detail));
        }
        if missing > 0 {
            tracing::info!(missing, total = out.len(), "items exported without details");
        }
        Ok(out)
    }
}
