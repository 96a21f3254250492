//! Blocking HTTP client for the browse API (search + item detail).
//!
//! The fetcher and enricher talk to the API through [`BrowseApi`] so that a
//! run can be driven by any implementation, including in-process fakes.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;

use crate::auth::BearerToken;
use crate::config;
use crate::error::{Result, TrendsError};
use crate::listings::SearchQuery;
use crate::models::{ListingDetail, SearchPage};

/// The two browse API calls a pipeline run makes.
pub trait BrowseApi {
    /// Fetch one page of search results starting at `offset`.
    fn search_page(&self, query: &SearchQuery, offset: usize) -> Result<SearchPage>;

    /// Fetch extended details for one listing.
    fn item_detail(&self, item_href: &str) -> Result<ListingDetail>;
}

/// Browse API client bound to one bearer token.
pub struct BrowseClient {
    http: Client,
    host: String,
    marketplace_id: String,
    token: BearerToken,
}

impl BrowseClient {
    pub fn new(
        http: Client,
        host: impl Into<String>,
        marketplace_id: impl Into<String>,
        token: BearerToken,
    ) -> Self {
        Self {
            http,
            host: host.into(),
            marketplace_id: marketplace_id.into(),
            token,
        }
    }

    /// Blocking HTTP client with the crate's redirect policy.
    pub fn http_client(timeout: Duration) -> Result<Client> {
        Ok(Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?)
    }

    pub fn token(&self) -> &BearerToken {
        &self.token
    }

    fn get(&self, url: Url) -> Result<reqwest::blocking::Response> {
        Ok(self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.token.header_value())
            .header(config::MARKETPLACE_HEADER, &self.marketplace_id)
            .send()?)
    }
}

impl BrowseApi for BrowseClient {
    fn search_page(&self, query: &SearchQuery, offset: usize) -> Result<SearchPage> {
        let url = search_url(&self.host, query, offset)?;
        tracing::debug!(%url, "search page");

        let resp = self.get(url)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(TrendsError::Fetch {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json()?)
    }

    fn item_detail(&self, item_href: &str) -> Result<ListingDetail> {
        let url = Url::parse(item_href).map_err(|_| TrendsError::DetailLookup {
            href: item_href.to_string(),
            status: 0,
        })?;

        let resp = self.get(url)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TrendsError::DetailLookup {
                href: item_href.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.json()?)
    }
}

/// Build the search URL for one page.
///
/// Filters on the category and on the brand aspect, e.g.
/// `aspect_filter=categoryId:63861,Brand:{Acme}`.
pub fn search_url(host: &str, query: &SearchQuery, offset: usize) -> Result<Url> {
    let base = format!("{}/item_summary/search", host.trim_end_matches('/'));
    let aspect_filter = format!(
        "categoryId:{},Brand:{{{}}}",
        query.category_id, query.brand
    );
    let limit = query.page_size.to_string();
    let offset = offset.to_string();

    Url::parse_with_params(
        &base,
        &[
            ("q", query.brand.as_str()),
            ("limit", limit.as_str()),
            ("offset", offset.as_str()),
            ("aspect_filter", aspect_filter.as_str()),
            ("category_ids", query.category_id.as_str()),
        ],
    )
    .map_err(|e| TrendsError::InvalidArgument(format!("bad search host {}: {}", host, e)))
}
