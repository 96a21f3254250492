//! Marketplace listing trends for a brand.
//!
//! Fetches every listing matching a brand through the paginated browse
//! search API, enriches each one with its item details, and exports the
//! result as CSV with a fixed 16-column schema. Exported datasets are then
//! loaded into an in-process DuckDB store to compute month-over-month
//! price/volume metrics and chart series per brand.
//!
//! # Quick start
//!
//! ```no_run
//! use listing_trends::{DatePolicy, Pipeline, SearchQuery};
//! use std::path::Path;
//!
//! // Reads EBAY_CLIENT_ID / EBAY_CLIENT_SECRET / EBAY_ACCESS_TOKEN_URL / EBAY_SCOPE.
//! let pipeline = Pipeline::builder().build().unwrap();
//! let query = SearchQuery::new("63861", "Acme", 200).unwrap();
//! let report = pipeline.run(&query, Path::new("data"), DatePolicy::Lenient).unwrap();
//! println!("{} listings", report.listed);
//! ```

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod details;
pub mod error;
pub mod export;
pub mod listings;
pub mod metrics;
pub mod models;
pub mod store;
pub mod views;

pub use auth::{BearerToken, TokenProvider};
pub use cache::{CacheManager, DataSource};
pub use client::{BrowseApi, BrowseClient};
pub use config::Credentials;
pub use dashboard::{BrandReport, Dashboard};
pub use dataset::Dataset;
pub use details::DetailEnricher;
pub use error::{Result, TrendsError};
pub use export::{combine_exports, DatePolicy, RecordExporter};
pub use listings::{FetchOutcome, ListingFetcher, SearchQuery};
pub use metrics::compute_metrics;
pub use store::{DatasetHandle, DatasetStore};

use std::path::{Path, PathBuf};
use std::time::Duration;

use models::ListingSummary;

// ---------------------------------------------------------------------------
// PipelineBuilder
// ---------------------------------------------------------------------------

/// Builder for a [`Pipeline`] talking to the live browse API.
///
/// Use [`Pipeline::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](PipelineBuilder::build) to exchange the
/// credentials for a token.
pub struct PipelineBuilder {
    credentials: Option<Credentials>,
    host: String,
    marketplace_id: String,
    timeout: Duration,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            credentials: None,
            host: config::BROWSE_HOST.to_string(),
            marketplace_id: config::MARKETPLACE_ID.to_string(),
            timeout: config::DEFAULT_TIMEOUT,
        }
    }
}

impl PipelineBuilder {
    /// Use explicit credentials instead of reading the environment.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Override the browse API base URL.
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Marketplace sent in the marketplace-id header. Defaults to `EBAY_AU`.
    pub fn marketplace_id(mut self, id: &str) -> Self {
        self.marketplace_id = id.to_string();
        self
    }

    /// Set the HTTP request timeout. Defaults to 60 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve credentials and fetch the bearer token for this run.
    ///
    /// Missing credentials fail with [`TrendsError::Config`], a rejected
    /// exchange with [`TrendsError::Auth`].
    pub fn build(self) -> Result<Pipeline> {
        let credentials = match self.credentials {
            Some(c) => c,
            None => Credentials::from_env()?,
        };
        let http = BrowseClient::http_client(self.timeout)?;
        let token = TokenProvider::new(&http, &credentials).fetch_token()?;
        Ok(Pipeline::with_api(BrowseClient::new(
            http,
            self.host,
            self.marketplace_id,
            token,
        )))
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Progress notifications emitted by [`Pipeline::run_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Pagination finished with this many summaries.
    Listed { total: usize },
    /// One detail lookup finished.
    Enriched { done: usize, total: usize },
}

/// Outcome of one fetch run.
#[derive(Debug)]
pub struct RunReport {
    pub brand: String,
    /// Summaries collected by pagination.
    pub listed: usize,
    /// Export file, `None` when nothing was found and the export was skipped.
    pub exported: Option<PathBuf>,
    pub rows: usize,
    /// Non-fatal error that stopped pagination early.
    pub halted: Option<TrendsError>,
}

/// One fetch run: search → details → CSV, all sequential, against one
/// [`BrowseApi`] holding one token.
pub struct Pipeline<A: BrowseApi = BrowseClient> {
    api: A,
}

impl Pipeline {
    /// Create a new builder for the live API.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }
}

impl<A: BrowseApi> Pipeline<A> {
    pub fn with_api(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn listings(&self, query: SearchQuery) -> ListingFetcher<'_, A> {
        ListingFetcher::new(&self.api, query)
    }

    pub fn enricher(&self) -> DetailEnricher<'_, A> {
        DetailEnricher::new(&self.api)
    }

    /// Run the whole pipeline, writing `<export_dir>/<brand>.csv`.
    pub fn run(&self, query: &SearchQuery, export_dir: &Path, policy: DatePolicy) -> Result<RunReport> {
        self.run_with(query, export_dir, policy, |_| {})
    }

    /// Like [`run`](Self::run), reporting progress through `on_progress`.
    ///
    /// A token rejected during pagination or detail lookups is returned as
    /// the error and nothing is written. Any other search failure keeps what
    /// was collected and is reported in [`RunReport::halted`]. When no
    /// summaries were found nothing is written.
    pub fn run_with<F>(
        &self,
        query: &SearchQuery,
        export_dir: &Path,
        policy: DatePolicy,
        mut on_progress: F,
    ) -> Result<RunReport>
    where
        F: FnMut(Progress),
    {
        let FetchOutcome { items, error, .. } = self.listings(query.clone()).fetch_all();
        let halted = match error {
            Some(e) if e.is_token_expired() => return Err(e),
            other => other,
        };

        let total = items.len();
        on_progress(Progress::Listed { total });

        if items.is_empty() {
            return Ok(RunReport {
                brand: query.brand.clone(),
                listed: 0,
                exported: None,
                rows: 0,
                halted,
            });
        }

        let mut done = 0usize;
        let pairs = self
            .enricher()
            .enrich_all_with(items, |_: &ListingSummary| {
                done += 1;
                on_progress(Progress::Enriched { done, total });
            })?;

        let path = config::export_path(export_dir, &query.brand);
        let rows = RecordExporter::new(&query.brand)
            .date_policy(policy)
            .export_to_path(&path, &pairs)?;

        Ok(RunReport {
            brand: query.brand.clone(),
            listed: total,
            exported: Some(path),
            rows,
            halted,
        })
    }
}
