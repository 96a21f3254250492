use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, TrendsError};

pub const BROWSE_HOST: &str = "https://api.ebay.com/buy/browse/v1";
pub const MARKETPLACE_ID: &str = "EBAY_AU";
pub const MARKETPLACE_HEADER: &str = "X-EBAY-C-MARKETPLACE-ID";

/// Category searched by the command line entry point.
pub const DEFAULT_CATEGORY_ID: &str = "63861";
pub const DEFAULT_PAGE_SIZE: usize = 200;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const DEFAULT_EXPORT_DIR: &str = "data";
pub const DEFAULT_DATASET_PATH: &str = "app_data/data.csv";

pub const ENV_CLIENT_ID: &str = "EBAY_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "EBAY_CLIENT_SECRET";
pub const ENV_TOKEN_URL: &str = "EBAY_ACCESS_TOKEN_URL";
pub const ENV_SCOPE: &str = "EBAY_SCOPE";

/// Client credentials used for the token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub scope: String,
}

impl Credentials {
    /// Read credentials from the environment, loading `.env` first if present.
    ///
    /// Every variable is required. A missing or blank value is a
    /// [`TrendsError::Config`] naming the variable.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build credentials from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| -> Result<String> {
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
                _ => Err(TrendsError::Config(format!(
                    "environment variable {} is not set",
                    key
                ))),
            }
        };

        Ok(Self {
            client_id: require(ENV_CLIENT_ID)?,
            client_secret: require(ENV_CLIENT_SECRET)?,
            token_url: require(ENV_TOKEN_URL)?,
            scope: require(ENV_SCOPE)?,
        })
    }
}

/// Path of the export file for `brand` inside `dir`.
///
/// Path separators in the brand are replaced so the file always lands
/// directly inside `dir`.
pub fn export_path(dir: &Path, brand: &str) -> PathBuf {
    let safe: String = brand
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            other => other,
        })
        .collect();
    dir.join(format!("{}.csv", safe))
}

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("listing-trends")
    } else {
        PathBuf::from(".listing-trends-cache")
    }
}
