//! Dataset sources and the local download cache for remote datasets.
//!
//! A local file is used in place. A remote (`http(s)://`) dataset is
//! downloaded once into the cache directory and served from there until it
//! is evicted.

use crate::config;
use crate::error::{Result, TrendsError};
use reqwest::blocking::Client;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

// ---------------------------------------------------------------------------
// DataSource
// ---------------------------------------------------------------------------

/// Where a dataset comes from. Its [`key`](DataSource::key) is the identity
/// the dataset store memoizes loads by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataSource {
    File(PathBuf),
    Remote(String),
}

impl DataSource {
    /// `http://` and `https://` locations are remote, anything else is a path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Remote(trimmed.to_string())
        } else {
            DataSource::File(PathBuf::from(trimmed))
        }
    }

    pub fn key(&self) -> String {
        match self {
            DataSource::File(path) => fs::canonicalize(path)
                .unwrap_or_else(|_| path.clone())
                .to_string_lossy()
                .into_owned(),
            DataSource::Remote(url) => url.clone(),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Size and modification time of a file, used to notice that a loaded
/// file changed on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl Fingerprint {
    pub fn of(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// CacheManager
// ---------------------------------------------------------------------------

/// Resolves a [`DataSource`] to a readable local file.
pub struct CacheManager {
    /// Directory where downloaded datasets are stored.
    pub cache_dir: PathBuf,
    /// If true, never download (use cached files only).
    pub offline: bool,
    timeout: Duration,
    client: Option<Client>,
}

impl CacheManager {
    /// Create a new cache manager.
    ///
    /// If `cache_dir` is `None`, uses the platform-appropriate default cache directory.
    /// Creates the cache directory if it does not exist.
    pub fn new(cache_dir: Option<PathBuf>, offline: bool, timeout: Duration) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            cache_dir: dir,
            offline,
            timeout,
            client: None,
        })
    }

    /// Lazy HTTP client, created on first use.
    fn client(&mut self) -> Result<Client> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Cache location for a remote URL.
    pub fn cached_path(&self, url: &str) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        self.cache_dir.join(format!("dataset-{:016x}.csv", hasher.finish()))
    }

    /// Local path for `source`, downloading a remote dataset if not cached.
    pub fn ensure_local(&mut self, source: &DataSource) -> Result<PathBuf> {
        match source {
            DataSource::File(path) => {
                if path.is_file() {
                    Ok(path.clone())
                } else {
                    Err(TrendsError::NotFound(format!(
                        "dataset file {} does not exist",
                        path.display()
                    )))
                }
            }
            DataSource::Remote(url) => {
                let local = self.cached_path(url);
                if local.exists() {
                    return Ok(local);
                }
                if self.offline {
                    return Err(TrendsError::NotFound(format!(
                        "dataset {} not cached and offline mode is enabled",
                        url
                    )));
                }
                self.download_file(url, &local)?;
                Ok(local)
            }
        }
    }

    /// Download `url` to `dest`.
    ///
    /// Downloads to a temp file first and renames on success, so an
    /// interrupted download never leaves a partial file behind.
    fn download_file(&mut self, url: &str, dest: &Path) -> Result<()> {
        tracing::info!(%url, "downloading dataset");

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_dest = dest.with_extension("csv.tmp");

        let client = self.client()?;
        let result = (|| -> Result<()> {
            let resp = client.get(url).send()?.error_for_status()?;
            let bytes = resp.bytes()?;
            fs::write(&tmp_dest, &bytes)?;
            fs::rename(&tmp_dest, dest)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_dest);
        }

        result
    }

    /// Drop the cached download of a remote source so the next load fetches
    /// it again. Local files are never touched.
    pub fn evict(&self, source: &DataSource) -> Result<()> {
        if let DataSource::Remote(url) = source {
            let local = self.cached_path(url);
            if local.exists() {
                fs::remove_file(local)?;
            }
        }
        Ok(())
    }

    /// Remove all cached files and recreate the cache directory.
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }
}
