//! DuckDB-backed dataset store.
//!
//! Each source is read from disk once and kept as an in-memory table;
//! brand lists and brand filters are answered from that table. A loaded
//! source stays memoized until it is invalidated explicitly (or through
//! [`DatasetStore::refresh`] when its file changed on disk).

use crate::cache::{CacheManager, DataSource, Fingerprint};
use crate::dataset::Dataset;
use crate::error::{Result, TrendsError};
use crate::models::{MergedRecord, COLUMNS};
use duckdb::Connection as DuckDbConnection;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A loaded source and the table holding its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetHandle {
    pub key: String,
    pub table: String,
    pub rows: usize,
}

struct Loaded {
    handle: DatasetHandle,
    local_path: PathBuf,
    fingerprint: Option<Fingerprint>,
}

pub struct DatasetStore {
    conn: DuckDbConnection,
    /// Resolves sources to local files.
    pub cache: RefCell<CacheManager>,
    loaded: RefCell<HashMap<String, Loaded>>,
    next_table: Cell<usize>,
}

impl DatasetStore {
    /// Create a store backed by the given cache.
    ///
    /// Opens an in-memory DuckDB database.
    pub fn new(cache: CacheManager) -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self {
            conn,
            cache: RefCell::new(cache),
            loaded: RefCell::new(HashMap::new()),
            next_table: Cell::new(0),
        })
    }

    /// Load `source`, or return the handle of an earlier load of the same source.
    ///
    /// The header must match the export schema and every ItemCreationDate
    /// must parse; otherwise the load fails and nothing is memoized.
    pub fn load(&self, source: &DataSource) -> Result<DatasetHandle> {
        let key = source.key();
        if let Some(existing) = self.loaded.borrow().get(&key) {
            return Ok(existing.handle.clone());
        }

        let local_path = self.cache.borrow_mut().ensure_local(source)?;
        check_header(&local_path)?;

        let n = self.next_table.get();
        self.next_table.set(n + 1);
        let table = format!("listings_{}", n);

        let path_fwd = local_path.to_string_lossy().replace('\\', "/");
        let columns_sql = COLUMNS
            .iter()
            .map(|c| format!("'{}': 'VARCHAR'", c))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table}; \
             CREATE TABLE {table} AS SELECT * FROM read_csv('{path}', \
             auto_detect = false, header = true, delim = ',', quote = '\"', escape = '\"', \
             columns = {{{cols}}})",
            table = table,
            path = path_fwd.replace('\'', "''"),
            cols = columns_sql
        ))?;

        let handle = DatasetHandle {
            key: key.clone(),
            table: table.clone(),
            rows: 0,
        };

        // Type every row now so a bad date fails the load, not a later view.
        let rows = match self.dataset(&handle, None) {
            Ok(ds) => ds.len(),
            Err(e) => {
                let _ = self.conn.execute_batch(&format!("DROP TABLE IF EXISTS {}", table));
                return Err(e);
            }
        };

        let handle = DatasetHandle { rows, ..handle };
        let fingerprint = match source {
            DataSource::File(_) => Fingerprint::of(&local_path).ok(),
            DataSource::Remote(_) => None,
        };
        tracing::info!(source = %source, table = %table, rows, "dataset loaded");

        self.loaded.borrow_mut().insert(
            key,
            Loaded {
                handle: handle.clone(),
                local_path,
                fingerprint,
            },
        );
        Ok(handle)
    }

    /// Check whether `source` is currently memoized.
    pub fn is_loaded(&self, source: &DataSource) -> bool {
        self.loaded.borrow().contains_key(&source.key())
    }

    /// Return the table names of all memoized sources.
    pub fn tables(&self) -> Vec<String> {
        self.loaded
            .borrow()
            .values()
            .map(|l| l.handle.table.clone())
            .collect()
    }

    /// True if a loaded local file changed size or modification time since
    /// it was loaded. Remote sources are never reported stale.
    pub fn is_stale(&self, source: &DataSource) -> Result<bool> {
        let loaded = self.loaded.borrow();
        let Some(entry) = loaded.get(&source.key()) else {
            return Ok(false);
        };
        match entry.fingerprint {
            None => Ok(false),
            Some(before) => match Fingerprint::of(&entry.local_path) {
                Ok(now) => Ok(now != before),
                Err(_) => Ok(true),
            },
        }
    }

    /// Forget `source` so the next [`load`](Self::load) reads it again.
    /// Returns `false` if it was not loaded.
    pub fn invalidate(&self, source: &DataSource) -> Result<bool> {
        let removed = self.loaded.borrow_mut().remove(&source.key());
        match removed {
            None => Ok(false),
            Some(entry) => {
                self.conn
                    .execute_batch(&format!("DROP TABLE IF EXISTS {}", entry.handle.table))?;
                self.cache.borrow().evict(source)?;
                tracing::debug!(source = %source, "dataset invalidated");
                Ok(true)
            }
        }
    }

    /// Invalidate `source` if its file changed. Returns `true` if it was stale.
    pub fn refresh(&self, source: &DataSource) -> Result<bool> {
        let stale = self.is_stale(source)?;
        if stale {
            self.invalidate(source)?;
            tracing::info!(source = %source, "dataset changed on disk; reload required");
        }
        Ok(stale)
    }

    /// Distinct brands of a loaded dataset, sorted.
    pub fn brands(&self, handle: &DatasetHandle) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT \"Brand\" FROM {} WHERE \"Brand\" IS NOT NULL ORDER BY \"Brand\" ASC",
            handle.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let brands = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(brands)
    }

    /// Typed rows of a loaded dataset in file order, optionally restricted
    /// to one brand. The brand is bound as a parameter.
    pub fn dataset(&self, handle: &DatasetHandle, brand: Option<&str>) -> Result<Dataset> {
        let columns = COLUMNS
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");
        let filter = if brand.is_some() {
            " WHERE \"Brand\" = ?"
        } else {
            ""
        };
        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY rowid ASC",
            columns, handle.table, filter
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(duckdb::params_from_iter(brand), record_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Dataset::from_records(records)
    }
}

/// Fail unless the first line of `path` is exactly the export header.
fn check_header(path: &Path) -> Result<()> {
    let mut rdr = csv::Reader::from_path(path)?;
    let headers = rdr.headers()?;
    if headers.iter().ne(COLUMNS.iter().copied()) {
        return Err(TrendsError::Schema(format!(
            "{} has header [{}], expected [{}]",
            path.display(),
            headers.iter().collect::<Vec<_>>().join(", "),
            COLUMNS.join(", ")
        )));
    }
    Ok(())
}

/// Columns are selected in [`COLUMNS`] order; NULL cells become empty strings.
fn record_from_row(row: &duckdb::Row<'_>) -> duckdb::Result<MergedRecord> {
    let text = |i: usize| -> duckdb::Result<String> {
        Ok(row.get::<_, Option<String>>(i)?.unwrap_or_default())
    };

    Ok(MergedRecord {
        title: text(0)?,
        short_description: text(1)?,
        condition: text(2)?,
        seller_item_revision: text(3)?,
        item_id: text(4)?,
        price: text(5)?,
        currency: text(6)?,
        color: text(7)?,
        size: text(8)?,
        material: text(9)?,
        brand: text(10)?,
        seller_username: text(11)?,
        item_web_url: text(12)?,
        item_creation_date: text(13)?,
        item_href: text(14)?,
        image_url: text(15)?,
    })
}
