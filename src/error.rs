#[derive(Debug, thiserror::Error)]
pub enum TrendsError {
    #[error("Failed to obtain token: {status} {body}")]
    Auth { status: u16, body: String },

    #[error("Listing search failed with status {status}: {body}")]
    Fetch { status: u16, body: String },

    #[error("Item detail lookup failed for {href} (status {status})")]
    DetailLookup { href: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unparseable ItemCreationDate {value:?} in row {row}")]
    DateParse { value: String, row: usize },

    #[error("Schema mismatch: {0}")]
    Schema(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl TrendsError {
    /// True when a search page or detail lookup was rejected because the
    /// bearer token is no longer valid. Tokens are never refreshed, so this
    /// ends the run.
    pub fn is_token_expired(&self) -> bool {
        matches!(
            self,
            TrendsError::Fetch { status: 401, .. } | TrendsError::DetailLookup { status: 401, .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TrendsError>;
