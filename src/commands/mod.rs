//! CLI command implementations.

pub mod combine;
pub mod dashboard;
pub mod fetch;

use std::path::PathBuf;

use clap::Args;
use listing_trends::config;

/// Arguments for the fetch command.
#[derive(Args)]
pub struct FetchArgs {
    /// Brand to search for (prompted when omitted).
    #[arg(short, long)]
    pub brand: Option<String>,

    /// Category id to search in.
    #[arg(long, default_value = config::DEFAULT_CATEGORY_ID)]
    pub category: String,

    /// Results requested per search page.
    #[arg(long, default_value_t = config::DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Directory the `<brand>.csv` export is written to.
    #[arg(short, long, default_value = config::DEFAULT_EXPORT_DIR)]
    pub out_dir: PathBuf,

    /// Abort the export on an unparseable creation date instead of leaving the cell empty.
    #[arg(long)]
    pub strict_dates: bool,

    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,
}

/// Arguments for the combine command.
#[derive(Args)]
pub struct CombineArgs {
    /// Directory holding per-brand exports.
    #[arg(short, long, default_value = config::DEFAULT_EXPORT_DIR)]
    pub input: PathBuf,

    /// Combined dataset file.
    #[arg(short, long, default_value = config::DEFAULT_DATASET_PATH)]
    pub output: PathBuf,
}

/// Arguments for the dashboard command.
#[derive(Args)]
pub struct DashboardArgs {
    /// Dataset file path or http(s) URL.
    #[arg(short, long, default_value = config::DEFAULT_DATASET_PATH)]
    pub data: String,

    /// Brand to show; without it an interactive selector is used.
    #[arg(short, long)]
    pub brand: Option<String>,

    /// Never download a remote dataset; use the cached copy only.
    #[arg(long)]
    pub offline: bool,

    /// Directory for downloaded datasets.
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// HTTP timeout in seconds for remote datasets.
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,
}
