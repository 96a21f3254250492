//! listing-trends - fetch brand listings and chart their price/volume trends.
//!
//! Commands:
//! - `listing-trends fetch` - search a brand, enrich every listing, write `<brand>.csv`
//! - `listing-trends combine` - concatenate exports into one dataset file
//! - `listing-trends dashboard` - month-over-month metrics and charts per brand

mod commands;
mod obs;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{CombineArgs, DashboardArgs, FetchArgs};

/// Marketplace listing trends for a brand
#[derive(Parser)]
#[command(name = "listing-trends")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log filter (overridden by LISTING_TRENDS_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log format: text or json
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    /// Print debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a brand and export its listings to CSV
    Fetch(FetchArgs),

    /// Combine exported CSV files into one dataset
    Combine(CombineArgs),

    /// Show metrics and charts for a brand
    Dashboard(DashboardArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = obs::init_tracing(&cli.log_level, &cli.log_format) {
        eprintln!("{}", e);
        std::process::exit(2);
    }

    let output = output::Output::new(cli.verbose);

    let result = match cli.command {
        Commands::Fetch(args) => commands::fetch::run(args, &output),
        Commands::Combine(args) => commands::combine::run(args, &output),
        Commands::Dashboard(args) => commands::dashboard::run(args, &output),
    };

    if let Err(e) = result {
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
