//! Search a brand, enrich every listing and export it.

use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::Input;
use indicatif::ProgressBar;
use listing_trends::{DatePolicy, Pipeline, Progress, SearchQuery};

use super::FetchArgs;
use crate::output::Output;

/// Run the fetch command.
pub fn run(args: FetchArgs, out: &Output) -> Result<()> {
    let brand = match args.brand {
        Some(b) => b,
        None => Input::<String>::new()
            .with_prompt("Please enter the brand to search for")
            .interact_text()?,
    };
    let query = SearchQuery::new(&args.category, &brand, args.page_size)?;
    let policy = if args.strict_dates {
        DatePolicy::Strict
    } else {
        DatePolicy::Lenient
    };

    out.header(&format!(
        "Searching \"{}\" in category {}",
        query.brand, query.category_id
    ));

    let pipeline = Pipeline::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()
        .context("could not start the fetch run")?;
    out.debug(&format!("token acquired ({:?})", pipeline.api().token()));

    let spinner = out.spinner("Fetching item summaries");
    let mut bar: Option<ProgressBar> = None;
    let result = pipeline.run_with(&query, &args.out_dir, policy, |p| match p {
        Progress::Listed { total } => {
            spinner.finish_and_clear();
            if total > 0 {
                bar = Some(out.progress(total as u64, "Processing items"));
            }
        }
        Progress::Enriched { .. } => {
            if let Some(b) = &bar {
                b.inc(1);
            }
        }
    });
    spinner.finish_and_clear();
    if let Some(b) = &bar {
        b.finish_and_clear();
    }

    let report = result.with_context(|| format!("fetch run for {} failed", query.brand))?;

    if let Some(e) = &report.halted {
        out.warn(&format!("Search stopped early: {}", e));
    }

    match &report.exported {
        None => out.info("No item summaries found. CSV extraction skipped."),
        Some(path) => out.success(&format!(
            "Wrote {} of {} listings to {}",
            report.rows,
            report.listed,
            path.display()
        )),
    }
    Ok(())
}
