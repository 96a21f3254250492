//! Brand selector over an exported dataset.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use dialoguer::Select;
use listing_trends::dashboard::{render, BrandReport};
use listing_trends::{Dashboard, DataSource};

use super::DashboardArgs;
use crate::output::Output;

/// Run the dashboard command.
pub fn run(args: DashboardArgs, out: &Output) -> Result<()> {
    let source = DataSource::parse(&args.data);
    let dashboard = Dashboard::open(
        source,
        args.cache_dir.clone(),
        args.offline,
        Duration::from_secs(args.timeout),
    )?;

    out.header("Market Research");
    let brands = dashboard
        .brands()
        .with_context(|| format!("could not load dataset {}", dashboard.source()))?;
    if brands.is_empty() {
        bail!("dataset {} has no brands", dashboard.source());
    }

    if let Some(brand) = &args.brand {
        if !brands.iter().any(|b| b == brand) {
            out.warn(&format!("{} does not appear in the dataset", brand));
        }
        let report = dashboard.select(brand, Local::now().naive_local())?;
        return show(&report, args.json);
    }

    let mut default = 0;
    loop {
        let Some(choice) = Select::new()
            .with_prompt("Select a Brand (Esc to quit)")
            .items(&brands)
            .default(default)
            .interact_opt()?
        else {
            return Ok(());
        };
        default = choice;
        match dashboard.select(&brands[choice], Local::now().naive_local()) {
            Ok(report) => show(&report, args.json)?,
            Err(e) => out.warn(&format!("{}: {}", brands[choice], e)),
        }
    }
}

fn show(report: &BrandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render(report));
    }
    Ok(())
}
