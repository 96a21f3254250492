//! Concatenate per-brand exports into one dataset file.

use anyhow::{Context, Result};
use listing_trends::combine_exports;

use super::CombineArgs;
use crate::output::Output;

/// Run the combine command.
pub fn run(args: CombineArgs, out: &Output) -> Result<()> {
    out.header(&format!("Combining exports in {}", args.input.display()));

    let report = combine_exports(&args.input, &args.output)
        .with_context(|| format!("could not combine {}", args.input.display()))?;

    for file in &report.files {
        out.debug(&format!("read {}", file.display()));
    }
    if report.files.is_empty() {
        out.warn("No CSV files found; wrote a header-only dataset");
    }
    out.success(&format!(
        "Wrote {} rows from {} files to {}",
        report.rows,
        report.files.len(),
        args.output.display()
    ));
    Ok(())
}
