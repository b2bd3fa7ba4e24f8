//! Batch lookup command.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tokio::runtime::Runtime;

use crate::cadin::{ProviderSettings, ResolutionService};
use crate::error::ResultExt;
use crate::report;

/// Rows echoed to the terminal; the full list is in the report file.
const PREVIEW_ROWS: usize = 20;

/// Resolve every document in `input` and write the CSV report to `output`
pub fn cmd_batch(
    rt: &Runtime,
    settings: ProviderSettings,
    input: &Path,
    output: &Path,
) -> anyhow::Result<()> {
    let file = File::open(input).with_context(format!("opening {}", input.display()))?;
    let inputs = report::read_inputs(file).with_context(format!("reading {}", input.display()))?;
    println!("Read {} row(s) from {:?}", inputs.len(), input);

    let service = ResolutionService::new(settings)?;
    let result = rt.block_on(service.run_batch(&inputs))?;

    println!();
    println!("{:<20} {:<5} {:<10} {:>8}  Source", "Document", "Type", "Status", "Pending");
    for row in result.rows.iter().take(PREVIEW_ROWS) {
        println!(
            "{:<20} {:<5} {:<10} {:>8}  {}",
            row.document, row.kind, row.status, row.pending_count, row.source
        );
    }
    if result.rows.len() > PREVIEW_ROWS {
        println!("... and {} more", result.rows.len() - PREVIEW_ROWS);
    }

    let out = File::create(output).with_context(format!("creating {}", output.display()))?;
    report::write_report(BufWriter::new(out), &result.rows)?;

    println!();
    println!("Batch Summary");
    println!("=============");
    println!("  ✓ Resolved:   {}", result.rows.len());
    println!("  ✗ Irregular:  {}", result.irregular_count());
    println!("  - Skipped:    {}", result.skipped);
    if result.warnings > 0 {
        println!("  ⚠ Warnings:   {}", result.warnings);
    }
    for (source, count) in result.source_counts() {
        println!("    {:<16} {}", source.as_str(), count);
    }
    println!();
    println!("Report written to {:?}", output);

    Ok(())
}
