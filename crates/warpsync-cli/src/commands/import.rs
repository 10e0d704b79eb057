//! Import command for SRGF exports.

use std::path::Path;

use anyhow::{Context, Result};
use warpsync::{WarpsyncConfig, import_srgf, read_srgf};

pub fn run(config: &WarpsyncConfig, file: &Path) -> Result<()> {
    let document = read_srgf(file)
        .with_context(|| format!("Failed to read SRGF file {}", file.display()))?;
    let report = import_srgf(config, document).context("Import failed")?;

    println!(
        "Imported {} new of {} records for uid {}",
        report.inserted_total(),
        report.total,
        report.uid
    );
    for (category, count) in &report.inserted {
        println!("  {:<22} {:>5} new", category.display_name(), count);
    }
    if report.skipped > 0 {
        println!("  {} records with an unknown gacha_type were skipped", report.skipped);
    }
    if let Some(exported_at) = report.exported_at {
        println!("Exported at {}", exported_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    Ok(())
}
