//! Sync command: crawl the API and merge into the local store.

use std::time::Duration;

use anyhow::{Context, Result};
use warpsync::{StopReason, Synchronizer, UreqFetcher, WarpsyncConfig, WebCacheSeed};

use super::stats::print_history;

pub fn run(config: &WarpsyncConfig, api: Option<&str>) -> Result<()> {
    let fetcher = UreqFetcher::new(Duration::from_secs(config.timeout_secs));
    let seed = config.web_cache_path.clone().map(WebCacheSeed::new);

    let result = Synchronizer::new(config, &fetcher)
        .sync(api, &seed)
        .context("Sync failed")?;

    println!("Synced uid {}", result.uid);
    for report in &result.reports {
        let stop = match &report.stop {
            StopReason::EndOfHistory => String::new(),
            StopReason::Invalid(reason) => format!(" (stopped early: {})", reason),
            StopReason::PageLimit => " (stopped at page limit)".to_string(),
        };
        println!(
            "  {:<22} {:>5} fetched, {:>5} new{}",
            report.category.display_name(),
            report.fetched,
            report.inserted,
            stop
        );
    }
    println!();
    print_history(&result.history);

    Ok(())
}
