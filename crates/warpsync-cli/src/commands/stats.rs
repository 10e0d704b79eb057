//! Stats command: statistics of a stored player.

use anyhow::{Result, bail};
use serde_json::json;
use warpsync::stats::TIME_FORMAT;
use warpsync::store::validate_uid;
use warpsync::{GachaHistory, RecordStore, WarpsyncConfig};

pub fn run(config: &WarpsyncConfig, uid: &str, as_json: bool) -> Result<()> {
    validate_uid(uid)?;
    if !config.store_path(uid).exists() {
        bail!("No stored history for uid {}", uid);
    }

    let store = RecordStore::open_player(config, uid)?;
    let mut history = GachaHistory::load(uid, &store)?;
    history.sort_all();

    if as_json {
        let categories: Vec<_> = history
            .ledgers()
            .map(|ledger| {
                json!({
                    "category": ledger.category(),
                    "summary": ledger.summary(),
                    "stats": ledger.stats(),
                })
            })
            .collect();
        let output = json!({ "uid": uid, "categories": categories });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_history(&history);
    }

    Ok(())
}

/// Print per-category statistics as text.
pub fn print_history(history: &GachaHistory) {
    for ledger in history.ledgers() {
        let summary = ledger.summary();
        println!("{} ({} draws)", ledger.category().display_name(), summary.total);
        if let (Some(start), Some(end)) = (summary.start_time, summary.end_time) {
            println!(
                "  {} - {}",
                start.format(TIME_FORMAT),
                end.format(TIME_FORMAT)
            );
        }

        for stats in ledger.stats() {
            if stats.rarity.is_tracked() {
                println!(
                    "  {}*  {:>4}  {:>7}  {:>7}  since last {:>3}  avg {:>6}",
                    stats.rarity,
                    stats.count,
                    stats.basic_probability_display(),
                    stats.compound_probability_display(),
                    stats.since_last_display(),
                    stats.average_display()
                );
                if !stats.attempts.is_empty() {
                    println!("        {}", stats.attempts_display().join(" "));
                }
            } else {
                println!(
                    "  {}*  {:>4}  {:>7}",
                    stats.rarity,
                    stats.count,
                    stats.basic_probability_display()
                );
            }
        }
        println!();
    }
}
