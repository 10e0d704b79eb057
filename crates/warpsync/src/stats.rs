//! Pity statistics over a newest-first draw list.
//!
//! Everything here is a pure function of the record slice, so a snapshot
//! returned by a sync can be shared between any number of readers.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::gacha::{DrawRecord, Rarity};

/// Timestamp format used by the `time` field
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A closed pity run: the draws up to and including one hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PityRun {
    /// Name of the item drawn at the hit that closed the run
    pub name: String,
    /// Run length, hit included
    pub draws: usize,
}

impl fmt::Display for PityRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.draws)
    }
}

/// Per-rarity breakdown of one category.
///
/// Probabilities are fractions (`0.03` is three percent). Derived fields are
/// `None` when the rarity was never drawn, and the pity fields stay `None`
/// for rarities without a pity counter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RarityStats {
    pub rarity: Rarity,
    pub count: usize,
    pub basic_probability: Option<f64>,
    pub compound_probability: Option<f64>,
    /// Draws since the most recent hit
    pub since_last: Option<usize>,
    /// Completed runs, newest first
    pub attempts: Vec<PityRun>,
    /// Mean run length
    pub average: Option<f64>,
}

impl RarityStats {
    fn empty(rarity: Rarity, count: usize) -> Self {
        Self {
            rarity,
            count,
            basic_probability: None,
            compound_probability: None,
            since_last: None,
            attempts: Vec::new(),
            average: None,
        }
    }

    pub fn basic_probability_display(&self) -> String {
        self.basic_probability.map(format_percent).unwrap_or_default()
    }

    pub fn compound_probability_display(&self) -> String {
        self.compound_probability
            .map(format_percent)
            .unwrap_or_default()
    }

    pub fn since_last_display(&self) -> String {
        self.since_last.map(|n| n.to_string()).unwrap_or_default()
    }

    pub fn average_display(&self) -> String {
        self.average.map(|a| format!("{:.2}", a)).unwrap_or_default()
    }

    /// Run history as `name@count` strings
    pub fn attempts_display(&self) -> Vec<String> {
        self.attempts.iter().map(|run| run.to_string()).collect()
    }
}

/// Format a fraction as a two-decimal percentage ("3.00%").
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Compute the breakdown of `rarity` over a newest-first record list.
pub fn rarity_stats(records: &[DrawRecord], rarity: Rarity) -> RarityStats {
    let total = records.len();
    let count = records.iter().filter(|r| r.is_rarity(rarity)).count();

    // No hit at all: nothing to divide by, report the open run only
    if total == 0 || count == 0 {
        let mut stats = RarityStats::empty(rarity, count);
        if rarity.is_tracked() {
            stats.since_last = Some(total);
        }
        return stats;
    }

    let basic_probability = Some(count as f64 / total as f64);
    if !rarity.is_tracked() {
        return RarityStats {
            basic_probability,
            ..RarityStats::empty(rarity, count)
        };
    }

    let (since_last, attempts) = pity_runs(records, rarity);
    let closed = total - since_last;

    RarityStats {
        rarity,
        count,
        basic_probability,
        compound_probability: Some(count as f64 / closed as f64),
        since_last: Some(since_last),
        attempts,
        average: Some(closed as f64 / count as f64),
    }
}

/// Split a newest-first list into pity runs.
///
/// Returns the length of the open run at the newest end and the closed runs,
/// newest first. A virtual hit past the oldest record closes the oldest run.
fn pity_runs(records: &[DrawRecord], rarity: Rarity) -> (usize, Vec<PityRun>) {
    let mut runs = Vec::new();
    let mut since_last = None;
    let mut current: Option<&str> = None;
    let mut draws = 0usize;

    for record in records {
        if record.is_rarity(rarity) {
            match current {
                Some(name) => runs.push(PityRun {
                    name: name.to_string(),
                    draws,
                }),
                None => since_last = Some(draws),
            }
            current = Some(record.name.as_str());
            draws = 0;
        }
        draws += 1;
    }

    match current {
        Some(name) => runs.push(PityRun {
            name: name.to_string(),
            draws,
        }),
        None => since_last = Some(draws),
    }

    (since_last.unwrap_or(draws), runs)
}

/// Draw count for one item type at one rarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemTypeCount {
    pub item_type: String,
    pub rarity: Rarity,
    pub count: usize,
}

/// At-a-glance summary of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub total: usize,
    /// Counts by rarity (highest first), then item type
    pub counts: Vec<ItemTypeCount>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    /// 5-star pity figures over every item type
    pub five_star: RarityStats,
}

impl CategorySummary {
    pub fn count_of(&self, item_type: &str, rarity: Rarity) -> usize {
        self.counts
            .iter()
            .find(|c| c.rarity == rarity && c.item_type == item_type)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// Summarize a newest-first record list.
pub fn summarize(records: &[DrawRecord]) -> CategorySummary {
    let mut buckets: BTreeMap<(Rarity, &str), usize> = BTreeMap::new();
    let mut start_time: Option<NaiveDateTime> = None;
    let mut end_time: Option<NaiveDateTime> = None;

    for record in records {
        if let Some(rarity) = record.rarity() {
            *buckets.entry((rarity, record.item_type.as_str())).or_default() += 1;
        }

        match NaiveDateTime::parse_from_str(&record.time, TIME_FORMAT) {
            Ok(time) => {
                start_time = Some(start_time.map_or(time, |t| t.min(time)));
                end_time = Some(end_time.map_or(time, |t| t.max(time)));
            }
            Err(e) => debug!("Skipping unparsable time {:?} of {}: {}", record.time, record.id, e),
        }
    }

    let mut counts: Vec<ItemTypeCount> = buckets
        .into_iter()
        .map(|((rarity, item_type), count)| ItemTypeCount {
            item_type: item_type.to_string(),
            rarity,
            count,
        })
        .collect();
    counts.sort_by(|a, b| {
        b.rarity
            .cmp(&a.rarity)
            .then_with(|| a.item_type.cmp(&b.item_type))
    });

    CategorySummary {
        total: records.len(),
        counts,
        start_time,
        end_time,
        five_star: rarity_stats(records, Rarity::Five),
    }
}
