use tracing::info;

use super::{CategoryLedger, DrawRecord, GachaCategory};
use crate::error::Result;
use crate::store::RecordStore;

/// Result of merging one batch of crawled or imported records.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub category: GachaCategory,
    /// Records offered to the ledger
    pub fetched: usize,
    /// Records that were not known before, oldest first
    pub new_records: Vec<DrawRecord>,
}

impl MergeOutcome {
    pub fn inserted(&self) -> usize {
        self.new_records.len()
    }
}

/// Draw history of one player: one ledger per category.
#[derive(Debug, Clone)]
pub struct GachaHistory {
    uid: String,
    ledgers: [CategoryLedger; 4],
}

impl GachaHistory {
    pub fn empty(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ledgers: GachaCategory::ALL.map(CategoryLedger::new),
        }
    }

    /// Load every category from `store`, in storage order.
    pub fn load(uid: impl Into<String>, store: &RecordStore) -> Result<Self> {
        let mut history = Self::empty(uid);
        for category in GachaCategory::ALL {
            let records = store.read_all(category)?;
            history.ledgers[category.index()] = CategoryLedger::from_records(category, records);
        }
        Ok(history)
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn ledger(&self, category: GachaCategory) -> &CategoryLedger {
        &self.ledgers[category.index()]
    }

    pub fn ledgers(&self) -> impl Iterator<Item = &CategoryLedger> {
        self.ledgers.iter()
    }

    /// Merge newest-first `records` into `category` and re-sort it.
    ///
    /// The returned new records are reversed to oldest first, the order
    /// they are appended to the store in.
    pub fn merge(&mut self, category: GachaCategory, records: Vec<DrawRecord>) -> MergeOutcome {
        let fetched = records.len();
        let ledger = &mut self.ledgers[category.index()];

        let mut new_records: Vec<DrawRecord> = records
            .into_iter()
            .filter(|record| ledger.insert(record.clone()))
            .collect();
        new_records.reverse();
        ledger.sort();

        MergeOutcome {
            category,
            fetched,
            new_records,
        }
    }

    pub fn sort_all(&mut self) {
        for ledger in &mut self.ledgers {
            ledger.sort();
        }
    }

    /// Draws across all categories
    pub fn total(&self) -> usize {
        self.ledgers.iter().map(|l| l.len()).sum()
    }

    /// Log the per-category statistics at info level.
    pub fn log_stats(&self) {
        for ledger in &self.ledgers {
            info!(
                "{} ({}): {} draws",
                ledger.category().display_name(),
                self.uid,
                ledger.len()
            );
            for stats in ledger.stats() {
                if stats.rarity.is_tracked() {
                    info!(
                        "  {}*: {} ({} / {}), {} since last, average {}, {}",
                        stats.rarity,
                        stats.count,
                        stats.basic_probability_display(),
                        stats.compound_probability_display(),
                        stats.since_last_display(),
                        stats.average_display(),
                        stats.attempts_display().join(" ")
                    );
                } else {
                    info!(
                        "  {}*: {} ({})",
                        stats.rarity,
                        stats.count,
                        stats.basic_probability_display()
                    );
                }
            }
        }
    }
}
