use std::collections::HashSet;

use super::{DrawRecord, GachaCategory, Rarity, compare_ids};
use crate::stats::{self, CategorySummary, RarityStats};

/// Deduplicating working set of one category's draws.
///
/// No two records share an `id`. Records keep insertion order until
/// [`CategoryLedger::sort`] puts them newest-first, which is the order the
/// statistics expect.
#[derive(Debug, Clone)]
pub struct CategoryLedger {
    category: GachaCategory,
    records: Vec<DrawRecord>,
    seen: HashSet<String>,
}

impl CategoryLedger {
    pub fn new(category: GachaCategory) -> Self {
        Self {
            category,
            records: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Build a ledger from existing records, dropping repeated ids.
    pub fn from_records<I>(category: GachaCategory, records: I) -> Self
    where
        I: IntoIterator<Item = DrawRecord>,
    {
        let mut ledger = Self::new(category);
        ledger.insert_all(records);
        ledger
    }

    pub fn category(&self) -> GachaCategory {
        self.category
    }

    /// Append `record` unless its id was already seen.
    ///
    /// Returns `true` when the record was added.
    pub fn insert(&mut self, record: DrawRecord) -> bool {
        if self.seen.contains(&record.id) {
            return false;
        }
        self.seen.insert(record.id.clone());
        self.records.push(record);
        true
    }

    /// Insert each record in order, reporting which ones were new.
    pub fn insert_all<I>(&mut self, records: I) -> Vec<bool>
    where
        I: IntoIterator<Item = DrawRecord>,
    {
        records.into_iter().map(|r| self.insert(r)).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Sort by descending id (newest first).
    pub fn sort(&mut self) {
        self.records.sort_by(|a, b| compare_ids(&b.id, &a.id));
    }

    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Breakdown for 5, 4 and 3 star draws, in that order.
    pub fn stats(&self) -> Vec<RarityStats> {
        Rarity::REPORT_ORDER
            .iter()
            .map(|&rarity| self.substats(rarity))
            .collect()
    }

    pub fn substats(&self, rarity: Rarity) -> RarityStats {
        stats::rarity_stats(&self.records, rarity)
    }

    pub fn summary(&self) -> CategorySummary {
        stats::summarize(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::draw;

    #[test]
    fn test_insert_is_idempotent() {
        let mut ledger = CategoryLedger::new(GachaCategory::Stellar);
        let record = draw("1001", "3", "Arrows");

        assert!(ledger.insert(record.clone()));
        assert!(!ledger.insert(record));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_insert_all_reports_new_records() {
        let mut ledger = CategoryLedger::from_records(
            GachaCategory::Character,
            vec![draw("1002", "3", "Arrows"), draw("1001", "3", "Cornucopia")],
        );

        let flags = ledger.insert_all(vec![
            draw("1004", "4", "Natasha"),
            draw("1003", "3", "Void"),
            draw("1002", "3", "Arrows"),
            draw("1004", "4", "Natasha"),
        ]);

        assert_eq!(flags, vec![true, true, false, false]);
        assert_eq!(ledger.len(), 4);
        assert!(ledger.contains("1003"));
    }

    #[test]
    fn test_from_records_drops_duplicates() {
        let ledger = CategoryLedger::from_records(
            GachaCategory::Departure,
            vec![draw("7", "3", "A"), draw("7", "3", "A")],
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut ledger = CategoryLedger::from_records(
            GachaCategory::LightCone,
            vec![
                draw("998", "3", "a"),
                draw("1000", "3", "b"),
                draw("999", "3", "c"),
            ],
        );
        ledger.sort();

        let ids: Vec<&str> = ledger.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1000", "999", "998"]);
    }

    #[test]
    fn test_stats_order() {
        let ledger = CategoryLedger::new(GachaCategory::Stellar);
        let stats = ledger.stats();
        let order: Vec<Rarity> = stats.iter().map(|s| s.rarity).collect();
        assert_eq!(order, vec![Rarity::Five, Rarity::Four, Rarity::Three]);
    }
}
