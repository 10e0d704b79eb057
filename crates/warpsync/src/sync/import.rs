//! SRGF import.
//!
//! SRGF files carry the player metadata once in `info` and a flat `list` of
//! draws without `uid`/`lang`/region fields. Those are stamped from `info`
//! before the draws are merged like a crawl.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::WarpsyncConfig;
use crate::error::Result;
use crate::gacha::{DrawRecord, GachaCategory, GachaHistory, compare_ids, json_text};
use crate::store::RecordStore;

/// A parsed SRGF document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrgfDocument {
    pub info: SrgfInfo,
    pub list: Vec<SrgfItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrgfInfo {
    #[serde(deserialize_with = "text")]
    pub uid: String,
    pub lang: String,
    #[serde(deserialize_with = "text")]
    pub region_time_zone: String,
    /// Seconds since the Unix epoch
    #[serde(default)]
    pub export_timestamp: Option<i64>,
    #[serde(default)]
    pub export_app: Option<String>,
    #[serde(default)]
    pub export_app_version: Option<String>,
    #[serde(default)]
    pub srgf_version: Option<String>,
}

/// One draw as exported, without player metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrgfItem {
    pub id: String,
    pub gacha_id: String,
    pub gacha_type: String,
    pub item_id: String,
    #[serde(deserialize_with = "text")]
    pub count: String,
    pub time: String,
    pub name: String,
    pub item_type: String,
    pub rank_type: String,
}

impl SrgfItem {
    fn into_record(self, info: &SrgfInfo) -> DrawRecord {
        DrawRecord {
            id: self.id,
            uid: info.uid.clone(),
            gacha_id: self.gacha_id,
            gacha_type: self.gacha_type,
            item_id: self.item_id,
            count: self.count,
            time: self.time,
            name: self.name,
            lang: info.lang.clone(),
            item_type: self.item_type,
            rank_type: self.rank_type,
            region: String::new(),
            region_time_zone: info.region_time_zone.clone(),
        }
    }
}

/// Summary of one import.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub uid: String,
    /// Items read from the document, skipped ones included
    pub total: usize,
    /// Items whose `gacha_type` is not a known category
    pub skipped: usize,
    /// New draws per category, in [`GachaCategory::ALL`] order
    pub inserted: Vec<(GachaCategory, usize)>,
    pub exported_at: Option<DateTime<Utc>>,
}

impl ImportReport {
    pub fn inserted_total(&self) -> usize {
        self.inserted.iter().map(|(_, n)| n).sum()
    }
}

/// Parse an SRGF file.
pub fn read_srgf<P: AsRef<Path>>(path: P) -> Result<SrgfDocument> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&content)?)
}

/// Merge `document` into the player's store, appending only unknown draws.
pub fn import_srgf(config: &WarpsyncConfig, document: SrgfDocument) -> Result<ImportReport> {
    let SrgfDocument { info, list } = document;
    let total = list.len();
    let mut skipped = 0;

    let mut grouped: BTreeMap<GachaCategory, Vec<DrawRecord>> = BTreeMap::new();
    for item in list {
        match GachaCategory::from_gacha_type(&item.gacha_type) {
            Some(category) => grouped
                .entry(category)
                .or_default()
                .push(item.into_record(&info)),
            None => {
                warn!("Skipping draw {} with unknown gacha_type {:?}", item.id, item.gacha_type);
                skipped += 1;
            }
        }
    }

    let mut store = RecordStore::open_player(config, &info.uid)?;
    info!("Connected to store of uid {}", info.uid);
    let mut history = GachaHistory::load(info.uid.as_str(), &store)?;

    let mut inserted = Vec::with_capacity(GachaCategory::ALL.len());
    for category in GachaCategory::ALL {
        let mut records = grouped.remove(&category).unwrap_or_default();
        // merge expects newest first, like a crawl
        records.sort_by(|a, b| compare_ids(&b.id, &a.id));
        let merged = history.merge(category, records);
        let count = store.append(category, &merged.new_records)?;
        info!("Importing {}, {} new of {}", category, count, merged.fetched);
        inserted.push((category, count));
    }

    let exported_at = info
        .export_timestamp
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));

    history.log_stats();

    Ok(ImportReport {
        uid: info.uid,
        total,
        skipped,
        inserted,
        exported_at,
    })
}

/// Accept a string or a number as text.
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    json_text(&value)
        .ok_or_else(|| D::Error::custom(format!("expected a string or number, got {}", value)))
}
