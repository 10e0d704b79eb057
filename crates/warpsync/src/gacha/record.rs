use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::{Error, Result};

/// Item rarity, as carried in the `rank_type` field.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    Display,
)]
pub enum Rarity {
    #[strum(serialize = "3")]
    #[serde(rename = "3")]
    Three,
    #[strum(serialize = "4")]
    #[serde(rename = "4")]
    Four,
    #[strum(serialize = "5")]
    #[serde(rename = "5")]
    Five,
}

impl Rarity {
    /// Rarities in the order statistics are reported.
    pub const REPORT_ORDER: [Rarity; 3] = [Rarity::Five, Rarity::Four, Rarity::Three];

    pub fn rank_type(&self) -> &'static str {
        self.into()
    }

    /// Whether draws of this rarity are covered by a pity counter
    pub fn is_tracked(&self) -> bool {
        matches!(self, Self::Four | Self::Five)
    }
}

/// One historical draw.
///
/// Every field is text, mirroring the store layout. `id` is unique per draw
/// and grows with time, so it serves as both dedup key and order key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub id: String,
    pub uid: String,
    pub gacha_id: String,
    pub gacha_type: String,
    pub item_id: String,
    pub count: String,
    pub time: String,
    pub name: String,
    pub lang: String,
    pub item_type: String,
    pub rank_type: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub region_time_zone: String,
}

impl DrawRecord {
    /// Build a record from one API list item.
    ///
    /// All keys except `region`/`region_time_zone` are required. Numbers are
    /// accepted and stored as their decimal text.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::NotAnObject(value.to_string()))?;

        Ok(Self {
            id: required(obj, "id")?,
            uid: required(obj, "uid")?,
            gacha_id: required(obj, "gacha_id")?,
            gacha_type: required(obj, "gacha_type")?,
            item_id: required(obj, "item_id")?,
            count: required(obj, "count")?,
            time: required(obj, "time")?,
            name: required(obj, "name")?,
            lang: required(obj, "lang")?,
            item_type: required(obj, "item_type")?,
            rank_type: required(obj, "rank_type")?,
            region: optional(obj, "region"),
            region_time_zone: optional(obj, "region_time_zone"),
        })
    }

    /// Stamp page-level region metadata onto this record.
    ///
    /// `None` keeps the value the item carried itself.
    pub fn with_region(mut self, region: Option<&str>, region_time_zone: Option<&str>) -> Self {
        if let Some(region) = region {
            self.region = region.to_string();
        }
        if let Some(tz) = region_time_zone {
            self.region_time_zone = tz.to_string();
        }
        self
    }

    pub fn rarity(&self) -> Option<Rarity> {
        self.rank_type.parse().ok()
    }

    pub fn is_rarity(&self, rarity: Rarity) -> bool {
        self.rank_type == rarity.rank_type()
    }
}

/// Text value of a JSON field, stringifying numbers.
pub(crate) fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required(obj: &Map<String, Value>, key: &'static str) -> Result<String> {
    obj.get(key)
        .and_then(json_text)
        .ok_or(Error::MissingField(key))
}

fn optional(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key).and_then(json_text).unwrap_or_default()
}

/// Compare draw ids by numeric value.
///
/// Ids are decimal strings longer than `u64` can hold in some regions, so the
/// comparison goes by digit count first and then lexically.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
