//! Response classification.
//!
//! Checks run in a fixed order and the first match wins:
//! transport/decode failure, non-2xx status, missing or empty `data`,
//! missing `data.list`, empty `data.list` (end of history), valid page.

use serde_json::{Map, Value};
use thiserror::Error;

use super::fetch::FetchedPage;
use crate::error::Result;
use crate::gacha::{DrawRecord, json_text};

/// Why a response could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPage {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("response is not valid JSON")]
    Decode,

    #[error("request failed with status {0}")]
    Status(u16),

    #[error("`data` is missing or empty")]
    MissingData,

    #[error("`data.list` is missing")]
    MissingList,

    #[error("malformed list item: {0}")]
    MalformedItem(String),
}

/// Classification of one API response.
#[derive(Debug, Clone, PartialEq)]
pub enum PageStatus {
    /// A non-empty page of draws, region metadata already applied
    Page(Vec<DrawRecord>),
    /// Valid response with an empty list
    EndOfHistory,
    Invalid(InvalidPage),
}

impl PageStatus {
    /// Whether the response itself was well-formed (end of history included)
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }

    pub fn message(&self) -> String {
        match self {
            Self::Page(records) => format!("ok, {} records", records.len()),
            Self::EndOfHistory => "valid but reaching the end of list".to_string(),
            Self::Invalid(reason) => reason.to_string(),
        }
    }
}

/// Classify the result of a fetch.
pub fn classify(result: Result<FetchedPage>) -> PageStatus {
    let page = match result {
        Ok(page) => page,
        Err(e) => return PageStatus::Invalid(InvalidPage::Transport(e.to_string())),
    };

    let Some(body) = page.body else {
        return PageStatus::Invalid(InvalidPage::Decode);
    };

    if !(200..300).contains(&page.status) {
        return PageStatus::Invalid(InvalidPage::Status(page.status));
    }

    let data = match body.get("data") {
        Some(data) if !is_falsy(data) => data,
        _ => return PageStatus::Invalid(InvalidPage::MissingData),
    };

    let Some(data) = data.as_object() else {
        return PageStatus::Invalid(InvalidPage::MissingList);
    };
    let Some(list) = data.get("list") else {
        return PageStatus::Invalid(InvalidPage::MissingList);
    };

    if is_falsy(list) {
        return PageStatus::EndOfHistory;
    }
    let Some(items) = list.as_array() else {
        return PageStatus::Invalid(InvalidPage::MalformedItem(
            "`data.list` is not an array".to_string(),
        ));
    };

    match parse_items(data, items) {
        Ok(records) => PageStatus::Page(records),
        Err(e) => PageStatus::Invalid(InvalidPage::MalformedItem(e.to_string())),
    }
}

/// Parse list items, copying page-level region fields onto each record.
fn parse_items(data: &Map<String, Value>, items: &[Value]) -> Result<Vec<DrawRecord>> {
    let region = data.get("region").and_then(json_text);
    let region_time_zone = data.get("region_time_zone").and_then(json_text);

    items
        .iter()
        .map(|item| {
            Ok(DrawRecord::from_json(item)?
                .with_region(region.as_deref(), region_time_zone.as_deref()))
        })
        .collect()
}

/// JSON truthiness: null, false, zero and empty containers count as absent.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
