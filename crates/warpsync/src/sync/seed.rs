//! Seed URL discovery.
//!
//! The game's embedded browser caches every gacha log request it makes. The
//! cache data file is a sequence of entries separated by `1/0/`, each
//! starting with the NUL-terminated request URL.

use std::fs;
use std::path::{Path, PathBuf};

use memchr::memmem;
use tracing::{debug, info};
use url::Url;

use crate::api::query_value;
use crate::error::{Error, Result};

const ENTRY_SEPARATOR: &[u8] = b"1/0/";
const SCHEME: &str = "https://";
const API_PATH: &str = "/api/getGachaLog";
const GAME_BIZ: &str = "game_biz=hkrpg";

/// Source of the seed API URL when the caller does not supply one.
pub trait SeedUrlProvider {
    fn seed_url(&self) -> Result<String>;
}

impl<T: SeedUrlProvider + ?Sized> SeedUrlProvider for &T {
    fn seed_url(&self) -> Result<String> {
        (**self).seed_url()
    }
}

/// An unset provider: no seed URL available.
impl<T: SeedUrlProvider> SeedUrlProvider for Option<T> {
    fn seed_url(&self) -> Result<String> {
        match self {
            Some(provider) => provider.seed_url(),
            None => Err(Error::SeedUnavailable(
                "no API URL given and no web cache configured".to_string(),
            )),
        }
    }
}

/// Scans a game web-cache data file for the most recent gacha log URL.
#[derive(Debug, Clone)]
pub struct WebCacheSeed {
    path: PathBuf,
}

impl WebCacheSeed {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeedUrlProvider for WebCacheSeed {
    fn seed_url(&self) -> Result<String> {
        info!("Getting API URL from cache {}", self.path.display());
        let cache = fs::read(&self.path).map_err(|e| {
            Error::SeedUnavailable(format!("cannot read {}: {}", self.path.display(), e))
        })?;

        latest_url(&cache).ok_or_else(|| {
            Error::SeedUnavailable(
                "API URL is not found in cache, open the warp records page in game first"
                    .to_string(),
            )
        })
    }
}

/// Most recent gacha log URL in a cache dump.
///
/// Picks the highest `timestamp` query value; on ties the entry found last
/// wins.
pub fn latest_url(cache: &[u8]) -> Option<String> {
    let mut best: Option<(i64, String)> = None;

    for url in split_entries(cache).filter_map(|entry| url_in_entry(&entry)) {
        let timestamp = timestamp_of(&url);
        debug!("Cached API URL with timestamp {}", timestamp);
        if best.as_ref().is_none_or(|(max, _)| timestamp >= *max) {
            best = Some((timestamp, url));
        }
    }

    best.map(|(_, url)| url)
}

/// Entries between separators, each cut at its first NUL.
fn split_entries(cache: &[u8]) -> impl Iterator<Item = String> + '_ {
    let mut starts = vec![0];
    starts.extend(memmem::find_iter(cache, ENTRY_SEPARATOR).map(|i| i + ENTRY_SEPARATOR.len()));
    let mut ends: Vec<usize> = memmem::find_iter(cache, ENTRY_SEPARATOR).collect();
    ends.push(cache.len());

    starts.into_iter().zip(ends).map(move |(start, end)| {
        let chunk = &cache[start..end];
        let chunk = match memchr::memchr(0, chunk) {
            Some(nul) => &chunk[..nul],
            None => chunk,
        };
        String::from_utf8_lossy(chunk).replace('\u{FFFD}', "")
    })
}

/// Last gacha log URL in one entry.
///
/// A candidate runs from `https://` to the end of its line and must contain
/// the log endpoint followed by the Star Rail `game_biz`.
fn url_in_entry(entry: &str) -> Option<String> {
    entry
        .lines()
        .filter_map(|line| {
            line.match_indices(SCHEME)
                .map(|(i, _)| &line[i..])
                .find(|candidate| is_api_url(candidate))
        })
        .last()
        .map(str::to_string)
}

fn is_api_url(candidate: &str) -> bool {
    let rest = &candidate[SCHEME.len()..];
    rest.match_indices(API_PATH)
        .filter(|(i, _)| *i > 0)
        .any(|(i, _)| {
            let tail = &rest[i + API_PATH.len()..];
            tail.match_indices(GAME_BIZ)
                .any(|(j, _)| j > 0 && j + GAME_BIZ.len() < tail.len())
        })
}

fn timestamp_of(url: &str) -> i64 {
    Url::parse(url)
        .ok()
        .and_then(|url| query_value(&url, "timestamp"))
        .and_then(|ts| ts.parse().ok())
        .unwrap_or(0)
}
