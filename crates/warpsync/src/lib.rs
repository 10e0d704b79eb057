//! # warpsync
//!
//! Core library for syncing Honkai: Star Rail warp history.
//!
//! This crate provides:
//! - Cursor-based crawling of the gacha log API
//! - A versioned per-player SQLite store with schema migration
//! - Deduplicating merge of crawled or imported draws
//! - Pity statistics over the merged history
//!
//! ## Feature Flags
//!
//! - `http` (default): the `ureq`-backed [`api::UreqFetcher`]. Without it the
//!   crawler runs against any caller-supplied [`api::PageFetcher`].

pub mod api;
pub mod config;
pub mod error;
pub mod gacha;
pub mod prelude;
pub mod stats;
pub mod store;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{
    ApiTemplate, CrawlOptions, CrawlOutcome, Crawler, FetchedPage, InvalidPage, PageFetcher,
    PageStatus, StopReason, classify,
};
#[cfg(feature = "http")]
pub use api::UreqFetcher;
pub use config::{WarpsyncConfig, WarpsyncConfigBuilder};
pub use error::{Error, Result};
pub use gacha::{CategoryLedger, DrawRecord, GachaCategory, GachaHistory, MergeOutcome, Rarity};
pub use stats::{CategorySummary, PityRun, RarityStats, rarity_stats, summarize};
pub use store::{CURRENT_SCHEMA_VERSION, RecordStore};
pub use sync::{
    CategorySyncReport, ImportReport, SeedUrlProvider, SrgfDocument, SyncResult, Synchronizer,
    WebCacheSeed, import_srgf, read_srgf,
};
