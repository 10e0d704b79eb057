//! Prelude module for convenient imports
//!
//! # Usage
//!
//! ```ignore
//! use warpsync::prelude::*;
//! ```
//!
//! This brings the following into scope:
//!
//! - Sync: `Synchronizer`, `SyncResult`, `SeedUrlProvider`, `WebCacheSeed`
//! - Storage: `RecordStore`, `GachaHistory`, `CategoryLedger`
//! - Draw data: `DrawRecord`, `GachaCategory`, `Rarity`
//! - Statistics: `RarityStats`, `CategorySummary`
//! - Error handling: `Error`, `Result`

// Configuration
pub use crate::config::WarpsyncConfig;

// Error handling
pub use crate::error::{Error, Result};

// Transport
pub use crate::api::PageFetcher;
#[cfg(feature = "http")]
pub use crate::api::UreqFetcher;

// Draw data
pub use crate::gacha::{CategoryLedger, DrawRecord, GachaCategory, GachaHistory, Rarity};

// Statistics
pub use crate::stats::{CategorySummary, RarityStats};

// Storage
pub use crate::store::RecordStore;

// Sync and import
pub use crate::sync::{SeedUrlProvider, SyncResult, Synchronizer, WebCacheSeed, import_srgf};
