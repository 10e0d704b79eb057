//! Runtime configuration.
//!
//! Passed explicitly into the store and the sync orchestrator; nothing reads
//! configuration from global state.
//!
//! ## Example
//!
//! ```ignore
//! use warpsync::config::WarpsyncConfig;
//!
//! let config = WarpsyncConfig::builder()
//!     .data_dir("/var/lib/warpsync")
//!     .request_interval_ms(300)
//!     .build();
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Configuration for sync and storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpsyncConfig {
    /// Directory holding one `<uid>.sqlite3` store per player
    pub data_dir: PathBuf,
    /// Delay after each API request, in milliseconds
    pub request_interval_ms: u64,
    /// Records requested per page
    pub page_size: u32,
    /// HTTP timeout, in seconds
    pub timeout_secs: u64,
    /// Upper bound on pages requested per category
    pub max_pages: u32,
    /// Crawl the categories on separate worker threads
    pub parallel_crawl: bool,
    /// Game web-cache file scanned for a seed URL
    pub web_cache_path: Option<PathBuf>,
}

impl Default for WarpsyncConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            request_interval_ms: 150,
            page_size: 20,
            timeout_secs: 10,
            max_pages: 10_000,
            parallel_crawl: false,
            web_cache_path: None,
        }
    }
}

impl WarpsyncConfig {
    /// Create a new configuration builder
    pub fn builder() -> WarpsyncConfigBuilder {
        WarpsyncConfigBuilder::default()
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Save configuration as TOML, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Path of the store for `uid`
    pub fn store_path(&self, uid: &str) -> PathBuf {
        self.data_dir.join(format!("{}.sqlite3", uid))
    }
}

/// Builder for WarpsyncConfig
#[derive(Debug, Clone, Default)]
pub struct WarpsyncConfigBuilder {
    data_dir: Option<PathBuf>,
    request_interval_ms: Option<u64>,
    page_size: Option<u32>,
    timeout_secs: Option<u64>,
    max_pages: Option<u32>,
    parallel_crawl: Option<bool>,
    web_cache_path: Option<PathBuf>,
}

impl WarpsyncConfigBuilder {
    /// Set the store directory
    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Set the delay after each request
    pub fn request_interval_ms(mut self, ms: u64) -> Self {
        self.request_interval_ms = Some(ms);
        self
    }

    /// Set the page size
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Set the HTTP timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set the per-category page ceiling
    pub fn max_pages(mut self, pages: u32) -> Self {
        self.max_pages = Some(pages);
        self
    }

    /// Enable or disable crawling categories in parallel
    pub fn parallel_crawl(mut self, enabled: bool) -> Self {
        self.parallel_crawl = Some(enabled);
        self
    }

    /// Set the web-cache file used to discover the seed URL
    pub fn web_cache_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.web_cache_path = Some(path.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> WarpsyncConfig {
        let default = WarpsyncConfig::default();
        WarpsyncConfig {
            data_dir: self.data_dir.unwrap_or(default.data_dir),
            request_interval_ms: self
                .request_interval_ms
                .unwrap_or(default.request_interval_ms),
            page_size: self.page_size.unwrap_or(default.page_size),
            timeout_secs: self.timeout_secs.unwrap_or(default.timeout_secs),
            max_pages: self.max_pages.unwrap_or(default.max_pages),
            parallel_crawl: self.parallel_crawl.unwrap_or(default.parallel_crawl),
            web_cache_path: self.web_cache_path.or(default.web_cache_path),
        }
    }
}
