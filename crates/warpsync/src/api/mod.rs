//! Gacha log API access.
//!
//! - **Template**: seed URL to reusable request template
//! - **Fetch**: the transport seam
//! - **Http**: its `ureq` implementation (`http` feature)
//! - **Page**: response classification
//! - **Crawler**: cursor-based paging over one category

mod crawler;
mod fetch;
#[cfg(feature = "http")]
mod http;
mod page;
mod template;

pub use crawler::{CrawlOptions, CrawlOutcome, Crawler, StopReason};
pub use fetch::{FetchedPage, PageFetcher};
#[cfg(feature = "http")]
pub use http::UreqFetcher;
pub use page::{InvalidPage, PageStatus, classify};
pub use template::{ApiTemplate, query_value};
