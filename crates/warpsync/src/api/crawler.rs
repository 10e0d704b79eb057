use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::fetch::PageFetcher;
use super::page::{InvalidPage, PageStatus, classify};
use super::template::ApiTemplate;
use crate::config::WarpsyncConfig;
use crate::gacha::{DrawRecord, GachaCategory};

/// Paging parameters shared by every category crawl.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Value of the `size` query parameter
    pub page_size: u32,
    /// Delay after every request, successful or not
    pub request_interval: Duration,
    /// Safety ceiling on requests per category
    pub max_pages: u32,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from(&WarpsyncConfig::default())
    }
}

impl From<&WarpsyncConfig> for CrawlOptions {
    fn from(config: &WarpsyncConfig) -> Self {
        Self {
            page_size: config.page_size,
            request_interval: Duration::from_millis(config.request_interval_ms),
            max_pages: config.max_pages,
        }
    }
}

/// Why a category crawl ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndOfHistory,
    /// A response could not be used; everything gathered before it is kept
    Invalid(InvalidPage),
    PageLimit,
}

/// Records gathered for one category, newest first.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub category: GachaCategory,
    pub records: Vec<DrawRecord>,
    pub requests: u32,
    pub stop: StopReason,
}

/// Walks one category backwards from the newest draw using the `end_id` cursor.
pub struct Crawler<'a, F: ?Sized> {
    fetcher: &'a F,
    template: &'a ApiTemplate,
    options: &'a CrawlOptions,
}

impl<'a, F: PageFetcher + ?Sized> Crawler<'a, F> {
    pub fn new(fetcher: &'a F, template: &'a ApiTemplate, options: &'a CrawlOptions) -> Self {
        Self {
            fetcher,
            template,
            options,
        }
    }

    /// Crawl `category` until the history ends or a response is unusable.
    ///
    /// Never fails: an unusable response truncates the crawl to what was
    /// gathered so far.
    pub fn crawl(&self, category: GachaCategory) -> CrawlOutcome {
        let mut records: Vec<DrawRecord> = Vec::new();
        let mut end_id = String::from("0");
        let mut requests = 0u32;

        for page in 1..=self.options.max_pages {
            info!("Downloading page {} of {}", page, category);
            let url = self
                .template
                .request_url(&end_id, category, page, self.options.page_size);
            debug!("Requesting {}", url);

            let status = classify(self.fetcher.fetch(&url));
            requests += 1;
            if !self.options.request_interval.is_zero() {
                thread::sleep(self.options.request_interval);
            }

            let stop = match status {
                PageStatus::Page(items) => {
                    debug!("Page {} of {}: {} records", page, category, items.len());
                    if let Some(last) = items.last() {
                        end_id = last.id.clone();
                    }
                    records.extend(items);
                    continue;
                }
                PageStatus::EndOfHistory => {
                    info!("Reached the end of {} history", category);
                    StopReason::EndOfHistory
                }
                PageStatus::Invalid(reason) => {
                    warn!(
                        "Stopping {} at page {}: {} ({} records kept)",
                        category,
                        page,
                        reason,
                        records.len()
                    );
                    StopReason::Invalid(reason)
                }
            };

            return CrawlOutcome {
                category,
                records,
                requests,
                stop,
            };
        }

        warn!(
            "Stopping {} after {} pages without reaching the end of history",
            category, self.options.max_pages
        );
        CrawlOutcome {
            category,
            records,
            requests,
            stop: StopReason::PageLimit,
        }
    }
}
