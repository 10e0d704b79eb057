//! Sync orchestration.
//!
//! One sync validates the seed URL, crawls every category, deduces the
//! player, merges the crawl into the stored history and appends only the
//! draws that were not stored yet.
//!
//! ## Example
//!
//! ```ignore
//! use warpsync::api::UreqFetcher;
//! use warpsync::config::WarpsyncConfig;
//! use warpsync::sync::{Synchronizer, WebCacheSeed};
//!
//! let config = WarpsyncConfig::default();
//! let fetcher = UreqFetcher::default();
//! let result = Synchronizer::new(&config, &fetcher)
//!     .sync(None, &WebCacheSeed::new("data_2"))?;
//! println!("{} draws for {}", result.history.total(), result.uid);
//! ```

mod import;
mod seed;

use std::panic;
use std::thread;

use tracing::{error, info};
use url::Url;

use crate::api::{
    ApiTemplate, CrawlOptions, CrawlOutcome, Crawler, PageFetcher, StopReason, classify,
};
use crate::config::WarpsyncConfig;
use crate::error::{Error, Result};
use crate::gacha::{GachaCategory, GachaHistory};
use crate::store::RecordStore;

pub use import::{ImportReport, SrgfDocument, SrgfInfo, SrgfItem, import_srgf, read_srgf};
pub use seed::{SeedUrlProvider, WebCacheSeed, latest_url};

/// Per-category result of one sync.
#[derive(Debug, Clone)]
pub struct CategorySyncReport {
    pub category: GachaCategory,
    /// Records returned by the API
    pub fetched: usize,
    /// Records appended to the store
    pub inserted: usize,
    pub requests: u32,
    pub stop: StopReason,
}

/// Outcome of a successful sync.
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub uid: String,
    /// Merged history, every ledger sorted newest first
    pub history: GachaHistory,
    /// One report per category, in [`GachaCategory::ALL`] order
    pub reports: Vec<CategorySyncReport>,
}

impl SyncResult {
    pub fn inserted(&self) -> usize {
        self.reports.iter().map(|r| r.inserted).sum()
    }
}

/// Runs syncs against one fetcher with one configuration.
pub struct Synchronizer<'a, F: ?Sized> {
    config: &'a WarpsyncConfig,
    fetcher: &'a F,
}

impl<'a, F: PageFetcher + Sync + ?Sized> Synchronizer<'a, F> {
    pub fn new(config: &'a WarpsyncConfig, fetcher: &'a F) -> Self {
        Self { config, fetcher }
    }

    /// Run one full sync.
    ///
    /// `api_url` takes precedence over `seed`. Fails only when the seed URL
    /// is unusable or no category returned a draw; in both cases nothing
    /// has been written.
    pub fn sync<S>(&self, api_url: Option<&str>, seed: &S) -> Result<SyncResult>
    where
        S: SeedUrlProvider + ?Sized,
    {
        let seed_url = match api_url {
            Some(url) => url.to_string(),
            None => seed.seed_url()?,
        };

        let template = self.check_seed(&seed_url)?;
        let options = CrawlOptions::from(self.config);
        let outcomes = self.crawl_all(&template, &options);

        let Some(uid) = deduce_uid(&outcomes) else {
            error!("Cannot deduce uid from records, there may be no gacha record");
            return Err(Error::NoRecords);
        };
        let mut store = RecordStore::open_player(self.config, &uid)?;
        info!("Connected to store of uid {}", uid);

        let mut history = GachaHistory::load(uid.as_str(), &store)?;
        let mut reports = Vec::with_capacity(outcomes.len());

        for outcome in outcomes {
            let requests = outcome.requests;
            let merged = history.merge(outcome.category, outcome.records);
            let inserted = store.append(outcome.category, &merged.new_records)?;
            info!(
                "Exporting {}, {} fetched, {} new",
                outcome.category, merged.fetched, inserted
            );

            reports.push(CategorySyncReport {
                category: outcome.category,
                fetched: merged.fetched,
                inserted,
                requests,
                stop: outcome.stop,
            });
        }

        history.log_stats();

        Ok(SyncResult {
            uid,
            history,
            reports,
        })
    }

    /// Probe the seed URL once and derive the request template from it.
    fn check_seed(&self, seed_url: &str) -> Result<ApiTemplate> {
        let url = Url::parse(seed_url.trim()).map_err(|e| Error::InvalidApi(e.to_string()))?;
        let status = classify(self.fetcher.fetch(&url));
        info!("Checking API URL: {}", status.message());

        if !status.is_valid() {
            error!("API URL check failed: {}", status.message());
            return Err(Error::InvalidApi(status.message()));
        }

        ApiTemplate::from_seed(seed_url.trim())
    }

    fn crawl_all(&self, template: &ApiTemplate, options: &CrawlOptions) -> Vec<CrawlOutcome> {
        let crawler = Crawler::new(self.fetcher, template, options);

        if !self.config.parallel_crawl {
            return GachaCategory::ALL
                .iter()
                .map(|&category| crawler.crawl(category))
                .collect();
        }

        let crawler = &crawler;
        thread::scope(|scope| {
            let handles: Vec<_> = GachaCategory::ALL
                .iter()
                .map(|&category| scope.spawn(move || crawler.crawl(category)))
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                .collect()
        })
    }
}

/// First uid found, searching categories in [`GachaCategory::ALL`] order.
fn deduce_uid(outcomes: &[CrawlOutcome]) -> Option<String> {
    outcomes
        .iter()
        .flat_map(|outcome| outcome.records.iter())
        .map(|record| record.uid.as_str())
        .find(|uid| !uid.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FetchedPage, InvalidPage, query_value};
    use crate::gacha::Rarity;
    use crate::testing::{FakeGachaLog, ScriptedFetcher, draw_json, page};
    use serde_json::json;
    use tempfile::tempdir;

    const SEED: &str = "https://api.example.com/common/gacha_record/api/getGachaLog?authkey=abc&game_biz=hkrpg_global&gacha_type=11&page=1&size=5&end_id=0";

    struct NoSeed;

    impl SeedUrlProvider for NoSeed {
        fn seed_url(&self) -> Result<String> {
            Err(Error::SeedUnavailable("no seed in tests".to_string()))
        }
    }

    fn config(data_dir: &std::path::Path) -> WarpsyncConfig {
        WarpsyncConfig::builder()
            .data_dir(data_dir)
            .request_interval_ms(0)
            .page_size(5)
            .build()
    }

    fn serve(log: FakeGachaLog) -> ScriptedFetcher {
        ScriptedFetcher::new(move |url| Ok(log.respond(url)))
    }

    #[test]
    fn test_end_to_end_scenario() {
        let dir = tempdir().unwrap();
        let config = config(dir.path());
        // newest first: 3 3 5 3 4 5 3
        let log = FakeGachaLog::new("100000001").with_ranks(
            GachaCategory::Stellar,
            &["3", "3", "5", "3", "4", "5", "3"],
        );
        let fetcher = serve(log);

        let result = Synchronizer::new(&config, &fetcher)
            .sync(Some(SEED), &NoSeed)
            .unwrap();

        assert_eq!(result.uid, "100000001");
        assert_eq!(result.reports[0].fetched, 7);
        assert_eq!(result.reports[0].requests, 3);
        assert_eq!(result.reports[0].stop, StopReason::EndOfHistory);

        let store = RecordStore::open_player(&config, "100000001").unwrap();
        assert_eq!(store.count(GachaCategory::Stellar).unwrap(), 7);
        for category in [
            GachaCategory::Departure,
            GachaCategory::Character,
            GachaCategory::LightCone,
        ] {
            assert_eq!(store.count(category).unwrap(), 0);
        }

        let stats = result
            .history
            .ledger(GachaCategory::Stellar)
            .substats(Rarity::Five);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.since_last, Some(2));
        assert_eq!(stats.attempts_display(), vec!["stellar-5@3", "stellar-2@2"]);
        assert_eq!(stats.average_display(), "2.50");
        assert_eq!(stats.compound_probability_display(), "40.00%");
        assert_eq!(stats.basic_probability_display(), "28.57%");
    }

    #[test]
    fn test_resync_is_idempotent() {
        let dir = tempdir().unwrap();
        let config = config(dir.path());
        let log = FakeGachaLog::new("100000001")
            .with_draws(GachaCategory::Stellar, 12)
            .with_draws(GachaCategory::Character, 3);
        let fetcher = serve(log);
        let synchronizer = Synchronizer::new(&config, &fetcher);

        let first = synchronizer.sync(Some(SEED), &NoSeed).unwrap();
        let second = synchronizer.sync(Some(SEED), &NoSeed).unwrap();

        assert_eq!(first.inserted(), 15);
        assert_eq!(second.inserted(), 0);
        assert_eq!(second.history.total(), 15);
        let store = RecordStore::open_player(&config, "100000001").unwrap();
        assert_eq!(store.count(GachaCategory::Stellar).unwrap(), 12);
        assert_eq!(store.count(GachaCategory::Character).unwrap(), 3);
    }

    #[test]
    fn test_new_draws_are_appended_oldest_first() {
        let dir = tempdir().unwrap();
        let config = config(dir.path());

        let fetcher = serve(FakeGachaLog::new("100000001").with_draws(GachaCategory::Departure, 2));
        Synchronizer::new(&config, &fetcher)
            .sync(Some(SEED), &NoSeed)
            .unwrap();

        let fetcher = serve(FakeGachaLog::new("100000001").with_draws(GachaCategory::Departure, 5));
        let result = Synchronizer::new(&config, &fetcher)
            .sync(Some(SEED), &NoSeed)
            .unwrap();
        assert_eq!(result.reports[1].inserted, 3);

        let store = RecordStore::open_player(&config, "100000001").unwrap();
        let ids: Vec<String> = store
            .read_all(GachaCategory::Departure)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        let mut sorted = ids.clone();
        sorted.sort_by(|a, b| crate::gacha::compare_ids(a, b));
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_invalid_seed_is_fatal() {
        let dir = tempdir().unwrap();
        let config = config(dir.path());
        let fetcher = ScriptedFetcher::sequence(vec![Ok(FetchedPage::new(
            200,
            json!({"retcode": -101, "message": "authkey timeout", "data": null}),
        ))]);

        let err = Synchronizer::new(&config, &fetcher)
            .sync(Some(SEED), &NoSeed)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidApi(_)));
        assert!(err.to_string().contains(&InvalidPage::MissingData.to_string()));
        assert_eq!(fetcher.request_count(), 1);
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_no_records_is_fatal() {
        let dir = tempdir().unwrap();
        let config = config(dir.path());
        let fetcher = serve(FakeGachaLog::new("100000001"));

        let err = Synchronizer::new(&config, &fetcher)
            .sync(Some(SEED), &NoSeed)
            .unwrap_err();

        assert!(matches!(err, Error::NoRecords));
        // probe plus one empty page per category
        assert_eq!(fetcher.request_count(), 5);
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_seed_provider_used_without_api_url() {
        let dir = tempdir().unwrap();
        let config = config(dir.path());
        let fetcher = serve(FakeGachaLog::new("100000001"));

        let err = Synchronizer::new(&config, &fetcher)
            .sync(None, &NoSeed)
            .unwrap_err();

        assert!(matches!(err, Error::SeedUnavailable(_)));
        assert_eq!(fetcher.request_count(), 0);
    }

    #[test]
    fn test_truncated_category_keeps_gathered_pages() {
        let dir = tempdir().unwrap();
        let config = config(dir.path());
        let fetcher = ScriptedFetcher::new(|url| {
            let gacha_type = query_value(url, "gacha_type");
            let page_no = query_value(url, "page");
            match (gacha_type.as_deref(), page_no.as_deref()) {
                (Some("1"), Some("1")) => Ok(page(vec![
                    draw_json("20", "100000001", "1", "3", "a"),
                    draw_json("19", "100000001", "1", "4", "b"),
                ])),
                (Some("1"), Some("2")) => Ok(FetchedPage::new(500, json!({}))),
                _ => Ok(page(vec![])),
            }
        });

        let result = Synchronizer::new(&config, &fetcher)
            .sync(Some(SEED), &NoSeed)
            .unwrap();

        assert_eq!(
            result.reports[0].stop,
            StopReason::Invalid(InvalidPage::Status(500))
        );
        assert_eq!(result.reports[0].inserted, 2);
    }

    #[test]
    fn test_parallel_crawl_matches_sequential() {
        let dir = tempdir().unwrap();
        let config = WarpsyncConfig {
            parallel_crawl: true,
            ..config(dir.path())
        };
        let fetcher = serve(
            FakeGachaLog::new("100000001")
                .with_draws(GachaCategory::Stellar, 6)
                .with_draws(GachaCategory::LightCone, 11),
        );

        let result = Synchronizer::new(&config, &fetcher)
            .sync(Some(SEED), &NoSeed)
            .unwrap();

        let fetched: Vec<usize> = result.reports.iter().map(|r| r.fetched).collect();
        assert_eq!(fetched, vec![6, 0, 0, 11]);
        let order: Vec<GachaCategory> = result.reports.iter().map(|r| r.category).collect();
        assert_eq!(order, GachaCategory::ALL.to_vec());
    }
}
