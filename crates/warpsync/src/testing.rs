//! Fixtures shared by the unit tests.

use std::sync::Mutex;

use serde_json::{Value, json};
use url::Url;

use crate::api::{FetchedPage, PageFetcher, query_value};
use crate::error::{Error, Result};
use crate::gacha::{DrawRecord, GachaCategory, compare_ids};

/// A stored-shape draw with fixed metadata.
pub fn draw(id: &str, rank_type: &str, name: &str) -> DrawRecord {
    DrawRecord {
        id: id.to_string(),
        uid: "100000001".to_string(),
        gacha_id: "1001".to_string(),
        gacha_type: "1".to_string(),
        item_id: "20000".to_string(),
        count: "1".to_string(),
        time: "2023-06-01 12:00:00".to_string(),
        name: name.to_string(),
        lang: "en-us".to_string(),
        item_type: if rank_type == "3" { "Light Cone" } else { "Character" }.to_string(),
        rank_type: rank_type.to_string(),
        region: String::new(),
        region_time_zone: String::new(),
    }
}

/// One API list item.
pub fn draw_json(id: &str, uid: &str, gacha_type: &str, rank_type: &str, name: &str) -> Value {
    json!({
        "uid": uid,
        "gacha_id": "1001",
        "gacha_type": gacha_type,
        "item_id": "20000",
        "count": "1",
        "time": "2023-06-01 12:00:00",
        "name": name,
        "lang": "en-us",
        "item_type": "Light Cone",
        "rank_type": rank_type,
        "id": id
    })
}

/// A successful response carrying `items`.
pub fn page(items: Vec<Value>) -> FetchedPage {
    FetchedPage::new(
        200,
        json!({
            "retcode": 0,
            "message": "OK",
            "data": {
                "page": "1",
                "size": items.len().to_string(),
                "list": items,
                "region": "prod_gf_cn",
                "region_time_zone": 8
            }
        }),
    )
}

type Responder = Box<dyn Fn(&Url) -> Result<FetchedPage> + Send + Sync>;

/// Fetcher answering from a closure or a fixed script, recording every URL.
pub struct ScriptedFetcher {
    responder: Responder,
    requests: Mutex<Vec<Url>>,
}

impl ScriptedFetcher {
    pub fn new<R>(responder: R) -> Self
    where
        R: Fn(&Url) -> Result<FetchedPage> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer the n-th request with the n-th response; fail once exhausted.
    pub fn sequence(responses: Vec<Result<FetchedPage>>) -> Self {
        let script = Mutex::new(responses.into_iter());
        Self::new(move |_| {
            script
                .lock()
                .unwrap()
                .next()
                .unwrap_or_else(|| Err(Error::NetworkError("script exhausted".to_string())))
        })
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl PageFetcher for ScriptedFetcher {
    fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        self.requests.lock().unwrap().push(url.clone());
        (self.responder)(url)
    }
}

/// In-memory gacha log endpoint honoring `gacha_type`, `end_id` and `size`.
#[derive(Debug, Clone)]
pub struct FakeGachaLog {
    uid: String,
    /// Newest first, per category
    draws: Vec<(GachaCategory, Vec<Value>)>,
}

impl FakeGachaLog {
    pub fn new(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            draws: Vec::new(),
        }
    }

    /// `n` three-star draws.
    pub fn with_draws(self, category: GachaCategory, n: usize) -> Self {
        let ranks = vec!["3"; n];
        self.with_ranks(category, &ranks)
    }

    /// Draws with the given rarities, newest first.
    ///
    /// The draw at ordinal `k` (1 = oldest) is named `<table>-<k>`.
    pub fn with_ranks(mut self, category: GachaCategory, ranks: &[&str]) -> Self {
        let total = ranks.len();
        let prefix = category.table_name().to_lowercase();
        let items = ranks
            .iter()
            .enumerate()
            .map(|(i, rank)| {
                let ordinal = total - i;
                let id = (category.code() as u64 * 1_000_000 + ordinal as u64).to_string();
                draw_json(
                    &id,
                    &self.uid,
                    &category.code().to_string(),
                    rank,
                    &format!("{}-{}", prefix, ordinal),
                )
            })
            .collect();
        self.draws.retain(|(c, _)| *c != category);
        self.draws.push((category, items));
        self
    }

    pub fn respond(&self, url: &Url) -> FetchedPage {
        let Some(category) = query_value(url, "gacha_type")
            .as_deref()
            .and_then(GachaCategory::from_gacha_type)
        else {
            return FetchedPage::new(200, json!({"retcode": -1, "data": null}));
        };
        let size: usize = query_value(url, "size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);
        let end_id = query_value(url, "end_id").unwrap_or_else(|| "0".to_string());

        let items: &[Value] = self
            .draws
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[]);

        let page_items = items
            .iter()
            .filter(|item| {
                end_id == "0"
                    || compare_ids(item["id"].as_str().unwrap_or("0"), &end_id).is_lt()
            })
            .take(size)
            .cloned()
            .collect();
        page(page_items)
    }
}
