use url::Url;

use crate::error::Result;
use crate::gacha::GachaCategory;

/// Query keys that change from one request to the next
const REQUEST_KEYS: [&str; 4] = ["end_id", "gacha_type", "page", "size"];

/// Keys removed from a seed URL when deriving the template
const SEED_ONLY_KEYS: [&str; 5] = ["begin_id", "end_id", "gacha_type", "page", "size"];

/// Reusable API URL: the seed URL with every per-request parameter removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiTemplate {
    url: Url,
}

impl ApiTemplate {
    /// Derive a template from a seed URL.
    ///
    /// Stray backslashes are stripped from keys and values first; seed URLs
    /// copied out of the game's web cache often carry them.
    pub fn from_seed(seed: &str) -> Result<Self> {
        let mut url = Url::parse(seed.trim())?;
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.replace('\\', ""), v.replace('\\', "")))
            .filter(|(k, _)| !SEED_ONLY_KEYS.contains(&k.as_str()))
            .collect();
        set_query(&mut url, &pairs);

        Ok(Self { url })
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// Build the URL for one page request.
    pub fn request_url(&self, end_id: &str, category: GachaCategory, page: u32, size: u32) -> Url {
        let mut url = self.url.clone();
        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !REQUEST_KEYS.contains(&k.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        pairs.push(("end_id".to_string(), end_id.to_string()));
        pairs.push(("gacha_type".to_string(), category.code().to_string()));
        pairs.push(("page".to_string(), page.to_string()));
        pairs.push(("size".to_string(), size.to_string()));
        set_query(&mut url, &pairs);
        url
    }
}

fn set_query(url: &mut Url, pairs: &[(String, String)]) {
    if pairs.is_empty() {
        url.set_query(None);
        return;
    }
    url.query_pairs_mut().clear().extend_pairs(pairs.iter());
}

/// First value of a query key.
pub fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
