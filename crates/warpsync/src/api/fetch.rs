use serde_json::Value;
use url::Url;

use crate::error::Result;

/// Raw outcome of one HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,
    /// Decoded JSON body, `None` when the body was not valid JSON
    pub body: Option<Value>,
}

impl FetchedPage {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }
}

/// Transport used by the crawler.
///
/// Implementations report transport failures as `Err`; any response that
/// arrived, whatever its status, is `Ok`.
pub trait PageFetcher {
    fn fetch(&self, url: &Url) -> Result<FetchedPage>;
}

impl<T: PageFetcher + ?Sized> PageFetcher for &T {
    fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        (**self).fetch(url)
    }
}
