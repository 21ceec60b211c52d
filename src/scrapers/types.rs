use crate::models::Details;
use std::time::Duration;

/// HTTP client settings for page fetching
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Fields pulled out of a listing page before normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawListing {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    /// Amount already digit-stripped from the price element
    pub price: u64,
    pub details: Details,
    /// Individual tag labels, joined by the normalizer
    pub tags: Option<Vec<String>>,
    pub planimetry_photos: u32,
    pub video: u32,
    pub photos: u32,
    pub address: Option<String>,
}
