use crate::scrapers::error::FetchError;
use async_trait::async_trait;

/// Retrieves raw page markup.
/// Implemented over HTTP for real runs and over a fixed map in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `url`; non-success responses are errors
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
