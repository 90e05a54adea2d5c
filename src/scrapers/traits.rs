use crate::error::FetchError;
use async_trait::async_trait;

/// Source of raw search-result markup
/// Lets the orchestrator swap plain HTTP for a headless browser, or an
/// in-memory stub in tests
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the page at `url` and return its markup
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Get the name of the transport
    fn name(&self) -> &'static str;
}
