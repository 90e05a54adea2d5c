pub mod browser;
pub mod ebay;
pub mod http;
pub mod traits;
pub mod types;

pub use browser::BrowserFetcher;
pub use ebay::{search_url, EbayScraper};
pub use http::HttpFetcher;
pub use traits::Fetcher;
pub use types::{BuyingFormat, ScrapeConfig, SearchCategory, Transport};
