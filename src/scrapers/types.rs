use crate::extract::{PipelineConfig, RankMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// eBay buying-format filter applied to a search
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BuyingFormat {
    Auction,
    BuyItNow,
    Any,
}

/// How search pages are fetched
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Http,
    /// Headless Chrome, for pages that render listings client-side
    Browser,
}

/// One search the orchestrator runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCategory {
    /// Name shown in the report
    pub name: String,
    /// Free-text query
    pub query: String,
    /// eBay sort order code (`_sop`)
    pub sort: u8,
    pub format: BuyingFormat,
    /// Ordering applied when this category is ranked on its own
    pub rank_mode: RankMode,
}

impl SearchCategory {
    pub fn new(name: &str, query: &str, sort: u8, format: BuyingFormat, rank_mode: RankMode) -> Self {
        Self {
            name: name.to_string(),
            query: query.to_string(),
            sort,
            format,
            rank_mode,
        }
    }

    /// Categories scraped when none are configured
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("Ending Soonest", "gameboy advance", 1, BuyingFormat::Auction, RankMode::EndingSoonest),
            Self::new("Most Bid On", "gameboy advance", 12, BuyingFormat::Auction, RankMode::MostActive),
            Self::new(
                "Large Lots",
                "gameboy advance lot bundle collection",
                1,
                BuyingFormat::Any,
                RankMode::Relevance,
            ),
            Self::new("Buy It Now", "gameboy advance", 15, BuyingFormat::BuyItNow, RankMode::BuyItNow),
        ]
    }
}

/// Settings for a full scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Search endpoint
    pub search_url: String,
    pub transport: Transport,
    pub categories: Vec<SearchCategory>,
    /// Ordering of the pooled report
    pub rank_mode: RankMode,
    /// Upper bound on simultaneous page fetches
    pub max_concurrent_requests: usize,
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub request_timeout: Duration,
    /// Wait after navigation before reading a browser-rendered page
    pub browser_settle: Duration,
    pub pipeline: PipelineConfig,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            search_url: "https://www.ebay.com/sch/i.html".to_string(),
            transport: Transport::Http,
            categories: SearchCategory::defaults(),
            rank_mode: RankMode::Relevance,
            max_concurrent_requests: 4,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            browser_settle: Duration::from_secs(3),
            pipeline: PipelineConfig::default(),
        }
    }
}
