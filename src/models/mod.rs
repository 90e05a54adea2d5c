use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display text used when a listing carries no price
pub const PRICE_NOT_AVAILABLE: &str = "Price not available";

/// Display text used when a listing carries no time-remaining element
pub const TIME_NOT_SPECIFIED: &str = "Time not specified";

/// Link used when a listing has no extractable href
pub const MISSING_LINK: &str = "#";

/// Sort key for listings whose remaining time could not be parsed
pub const UNKNOWN_MINUTES: u32 = u32::MAX;

/// How the listing is being sold
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ListingFormat {
    Auction,
    BuyItNow,
    #[default]
    Unknown,
}

impl ListingFormat {
    pub fn label(self) -> &'static str {
        match self {
            Self::Auction => "Auction",
            Self::BuyItNow => "Buy It Now",
            Self::Unknown => "Unknown",
        }
    }
}

/// One normalized, classified search result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub title: String,
    pub price: String,
    pub link: String,
    pub image: String,
    pub time_left: String,
    /// Minutes remaining, `None` when the display text could not be parsed
    pub time_minutes: Option<u32>,
    pub confidence: f64,
    pub identity_key: String,
    pub bid_count: u32,
    pub is_lot: bool,
    pub format: ListingFormat,
    pub shipping: Option<f64>,
    pub total_price: String,
    pub total_value: f64,
    pub category: Option<String>,
}

impl ListingRecord {
    /// Exact-duplicate key: title and price, lowercased, with every whitespace
    /// character removed
    pub fn identity_key_for(title: &str, price: &str) -> String {
        title
            .chars()
            .chain(price.chars())
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    }

    /// Minutes remaining with unknown values pushed to the end
    pub fn sort_minutes(&self) -> u32 {
        self.time_minutes.unwrap_or(UNKNOWN_MINUTES)
    }
}

/// Result of a full scrape run, handed to the report renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub records: Vec<ListingRecord>,
    /// Relevant listings produced by all pages before deduplication
    pub total_found: usize,
    pub duplicates_removed: usize,
    pub per_category: BTreeMap<String, usize>,
    pub generated_at: DateTime<Utc>,
}

impl ScrapeReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
