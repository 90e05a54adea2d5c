use serde::{Deserialize, Serialize};

use crate::models::ListingFormat;

/// Ordered CSS selector chains, one per extracted field
///
/// Each chain is tried front to back and the first selector that matches
/// wins. Chains are plain data so they can be swapped when the site markup
/// changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorChains {
    pub listing_container: Vec<String>,
    pub title: Vec<String>,
    pub price: Vec<String>,
    pub link: Vec<String>,
    pub image: Vec<String>,
    pub time_left: Vec<String>,
    pub bids: Vec<String>,
    pub shipping: Vec<String>,
}

fn chain(selectors: &[&str]) -> Vec<String> {
    selectors.iter().map(|s| (*s).to_string()).collect()
}

impl Default for SelectorChains {
    fn default() -> Self {
        Self {
            listing_container: chain(&[
                "li.s-item",
                "div.s-item",
                r#"div[data-view="mi:1686"]"#,
                ".srp-results .s-item",
                r#"div[class*="s-item"]"#,
            ]),
            title: chain(&[
                r#"h3.s-item__title span[role="heading"]"#,
                "h3.s-item__title",
                "a.s-item__link span",
                ".s-item__title span",
                ".s-item__title",
                "h3",
            ]),
            price: chain(&[
                "span.s-item__price span.notranslate",
                "span.s-item__price",
                ".s-item__price .notranslate",
                ".s-item__price",
            ]),
            link: chain(&["a.s-item__link[href]", ".s-item__link[href]", "a[href]"]),
            image: chain(&["img.s-item__image-img", ".s-item__image img", "img"]),
            time_left: chain(&[
                "span.s-item__time-left",
                ".s-item__time-left",
                ".s-item__time-end",
            ]),
            bids: chain(&["span.s-item__bids", ".s-item__bidCount"]),
            shipping: chain(&["span.s-item__shipping", ".s-item__logisticsCost"]),
        }
    }
}

/// Keyword weights used by the relevance classifier
///
/// Keywords are matched as lowercase substrings; the strongest match wins
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordTable {
    pub weights: Vec<(String, f64)>,
}

impl KeywordTable {
    pub fn new<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            weights: weights
                .into_iter()
                .map(|(k, w)| (k.into().to_lowercase(), w))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, w)| (k.as_str(), *w))
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new([
            ("gameboy advance", 1.0),
            ("game boy advance", 1.0),
            ("gba", 0.9),
            ("gba sp", 1.0),
            ("advance sp", 1.0),
            ("gameboy sp", 0.9),
            ("game boy sp", 0.9),
            ("nintendo gba", 0.8),
            ("nintendo advance", 0.8),
            ("ags-001", 0.9),
            ("ags-101", 0.9),
            ("ags001", 0.9),
            ("ags101", 0.9),
            ("handheld console", 0.3),
            ("portable gaming", 0.2),
        ])
    }
}

/// Ordering applied to the pooled listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RankMode {
    /// Fewest minutes remaining first
    EndingSoonest,
    /// Most bids first
    MostActive,
    /// Cheapest total first
    BuyItNow,
    /// Highest confidence first
    #[default]
    Relevance,
}

/// How much per-listing detail to pull beyond the basic card fields
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Enrichment {
    /// Title, price, link, image and time only
    Basic,
    /// Adds bid count, shipping, lot detection and listing format
    #[default]
    Detailed,
}

/// Settings for [`Pipeline`](super::Pipeline)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Origin prepended to relative listing links
    pub base_url: String,
    pub selectors: SelectorChains,
    pub keywords: KeywordTable,
    /// Container selector must match more than this many elements to win
    pub min_container_matches: usize,
    pub max_listings_per_search: usize,
    pub max_total_listings: usize,
    pub min_title_length: usize,
    pub max_title_length: usize,
    pub relevance_threshold: f64,
    pub similarity_threshold: f64,
    /// Low-res token to high-res token, first match wins
    pub image_upgrades: Vec<(String, String)>,
    pub default_image: String,
    pub enrichment: Enrichment,
    /// Format assumed when the listing text gives no hint
    pub fallback_format: ListingFormat,
    /// Entries kept by the classification cache, 0 disables it
    pub cache_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.ebay.com".to_string(),
            selectors: SelectorChains::default(),
            keywords: KeywordTable::default(),
            min_container_matches: 2,
            max_listings_per_search: 20,
            max_total_listings: 100,
            min_title_length: 10,
            max_title_length: 120,
            relevance_threshold: 0.3,
            similarity_threshold: 0.85,
            image_upgrades: vec![
                ("s-l140".to_string(), "s-l400".to_string()),
                ("s-l225".to_string(), "s-l500".to_string()),
                ("s-l300".to_string(), "s-l640".to_string()),
            ],
            default_image: "https://via.placeholder.com/300x200/f8f9fa/6c757d?text=No+Image"
                .to_string(),
            enrichment: Enrichment::Detailed,
            fallback_format: ListingFormat::Unknown,
            cache_capacity: 1000,
        }
    }
}
