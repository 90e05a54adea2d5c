use regex::Regex;
use url::Url;

use super::config::Enrichment;
use crate::error::ExtractError;
use crate::models::{
    ListingFormat, ListingRecord, MISSING_LINK, PRICE_NOT_AVAILABLE, TIME_NOT_SPECIFIED,
};

/// Substrings eBay injects into titles that carry no meaning
const TITLE_BOILERPLATE: &[&str] = &[
    "Shop on eBay",
    "New Listing",
    "Opens in a new window or tab",
    "SPONSORED",
];

const LOT_WORDS: &[&str] = &[
    "lot",
    "lots",
    "bundle",
    "bundles",
    "collection",
    "bulk",
    "multiple",
    "games",
    "accessories",
];

const ELLIPSIS: &str = "...";

/// Text pulled out of one listing container, before any cleanup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawListing {
    pub title: Option<String>,
    pub price: Option<String>,
    pub link: Option<String>,
    pub image: Option<String>,
    pub time_left: Option<String>,
    pub bids: Option<String>,
    pub shipping: Option<String>,
    /// Whole container text, used by the enrichment heuristics
    pub text: String,
}

/// Strip boilerplate, collapse whitespace and truncate
///
/// Returns `None` when fewer than `min_len` characters survive
pub fn clean_title(raw: &str, min_len: usize, max_len: usize) -> Option<String> {
    let mut title = raw.to_string();
    for junk in TITLE_BOILERPLATE {
        title = title.replace(junk, "");
    }
    let mut title = title.split_whitespace().collect::<Vec<_>>().join(" ");

    if title.chars().count() > max_len {
        let keep = max_len.saturating_sub(ELLIPSIS.len());
        title = title.chars().take(keep).collect::<String>();
        title.push_str(ELLIPSIS);
    }

    (title.chars().count() >= min_len).then_some(title)
}

/// Collapse whitespace; missing or blank prices become [`PRICE_NOT_AVAILABLE`]
pub fn format_price(raw: Option<&str>) -> String {
    let collapsed = raw
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    if collapsed.is_empty() {
        PRICE_NOT_AVAILABLE.to_string()
    } else {
        collapsed
    }
}

/// Make `href` absolute against `base`; missing links become [`MISSING_LINK`]
pub fn resolve_link(href: Option<&str>, base: &Url) -> String {
    let Some(href) = href.map(str::trim).filter(|h| !h.is_empty()) else {
        return MISSING_LINK.to_string();
    };
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    base.join(href)
        .map(String::from)
        .unwrap_or_else(|_| MISSING_LINK.to_string())
}

/// Swap the first known low-res token for its high-res counterpart, once
pub fn upgrade_image(src: Option<&str>, upgrades: &[(String, String)], default: &str) -> String {
    let Some(src) = src.map(str::trim).filter(|s| !s.is_empty()) else {
        return default.to_string();
    };
    upgrades
        .iter()
        .find(|(low, _)| src.contains(low.as_str()))
        .map_or_else(
            || src.to_string(),
            |(low, high)| src.replacen(low.as_str(), high, 1),
        )
}

/// Whether the title describes a lot or bundle rather than a single item
pub fn is_lot(title: &str) -> bool {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| LOT_WORDS.contains(&word))
}

/// Guess the selling format from the listing text
pub fn detect_format(text: &str, fallback: ListingFormat) -> ListingFormat {
    let lower = text.to_lowercase();
    if lower.contains("bid") || lower.contains("auction") {
        ListingFormat::Auction
    } else if lower.contains("buy it now") {
        ListingFormat::BuyItNow
    } else {
        fallback
    }
}

/// Regex-backed parsing of time, bids, shipping and price figures
#[derive(Debug, Clone)]
pub struct Normalizer {
    base: Url,
    min_title_length: usize,
    max_title_length: usize,
    image_upgrades: Vec<(String, String)>,
    default_image: String,
    enrichment: Enrichment,
    fallback_format: ListingFormat,
    days: Regex,
    hours: Regex,
    minutes: Regex,
    bid_patterns: Vec<Regex>,
    first_number: Regex,
    shipping_patterns: Vec<Regex>,
    price_number: Regex,
}

/// Normalizer settings, split out of the pipeline config
#[derive(Debug, Clone)]
pub struct NormalizerOptions {
    pub base_url: String,
    pub min_title_length: usize,
    pub max_title_length: usize,
    pub image_upgrades: Vec<(String, String)>,
    pub default_image: String,
    pub enrichment: Enrichment,
    pub fallback_format: ListingFormat,
}

impl Normalizer {
    pub fn new(options: NormalizerOptions) -> Result<Self, ExtractError> {
        let base = Url::parse(&options.base_url).map_err(|source| ExtractError::BaseUrl {
            url: options.base_url.clone(),
            source,
        })?;

        Ok(Self {
            base,
            min_title_length: options.min_title_length,
            max_title_length: options.max_title_length,
            image_upgrades: options.image_upgrades,
            default_image: options.default_image,
            enrichment: options.enrichment,
            fallback_format: options.fallback_format,
            days: Regex::new(r"(\d+)\s*d")?,
            hours: Regex::new(r"(\d+)\s*h")?,
            minutes: Regex::new(r"(\d+)\s*m")?,
            bid_patterns: vec![
                Regex::new(r"(\d+)\s*bids?\b")?,
                Regex::new(r"(\d+)\s*bidders?\b")?,
            ],
            first_number: Regex::new(r"\d+")?,
            shipping_patterns: vec![
                Regex::new(r"(?i)\+\s*\$(\d+(?:\.\d+)?)\s*shipping")?,
                Regex::new(r"(?i)shipping:\s*\$(\d+(?:\.\d+)?)")?,
                Regex::new(r"(?i)\$(\d+(?:\.\d+)?)\s*ship")?,
                Regex::new(r"(?i)ships?\s*for\s*\$(\d+(?:\.\d+)?)")?,
            ],
            price_number: Regex::new(r"\$?\s*(\d[\d,]*(?:\.\d+)?)")?,
        })
    }

    pub fn clean_title(&self, raw: &str) -> Option<String> {
        clean_title(raw, self.min_title_length, self.max_title_length)
    }

    /// Parse remaining auction time into minutes
    ///
    /// Days win over hours, hours over minutes. Unparseable text keeps its
    /// display form and yields `None`
    pub fn parse_time_left(&self, raw: Option<&str>) -> (String, Option<u32>) {
        let Some(display) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
            return (TIME_NOT_SPECIFIED.to_string(), None);
        };
        let lower = display.to_lowercase();

        let units: [(&Regex, u32); 3] = [(&self.days, 24 * 60), (&self.hours, 60), (&self.minutes, 1)];
        let minutes = units.iter().find_map(|(pattern, scale)| {
            let count: u32 = pattern.captures(&lower)?.get(1)?.as_str().parse().ok()?;
            Some(count.saturating_mul(*scale))
        });

        (display.to_string(), minutes)
    }

    pub fn bid_count(&self, text: &str, bids_field: Option<&str>) -> u32 {
        let lower = text.to_lowercase();
        self.bid_patterns
            .iter()
            .find_map(|p| p.captures(&lower)?.get(1)?.as_str().parse().ok())
            .or_else(|| {
                self.first_number
                    .find(bids_field?)
                    .and_then(|m| m.as_str().parse().ok())
            })
            .unwrap_or(0)
    }

    /// Shipping cost, `Some(0.0)` for free shipping, `None` when not stated
    pub fn shipping_cost(&self, text: &str) -> Option<f64> {
        self.shipping_patterns
            .iter()
            .find_map(|p| p.captures(text)?.get(1)?.as_str().parse().ok())
            .or_else(|| text.to_lowercase().contains("free shipping").then_some(0.0))
    }

    /// First number in a price string, thousands separators removed
    pub fn price_value(&self, price: &str) -> Option<f64> {
        let caps = self.price_number.captures(price)?;
        caps.get(1)?.as_str().replace(',', "").parse().ok()
    }

    /// Display text and numeric value of price plus shipping
    pub fn total_price(&self, price: &str, shipping: Option<f64>) -> (String, f64) {
        let Some(base) = self.price_value(price) else {
            return (price.to_string(), 0.0);
        };
        match shipping {
            Some(ship) if ship == 0.0 => (format!("${base:.2} (Free Ship)"), base),
            Some(ship) => {
                let total = base + ship;
                (format!("${total:.2} (+${ship:.2} ship)"), total)
            }
            None => (format!("${base:.2} (Ship TBD)"), base),
        }
    }

    /// Build the record from an already cleaned and classified title
    pub fn assemble(&self, title: String, raw: &RawListing, confidence: f64) -> ListingRecord {
        let price = format_price(raw.price.as_deref());
        let link = resolve_link(raw.link.as_deref(), &self.base);
        let image = upgrade_image(raw.image.as_deref(), &self.image_upgrades, &self.default_image);
        let (time_left, time_minutes) = self.parse_time_left(raw.time_left.as_deref());
        let identity_key = ListingRecord::identity_key_for(&title, &price);

        let (bid_count, is_lot, format, shipping) = match self.enrichment {
            Enrichment::Basic => (0, false, self.fallback_format, None),
            Enrichment::Detailed => {
                let shipping_text = raw.shipping.as_deref().unwrap_or(&raw.text);
                (
                    self.bid_count(&raw.text, raw.bids.as_deref()),
                    is_lot(&title),
                    detect_format(&raw.text, self.fallback_format),
                    self.shipping_cost(shipping_text),
                )
            }
        };
        let (total_price, total_value) = match self.enrichment {
            Enrichment::Basic => (price.clone(), self.price_value(&price).unwrap_or(0.0)),
            Enrichment::Detailed => self.total_price(&price, shipping),
        };

        ListingRecord {
            title,
            price,
            link,
            image,
            time_left,
            time_minutes,
            confidence,
            identity_key,
            bid_count,
            is_lot,
            format,
            shipping,
            total_price,
            total_value,
            category: None,
        }
    }
}
