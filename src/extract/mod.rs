pub mod classifier;
pub mod config;
pub mod dedup;
pub mod locator;
pub mod normalizer;
pub mod ranker;

use std::sync::Arc;

use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};

use crate::error::ExtractError;
use crate::models::ListingRecord;

pub use classifier::{classify, Classification, ClassificationCache, Classifier};
pub use config::{Enrichment, KeywordTable, PipelineConfig, RankMode, SelectorChains};
pub use dedup::{dedupe, similarity};
pub use locator::{locate_field, locate_listings, CompiledChains, Field};
pub use normalizer::{Normalizer, NormalizerOptions, RawListing};
pub use ranker::rank;

/// Configured extraction pipeline, shareable across threads
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    chains: CompiledChains,
    classifier: Classifier,
    normalizer: Normalizer,
}

fn check_unit(name: &'static str, value: f64) -> Result<(), ExtractError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ExtractError::Threshold { name, value })
    }
}

impl Pipeline {
    /// Build a pipeline with its own classification cache (if enabled)
    pub fn new(config: PipelineConfig) -> Result<Self, ExtractError> {
        let cache = (config.cache_capacity > 0)
            .then(|| Arc::new(ClassificationCache::new(config.cache_capacity)));
        Self::build(config, cache)
    }

    /// Build a pipeline that shares an existing classification cache
    ///
    /// Pipelines with different keywords or cutoffs may share one cache
    pub fn with_cache(config: PipelineConfig, cache: Arc<ClassificationCache>) -> Result<Self, ExtractError> {
        Self::build(config, Some(cache))
    }

    fn build(config: PipelineConfig, cache: Option<Arc<ClassificationCache>>) -> Result<Self, ExtractError> {
        check_unit("relevance_threshold", config.relevance_threshold)?;
        check_unit("similarity_threshold", config.similarity_threshold)?;

        let chains = CompiledChains::compile(&config.selectors)?;
        let mut classifier = Classifier::new(
            config.keywords.clone(),
            config.min_title_length,
            config.relevance_threshold,
        );
        if let Some(cache) = cache {
            classifier = classifier.with_cache(cache);
        }
        let normalizer = Normalizer::new(NormalizerOptions {
            base_url: config.base_url.clone(),
            min_title_length: config.min_title_length,
            max_title_length: config.max_title_length,
            image_upgrades: config.image_upgrades.clone(),
            default_image: config.default_image.clone(),
            enrichment: config.enrichment,
            fallback_format: config.fallback_format,
        })?;

        Ok(Self {
            config,
            chains,
            classifier,
            normalizer,
        })
    }

    /// Extract every relevant listing from one search-result page
    ///
    /// Empty or unrecognisable markup yields an empty vec
    pub fn process_page(&self, raw_markup: &str) -> Vec<ListingRecord> {
        if raw_markup.trim().is_empty() {
            warn!("Empty page content, no listings extracted");
            return Vec::new();
        }

        let document = Html::parse_document(raw_markup);
        let containers = locate_listings(&document, &self.chains, self.config.min_container_matches);
        if containers.is_empty() {
            warn!("No listing containers found");
            return Vec::new();
        }
        debug!("Found {} raw listings", containers.len());

        let records: Vec<ListingRecord> = containers
            .into_iter()
            .take(self.config.max_listings_per_search)
            .filter(|el| {
                let sponsored = locator::is_sponsored(*el);
                if sponsored {
                    debug!("Skipping sponsored listing");
                }
                !sponsored
            })
            .filter_map(|el| self.process_listing(el))
            .collect();

        info!("Extracted {} relevant listings", records.len());
        records
    }

    fn process_listing(&self, element: ElementRef<'_>) -> Option<ListingRecord> {
        let raw = self.read_fields(element);
        let title = self.normalizer.clean_title(raw.title.as_deref()?)?;

        let verdict = self.classifier.classify(&title);
        if !verdict.is_relevant {
            debug!("Rejected '{}' (confidence {:.2})", title, verdict.confidence);
            return None;
        }
        Some(self.normalizer.assemble(title, &raw, verdict.confidence))
    }

    fn read_fields(&self, element: ElementRef<'_>) -> RawListing {
        let text_of = |field: Field| {
            locate_field(element, field, &self.chains)
                .map(locator::element_text)
                .filter(|t| !t.is_empty())
        };
        let attr_of = |field: Field, names: &[&str]| {
            let found = locate_field(element, field, &self.chains)?;
            names
                .iter()
                .find_map(|name| found.value().attr(name).filter(|v| !v.trim().is_empty()))
                .map(str::to_string)
        };

        RawListing {
            title: text_of(Field::Title),
            price: text_of(Field::Price),
            link: attr_of(Field::Link, &["href"]),
            image: attr_of(Field::Image, &["src", "data-src"]),
            time_left: text_of(Field::TimeLeft),
            bids: text_of(Field::Bids),
            shipping: text_of(Field::Shipping),
            text: locator::element_text(element),
        }
    }

    /// Deduplicate the pooled records of a run and rank them
    ///
    /// Also returns how many records deduplication removed
    pub fn dedupe_and_rank(&self, all_records: Vec<ListingRecord>, mode: RankMode) -> (Vec<ListingRecord>, usize) {
        let before = all_records.len();
        let unique = dedupe(all_records, self.config.similarity_threshold);
        let removed = before - unique.len();
        if removed > 0 {
            info!("Removed {} duplicate listings", removed);
        }
        (rank(unique, mode, self.config.max_total_listings), removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let config = PipelineConfig {
            similarity_threshold: 1.5,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            Pipeline::new(config),
            Err(ExtractError::Threshold { name: "similarity_threshold", .. })
        ));
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let config = PipelineConfig {
            base_url: "/ebay".to_string(),
            ..PipelineConfig::default()
        };
        assert!(matches!(Pipeline::new(config), Err(ExtractError::BaseUrl { .. })));
    }

    #[test]
    fn non_html_yields_nothing() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        assert!(pipeline.process_page("").is_empty());
        assert!(pipeline.process_page("{\"error\": \"blocked\"}").is_empty());
    }

    #[test]
    fn pipeline_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();
    }
}
