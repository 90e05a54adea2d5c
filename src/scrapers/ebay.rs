use crate::error::ExtractError;
use crate::extract::Pipeline;
use crate::models::{ListingRecord, ScrapeReport};
use crate::scrapers::traits::Fetcher;
use crate::scrapers::types::{BuyingFormat, ScrapeConfig, SearchCategory};
use chrono::Utc;
use futures::future::join_all;
use std::collections::BTreeMap;
use tokio::sync::Semaphore;
use tracing::{info, warn};
use url::Url;

/// Build the eBay search URL for a category
pub fn search_url(base: &Url, category: &SearchCategory) -> String {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("_nkw", &category.query)
            .append_pair("_sop", &category.sort.to_string());
        match category.format {
            BuyingFormat::Auction => {
                query.append_pair("LH_Auction", "1");
            }
            BuyingFormat::BuyItNow => {
                query.append_pair("LH_BIN", "1");
            }
            BuyingFormat::Any => {}
        }
    }
    url.into()
}

/// Runs every configured search through a fetcher and the extraction pipeline
pub struct EbayScraper<F: Fetcher> {
    fetcher: F,
    pipeline: Pipeline,
    base: Url,
    config: ScrapeConfig,
}

impl<F: Fetcher> EbayScraper<F> {
    pub fn new(fetcher: F, config: ScrapeConfig) -> Result<Self, ExtractError> {
        let base = Url::parse(&config.search_url).map_err(|source| ExtractError::BaseUrl {
            url: config.search_url.clone(),
            source,
        })?;
        let pipeline = Pipeline::new(config.pipeline.clone())?;

        Ok(Self {
            fetcher,
            pipeline,
            base,
            config,
        })
    }

    /// Direct search links for every category, for the offline fallback page
    pub fn search_links(&self) -> Vec<(String, String)> {
        self.config
            .categories
            .iter()
            .map(|c| (c.name.clone(), search_url(&self.base, c)))
            .collect()
    }

    /// Fetch and extract one category. Transport failures yield no listings
    async fn scrape_category(&self, category: &SearchCategory) -> Vec<ListingRecord> {
        info!("Searching for: {}", category.query);
        let url = search_url(&self.base, category);

        let html = match self.fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("No content retrieved for {} via {}: {}", category.name, self.fetcher.name(), e);
                return Vec::new();
            }
        };

        let records: Vec<ListingRecord> = self
            .pipeline
            .process_page(&html)
            .into_iter()
            .map(|record| ListingRecord {
                category: Some(category.name.clone()),
                ..record
            })
            .collect();

        info!("{}: {} items found", category.name, records.len());
        records
    }

    /// Fetch all categories concurrently, results in category order
    async fn fetch_all(&self) -> Vec<(String, Vec<ListingRecord>)> {
        let permits = Semaphore::new(self.config.max_concurrent_requests.max(1));

        let tasks = self.config.categories.iter().map(|category| {
            let permits = &permits;
            async move {
                let _permit = permits.acquire().await.ok();
                (category.name.clone(), self.scrape_category(category).await)
            }
        });

        join_all(tasks).await
    }

    /// Scrape every category, then pool, deduplicate and rank the results
    pub async fn scrape_all(&self) -> ScrapeReport {
        info!(
            "Starting eBay scrape over {} categories via {}",
            self.config.categories.len(),
            self.fetcher.name()
        );

        let pooled: Vec<ListingRecord> = self
            .fetch_all()
            .await
            .into_iter()
            .flat_map(|(_, records)| records)
            .collect();
        let total_found = pooled.len();

        let (records, duplicates_removed) = self.pipeline.dedupe_and_rank(pooled, self.config.rank_mode);

        let mut per_category = BTreeMap::new();
        for record in &records {
            if let Some(category) = &record.category {
                *per_category.entry(category.clone()).or_insert(0) += 1;
            }
        }

        info!("Scraping complete! Found {} unique listings", records.len());

        ScrapeReport {
            records,
            total_found,
            duplicates_removed,
            per_category,
            generated_at: Utc::now(),
        }
    }

    /// Scrape every category and rank each one on its own with its own mode
    pub async fn scrape_by_category(&self) -> BTreeMap<String, Vec<ListingRecord>> {
        let modes: BTreeMap<&str, _> = self
            .config
            .categories
            .iter()
            .map(|c| (c.name.as_str(), c.rank_mode))
            .collect();

        self.fetch_all()
            .await
            .into_iter()
            .map(|(name, records)| {
                let mode = modes.get(name.as_str()).copied().unwrap_or_default();
                let (ranked, _) = self.pipeline.dedupe_and_rank(records, mode);
                (name, ranked)
            })
            .collect()
    }
}
