pub mod error;
pub mod extract;
pub mod models;
pub mod report;
pub mod scrapers;

pub use error::{ExtractError, FetchError};
pub use extract::{Pipeline, PipelineConfig, RankMode};
pub use models::{ListingFormat, ListingRecord, ScrapeReport};
