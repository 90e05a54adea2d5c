use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::config::KeywordTable;

/// Default cutoff: a title is relevant when its confidence exceeds this
pub const RELEVANCE_THRESHOLD: f64 = 0.3;

/// Default minimum title length, in characters
pub const MIN_TITLE_LENGTH: usize = 10;

const COMPOUND_CONFIDENCE: f64 = 0.7;
const MODEL_NUMBER_CONFIDENCE: f64 = 0.9;

/// Search-page widgets (filters, facets) whose labels look like short titles
const NON_LISTING_TERMS: &[&str] = &[
    "apply",
    "filter",
    "region code",
    "brand",
    "condition",
    "price range",
    "buying format",
];

/// Hardware model identifiers, written without hyphens
const MODEL_NUMBERS: &[&str] = &["ags001", "ags101"];

/// Outcome of scoring one title
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub is_relevant: bool,
    pub confidence: f64,
}

impl Classification {
    const REJECTED: Self = Self {
        is_relevant: false,
        confidence: 0.0,
    };
}

/// Score a title with the default length and relevance cutoffs
pub fn classify(title: &str, keywords: &KeywordTable) -> Classification {
    score(title, keywords, MIN_TITLE_LENGTH, RELEVANCE_THRESHOLD)
}

fn score(title: &str, keywords: &KeywordTable, min_len: usize, threshold: f64) -> Classification {
    let trimmed = title.trim();
    if trimmed.chars().count() < min_len {
        return Classification::REJECTED;
    }

    let lower = trimmed.to_lowercase();
    if NON_LISTING_TERMS.iter().any(|term| lower.contains(term)) {
        return Classification::REJECTED;
    }

    let mut confidence = keywords
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .map(|(_, weight)| weight)
        .fold(0.0_f64, f64::max);

    // " sp " must stand alone, so pad the ends before looking for it.
    let padded = format!(" {lower} ");
    if lower.contains("nintendo") && (lower.contains("advance") || padded.contains(" sp ")) {
        confidence = confidence.max(COMPOUND_CONFIDENCE);
    }

    let unhyphenated = lower.replace('-', "");
    if MODEL_NUMBERS.iter().any(|m| unhyphenated.contains(m)) {
        confidence = confidence.max(MODEL_NUMBER_CONFIDENCE);
    }

    let confidence = confidence.clamp(0.0, 1.0);
    Classification {
        is_relevant: confidence > threshold,
        confidence,
    }
}

/// Identifies the keyword table and cutoffs a cached verdict was scored with
fn fingerprint(keywords: &KeywordTable, min_len: usize, threshold: f64) -> u64 {
    let mut hasher = DefaultHasher::new();
    for (keyword, weight) in keywords.iter() {
        keyword.hash(&mut hasher);
        weight.to_bits().hash(&mut hasher);
    }
    min_len.hash(&mut hasher);
    threshold.to_bits().hash(&mut hasher);
    hasher.finish()
}

/// Bounded memo of classification results
///
/// Entries are keyed by classifier fingerprint and title, so classifiers with
/// different keywords or cutoffs can share one cache without seeing each
/// other's verdicts. Once full, new results are computed but not stored
#[derive(Debug)]
pub struct ClassificationCache {
    capacity: usize,
    entries: RwLock<HashMap<(u64, String), Classification>>,
}

impl ClassificationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(HashMap::with_capacity(capacity.min(1024))),
        }
    }

    fn get(&self, fingerprint: u64, title: &str) -> Option<Classification> {
        let entries = self.entries.read().ok()?;
        entries.get(&(fingerprint, title.to_string())).copied()
    }

    fn insert(&self, fingerprint: u64, title: &str, value: Classification) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };
        if entries.len() < self.capacity {
            entries.insert((fingerprint, title.to_string()), value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Relevance classifier bound to a keyword table and cutoffs
#[derive(Debug, Clone)]
pub struct Classifier {
    keywords: KeywordTable,
    min_title_length: usize,
    threshold: f64,
    fingerprint: u64,
    cache: Option<Arc<ClassificationCache>>,
}

impl Classifier {
    pub fn new(keywords: KeywordTable, min_title_length: usize, threshold: f64) -> Self {
        let fingerprint = fingerprint(&keywords, min_title_length, threshold);
        Self {
            keywords,
            min_title_length,
            threshold,
            fingerprint,
            cache: None,
        }
    }

    /// Share a cache between classifiers, e.g. across pipelines built for
    /// different search categories
    pub fn with_cache(mut self, cache: Arc<ClassificationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn classify(&self, title: &str) -> Classification {
        if let Some(hit) = self
            .cache
            .as_ref()
            .and_then(|c| c.get(self.fingerprint, title))
        {
            debug!("Classification cache hit for '{}'", title);
            return hit;
        }

        let result = score(title, &self.keywords, self.min_title_length, self.threshold);
        if let Some(cache) = &self.cache {
            cache.insert(self.fingerprint, title, result);
        }
        result
    }
}
