/// Pipeline construction failed
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Every selector in a chain failed to parse
    #[error("no usable selector in the {0} chain")]
    EmptyChain(&'static str),

    /// Base URL for link resolution is not absolute
    #[error("invalid base url '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A threshold lies outside `[0, 1]`
    #[error("{name} must be within [0, 1], got {value}")]
    Threshold { name: &'static str, value: f64 },

    /// A built-in pattern failed to compile
    #[error("pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

/// Fetching a search page failed
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("rate limited after {0} attempts")]
    RateLimited(u32),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
