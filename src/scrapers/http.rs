use crate::error::FetchError;
use crate::scrapers::traits::Fetcher;
use crate::scrapers::types::ScrapeConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Plain HTTP transport with retry and exponential backoff
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl HttpFetcher {
    /// Create a fetcher with the run's timeout and retry settings
    pub fn new(config: &ScrapeConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries.max(1),
            base_delay: config.base_delay,
            max_delay: config.max_delay,
        })
    }

    /// Delay before retry number `attempt` (1-based)
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited(1));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!("Fetching URL (attempt {}): {}", attempt, url);

            let err = match self.fetch_once(url).await {
                Ok(html) => {
                    debug!("Downloaded {} bytes of HTML", html.len());
                    return Ok(html);
                }
                // Client errors other than 429 will not change on retry
                Err(FetchError::Status(code)) if (400..500).contains(&code) => {
                    return Err(FetchError::Status(code));
                }
                Err(err) => err,
            };

            if attempt >= self.max_retries {
                return Err(match err {
                    FetchError::RateLimited(_) => FetchError::RateLimited(attempt),
                    other => other,
                });
            }

            let delay = self.backoff(attempt);
            warn!("Attempt {} failed, retrying in {:?}: {}", attempt, delay, err);
            tokio::time::sleep(delay).await;
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let config = ScrapeConfig {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(1),
            ..ScrapeConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();
        assert_eq!(fetcher.backoff(1), Duration::from_millis(500));
        assert_eq!(fetcher.backoff(2), Duration::from_secs(1));
        assert_eq!(fetcher.backoff(5), Duration::from_secs(1));
    }
}
