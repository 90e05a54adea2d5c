use crate::error::FetchError;
use crate::scrapers::traits::Fetcher;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Browser-based transport using headless Chrome
/// Used for result pages that only render their listings client-side
pub struct BrowserFetcher {
    browser: Browser,
    settle: Duration,
}

impl BrowserFetcher {
    /// Launch headless Chrome
    pub fn new() -> Result<Self, FetchError> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .map_err(|e| FetchError::Browser(format!("Failed to build launch options: {e}")))?;

        let browser = Browser::new(options)
            .map_err(|e| FetchError::Browser(format!("Failed to launch Chrome browser: {e}")))?;

        Ok(Self {
            browser,
            settle: Duration::from_secs(3),
        })
    }

    /// How long to wait after navigation for scripts to populate the page
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

/// Navigate a fresh tab and return the rendered document markup
fn render(browser: &Browser, url: &str, settle: Duration) -> Result<String, FetchError> {
    let browser_err = |e: anyhow::Error| FetchError::Browser(e.to_string());

    let tab = browser.new_tab().map_err(browser_err)?;
    tab.navigate_to(url).map_err(browser_err)?;
    tab.wait_until_navigated().map_err(browser_err)?;

    // Wait for client-side rendering to finish
    thread::sleep(settle);

    let html_result = tab
        .evaluate("document.documentElement.outerHTML", false)
        .map_err(browser_err)?;
    let html = html_result
        .value
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    if let Err(e) = tab.close(true) {
        warn!("Could not close tab: {}", e);
    }

    if html.is_empty() {
        warn!("Could not get HTML from page");
    }
    Ok(html)
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("Opening {} in headless Chrome", url);
        let browser = self.browser.clone();
        let url = url.to_string();
        let settle = self.settle;

        let html = tokio::task::spawn_blocking(move || render(&browser, &url, settle)).await??;
        info!("Captured {} bytes of rendered HTML", html.len());
        Ok(html)
    }

    fn name(&self) -> &'static str {
        "headless-chrome"
    }
}
