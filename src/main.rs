use anyhow::Context;
use gba_scout::models::ScrapeReport;
use gba_scout::report;
use gba_scout::scrapers::{BrowserFetcher, EbayScraper, Fetcher, HttpFetcher, ScrapeConfig, Transport};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const OUTPUT_DIR: &str = "output";

async fn run<F: Fetcher>(fetcher: F, config: ScrapeConfig) -> anyhow::Result<()> {
    let scraper = EbayScraper::new(fetcher, config).context("Invalid scraper configuration")?;
    let report = scraper.scrape_all().await;

    print_summary(&report);
    tokio::fs::create_dir_all(OUTPUT_DIR).await?;

    // Save records as JSON
    let json = serde_json::to_string_pretty(&report)?;
    let json_path = format!("{OUTPUT_DIR}/gba_listings.json");
    tokio::fs::write(&json_path, json)
        .await
        .with_context(|| format!("Failed to write {json_path}"))?;
    info!("💾 Saved listings to {}", json_path);

    let html = if report.is_empty() {
        warn!("No listings found, writing direct search links instead");
        report::render_fallback_html(&scraper.search_links(), report.generated_at)
    } else {
        report::render_html(&report)
    };
    let html_path = format!("{OUTPUT_DIR}/gba_auctions.html");
    tokio::fs::write(&html_path, html)
        .await
        .with_context(|| format!("Failed to write {html_path}"))?;
    info!("💾 Saved report to {}", html_path);

    Ok(())
}

fn print_summary(report: &ScrapeReport) {
    info!("\n✅ Found {} unique listings\n", report.records.len());

    for (category, count) in &report.per_category {
        println!("📊 {}: {} items", category, count);
    }
    for (i, listing) in report.records.iter().take(5).enumerate() {
        println!("{}. {} - {}", i + 1, listing.title, listing.total_price);
        println!(
            "   {} | ⏰ {} | 🔨 {} bids | confidence {:.2}",
            listing.format.label(),
            listing.time_left,
            listing.bid_count,
            listing.confidence
        );
        println!("   URL: {}", listing.link);
        println!();
    }
    if report.records.len() > 5 {
        println!("... and {} more", report.records.len() - 5);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🎮 GBA Scout - eBay GameBoy Advance listings");
    info!("=============================================");

    let config = ScrapeConfig::default();
    match config.transport {
        Transport::Http => {
            let fetcher = HttpFetcher::new(&config).context("Failed to create HTTP client")?;
            run(fetcher, config).await
        }
        Transport::Browser => {
            let fetcher = BrowserFetcher::new()
                .context("Failed to start headless Chrome")?
                .with_settle(config.browser_settle);
            run(fetcher, config).await
        }
    }
}
