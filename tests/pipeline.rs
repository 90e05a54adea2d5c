use gba_scout::models::{MISSING_LINK, PRICE_NOT_AVAILABLE, TIME_NOT_SPECIFIED};
use gba_scout::{ListingFormat, Pipeline, PipelineConfig, RankMode};

const SEARCH_PAGE: &str = include_str!("fixtures/search_page.html");

fn pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig::default()).unwrap()
}

fn titles(records: &[gba_scout::ListingRecord]) -> Vec<&str> {
    records.iter().map(|r| r.title.as_str()).collect()
}

#[test]
fn search_page_yields_relevant_listings() {
    let records = pipeline().process_page(SEARCH_PAGE);

    // placeholder, sponsored and Switch cards are dropped
    assert_eq!(
        titles(&records),
        vec![
            "Nintendo Gameboy Advance SP AGS-001",
            "Nintendo Gameboy Advance SP AGS-001",
            "Pokemon Emerald GBA Cartridge Authentic",
            "Gameboy Advance lot with 10 games",
        ]
    );
}

#[test]
fn auction_card_is_fully_enriched() {
    let records = pipeline().process_page(SEARCH_PAGE);
    let sp = &records[0];

    assert_eq!(sp.price, "$45.00");
    assert_eq!(sp.link, "https://www.ebay.com/itm/111");
    assert_eq!(sp.image, "https://i.ebayimg.com/images/g/abc/s-l400.jpg");
    assert_eq!(sp.time_left, "2d 4h left");
    assert_eq!(sp.time_minutes, Some(2880));
    assert_eq!(sp.bid_count, 5);
    assert_eq!(sp.format, ListingFormat::Auction);
    assert_eq!(sp.shipping, Some(4.99));
    assert_eq!(sp.total_price, "$49.99 (+$4.99 ship)");
    assert_eq!(sp.confidence, 1.0);
    assert!(!sp.is_lot);
}

#[test]
fn buy_it_now_card_uses_lazy_image_and_free_shipping() {
    let records = pipeline().process_page(SEARCH_PAGE);
    let bin = &records[2];

    assert_eq!(bin.format, ListingFormat::BuyItNow);
    assert_eq!(bin.image, "https://i.ebayimg.com/images/g/ghi/s-l500.jpg");
    assert_eq!(bin.link, "https://www.ebay.com/itm/115?hash=item1");
    assert_eq!(bin.shipping, Some(0.0));
    assert_eq!(bin.total_price, "$80.00 (Free Ship)");
    assert_eq!(bin.time_left, TIME_NOT_SPECIFIED);
    assert_eq!(bin.time_minutes, None);
    assert_eq!(bin.confidence, 0.9);
}

#[test]
fn bare_card_falls_back_to_sentinels() {
    let config = PipelineConfig::default();
    let default_image = config.default_image.clone();
    let records = Pipeline::new(config).unwrap().process_page(SEARCH_PAGE);
    let lot = &records[3];

    assert_eq!(lot.price, PRICE_NOT_AVAILABLE);
    assert_eq!(lot.total_price, PRICE_NOT_AVAILABLE);
    assert_eq!(lot.total_value, 0.0);
    assert_eq!(lot.link, MISSING_LINK);
    assert_eq!(lot.image, default_image);
    assert_eq!(lot.format, ListingFormat::Unknown);
    assert!(lot.is_lot);
}

#[test]
fn exact_duplicates_collapse_to_first_seen() {
    let pipeline = pipeline();
    let records = pipeline.process_page(SEARCH_PAGE);
    let (ranked, removed) = pipeline.dedupe_and_rank(records, RankMode::Relevance);

    assert_eq!(removed, 1);
    assert_eq!(
        titles(&ranked),
        vec![
            "Nintendo Gameboy Advance SP AGS-001",
            "Gameboy Advance lot with 10 games",
            "Pokemon Emerald GBA Cartridge Authentic",
        ]
    );
    // the first card (2d 4h) survives, not the 5h twin
    assert_eq!(ranked[0].link, "https://www.ebay.com/itm/111");
}

#[test]
fn ending_soonest_puts_unknown_times_last() {
    let pipeline = pipeline();
    let records = pipeline.process_page(SEARCH_PAGE);
    let (ranked, _) = pipeline.dedupe_and_rank(records, RankMode::EndingSoonest);

    assert_eq!(ranked[0].time_minutes, Some(2880));
    assert!(ranked[1..].iter().all(|r| r.time_minutes.is_none()));
}

#[test]
fn max_listings_per_search_caps_candidates() {
    let config = PipelineConfig {
        max_listings_per_search: 2,
        ..PipelineConfig::default()
    };
    // the first two containers are the placeholder and the SP card
    let records = Pipeline::new(config).unwrap().process_page(SEARCH_PAGE);
    assert_eq!(titles(&records), vec!["Nintendo Gameboy Advance SP AGS-001"]);
}

#[test]
fn sidebar_only_page_yields_nothing() {
    let page = r#"<html><body>
        <aside class="x-refine"><ul>
          <li class="x-refine__item">Gameboy Advance SP</li>
          <li class="x-refine__item">Gameboy Advance Micro</li>
          <li class="x-refine__item">Gameboy Advance Classic</li>
        </ul></aside>
        <ul><li class="s-item"><h3 class="s-item__title">Gameboy Advance SP Cobalt</h3></li></ul>
        </body></html>"#;
    assert!(pipeline().process_page(page).is_empty());
}

#[test]
fn shared_cache_is_filled_by_page_processing() {
    use gba_scout::extract::ClassificationCache;
    use std::sync::Arc;

    let cache = Arc::new(ClassificationCache::new(16));
    let pipeline = Pipeline::with_cache(PipelineConfig::default(), Arc::clone(&cache)).unwrap();
    pipeline.process_page(SEARCH_PAGE);

    // SP title (seen twice), Switch, Pokemon and lot titles
    assert_eq!(cache.len(), 4);
}

#[test]
fn differently_configured_pipelines_share_a_cache_safely() {
    use gba_scout::extract::ClassificationCache;
    use std::sync::Arc;

    // "handheld console" weighs exactly the default cutoff
    let card = r#"<li class="s-item"><h3 class="s-item__title">Handheld console boxed retro</h3></li>"#;
    let page = format!("<ul>{card}{card}{card}</ul>");
    let lenient = PipelineConfig {
        relevance_threshold: 0.1,
        ..PipelineConfig::default()
    };

    let cache = Arc::new(ClassificationCache::new(16));
    let strict_shared = Pipeline::with_cache(PipelineConfig::default(), Arc::clone(&cache)).unwrap();
    let lenient_shared = Pipeline::with_cache(lenient.clone(), Arc::clone(&cache)).unwrap();

    assert!(strict_shared.process_page(&page).is_empty());
    let shared = lenient_shared.process_page(&page);
    let own = Pipeline::new(lenient).unwrap().process_page(&page);
    assert_eq!(shared.len(), 3);
    assert_eq!(shared, own);
}
