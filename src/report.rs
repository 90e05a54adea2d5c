use chrono::{DateTime, Utc};

use crate::models::{ListingFormat, ListingRecord, ScrapeReport};

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: 'Segoe UI', system-ui, sans-serif; background: #121212; color: #e0e0e0; padding: 20px; line-height: 1.5; }
.container { max-width: 1600px; margin: 0 auto; }
.header { text-align: center; margin-bottom: 40px; padding: 30px; background: #1e1e1e; border-radius: 15px; border: 1px solid #333; }
.header h1 { font-size: clamp(2rem, 5vw, 3rem); margin-bottom: 10px; }
.stats { background: #2d2d2d; padding: 10px 20px; border-radius: 25px; display: inline-block; border: 1px solid #444; }
.categories { margin-top: 15px; display: flex; gap: 10px; justify-content: center; flex-wrap: wrap; }
.chip { background: #333; padding: 4px 12px; border-radius: 12px; font-size: 13px; }
.items-grid { display: grid; grid-template-columns: repeat(4, 1fr); gap: 20px; }
@media (max-width: 1400px) { .items-grid { grid-template-columns: repeat(3, 1fr); } }
@media (max-width: 1000px) { .items-grid { grid-template-columns: repeat(2, 1fr); } }
@media (max-width: 600px) { .items-grid { grid-template-columns: 1fr; } }
.item-card { display: block; color: inherit; text-decoration: none; background: #1e1e1e; border-radius: 12px; border: 1px solid #333; overflow: hidden; }
.item-card:hover { border-color: #555; }
.item-image { width: 100%; height: 200px; object-fit: cover; background: #333; }
.card-body { padding: 15px; }
.item-title { font-size: 14px; font-weight: 600; margin-bottom: 10px; }
.badges { display: flex; flex-wrap: wrap; gap: 5px; margin-bottom: 10px; }
.badge { padding: 3px 8px; border-radius: 12px; font-size: 11px; font-weight: 600; color: white; }
.bid-badge { background: #ff6b6b; }
.lot-badge { background: #ab47bc; }
.buy-badge { background: #66bb6a; }
.card-footer { display: flex; justify-content: space-between; align-items: center; padding: 12px 15px; background: #252525; border-top: 1px solid #333; }
.total-price { font-weight: 700; color: #4ecdc4; }
.base-price, .time-left { font-size: 12px; color: #999; }
.no-results, .footer { text-align: center; padding: 40px 20px; margin-top: 30px; background: #1e1e1e; border-radius: 15px; border: 1px solid #333; color: #999; }
.search-link { display: block; padding: 20px; background: #1e1e1e; border: 1px solid #333; border-radius: 12px; color: #e0e0e0; text-decoration: none; }
.search-link:hover { border-color: #4ecdc4; }
"#;

/// Escape text for use in element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n<div class=\"container\">\n{}\n</div>\n</body>\n</html>\n",
        escape_html(title),
        STYLE,
        body
    )
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%B %d, %Y at %I:%M %p UTC").to_string()
}

fn card(record: &ListingRecord) -> String {
    let mut badges = String::new();
    if record.bid_count > 0 {
        badges.push_str(&format!(
            "<span class=\"badge bid-badge\">{} bids</span>",
            record.bid_count
        ));
    }
    if record.is_lot {
        badges.push_str("<span class=\"badge lot-badge\">Lot</span>");
    }
    if record.format == ListingFormat::BuyItNow {
        badges.push_str("<span class=\"badge buy-badge\">Buy Now</span>");
    }

    format!(
        "<a class=\"item-card\" href=\"{link}\" target=\"_blank\" rel=\"noopener\">\
         <img class=\"item-image\" src=\"{image}\" alt=\"\" loading=\"lazy\">\
         <div class=\"card-body\"><h4 class=\"item-title\">{title}</h4>\
         <div class=\"badges\">{badges}</div>\
         <div class=\"base-price\">Base: {price} • {format}</div></div>\
         <div class=\"card-footer\"><span class=\"total-price\">{total}</span>\
         <span class=\"time-left\">{time}</span></div></a>",
        link = escape_html(&record.link),
        image = escape_html(&record.image),
        title = escape_html(&record.title),
        badges = badges,
        price = escape_html(&record.price),
        format = record.format.label(),
        total = escape_html(&record.total_price),
        time = escape_html(&record.time_left),
    )
}

/// Render the ranked listings with a headline of aggregate counts
pub fn render_html(report: &ScrapeReport) -> String {
    let chips: String = report
        .per_category
        .iter()
        .map(|(name, count)| format!("<span class=\"chip\">{}: {}</span>", escape_html(name), count))
        .collect();

    let header = format!(
        "<div class=\"header\"><h1>GameBoy Advance Listings</h1>\
         <div class=\"stats\">Found {} listings ({} duplicates removed) • Updated {}</div>\
         <div class=\"categories\">{}</div></div>",
        report.records.len(),
        report.duplicates_removed,
        timestamp(report.generated_at),
        chips
    );

    let content = if report.is_empty() {
        "<div class=\"no-results\"><h2>No GameBoy Advance items found</h2>\
         <p>eBay inventory changes frequently, try again in a few minutes.</p></div>"
            .to_string()
    } else {
        let cards: String = report.records.iter().map(card).collect();
        format!("<div class=\"items-grid\">{cards}</div>")
    };

    let footer = "<div class=\"footer\"><p>Click any item to view it on eBay</p></div>";
    page("GameBoy Advance Listings", &format!("{header}\n{content}\n{footer}"))
}

/// Page of direct search links, used when no listings could be fetched
pub fn render_fallback_html(links: &[(String, String)], generated_at: DateTime<Utc>) -> String {
    let cards: String = links
        .iter()
        .map(|(name, url)| {
            format!(
                "<a class=\"search-link\" href=\"{}\" target=\"_blank\" rel=\"noopener\"><h3>{}</h3><p>Search eBay directly</p></a>",
                escape_html(url),
                escape_html(name)
            )
        })
        .collect();

    let body = format!(
        "<div class=\"header\"><h1>GameBoy Advance Search Links</h1>\
         <div class=\"stats\">Live results unavailable • Generated {}</div></div>\n\
         <div class=\"items-grid\">{}</div>",
        timestamp(generated_at),
        cards
    );
    page("GameBoy Advance Search Links", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn report(records: Vec<ListingRecord>) -> ScrapeReport {
        let mut per_category = BTreeMap::new();
        per_category.insert("Ending Soonest".to_string(), records.len());
        ScrapeReport {
            total_found: records.len(),
            duplicates_removed: 0,
            records,
            per_category,
            generated_at: Utc::now(),
        }
    }

    fn record(title: &str) -> ListingRecord {
        ListingRecord {
            title: title.to_string(),
            price: "$40.00".to_string(),
            link: "https://www.ebay.com/itm/1?a=1&b=2".to_string(),
            image: "https://i.ebayimg.com/s-l400.jpg".to_string(),
            time_left: "1d 2h".to_string(),
            time_minutes: Some(1440),
            confidence: 1.0,
            identity_key: String::new(),
            bid_count: 3,
            is_lot: false,
            format: ListingFormat::Auction,
            shipping: Some(0.0),
            total_price: "$40.00 (Free Ship)".to_string(),
            total_value: 40.0,
            category: Some("Ending Soonest".to_string()),
        }
    }

    #[test]
    fn titles_and_links_are_escaped() {
        let html = render_html(&report(vec![record("GBA <script>alert(1)</script>")]));
        assert!(html.contains("GBA &lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("itm/1?a=1&amp;b=2"));
        assert!(html.contains("3 bids"));
        assert!(html.contains("Base: $40.00 • Auction"));
        assert!(html.contains("Ending Soonest: 1"));
    }

    #[test]
    fn empty_report_shows_no_results() {
        let html = render_html(&report(Vec::new()));
        assert!(html.contains("No GameBoy Advance items found"));
    }

    #[test]
    fn fallback_lists_every_link() {
        let links = vec![
            ("Ending Soonest".to_string(), "https://www.ebay.com/sch/i.html?_nkw=gba".to_string()),
            ("Buy It Now".to_string(), "https://www.ebay.com/sch/i.html?LH_BIN=1".to_string()),
        ];
        let html = render_fallback_html(&links, Utc::now());
        assert_eq!(html.matches("class=\"search-link\"").count(), 2);
    }
}
