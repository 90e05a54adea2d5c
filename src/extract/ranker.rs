use std::cmp::Ordering;

use super::config::RankMode;
use crate::models::ListingRecord;

/// Price used for ordering Buy It Now listings; unparsed prices sort last
fn buy_key(record: &ListingRecord) -> f64 {
    if record.total_value > 0.0 {
        record.total_value
    } else {
        f64::INFINITY
    }
}

fn compare(mode: RankMode, a: &ListingRecord, b: &ListingRecord) -> Ordering {
    match mode {
        RankMode::EndingSoonest => a.sort_minutes().cmp(&b.sort_minutes()),
        RankMode::MostActive => b.bid_count.cmp(&a.bid_count),
        RankMode::BuyItNow => buy_key(a).total_cmp(&buy_key(b)),
        RankMode::Relevance => b.confidence.total_cmp(&a.confidence),
    }
}

/// Stable sort by the mode's key, then cap at `max_total`
///
/// Records with equal keys keep their input order
pub fn rank(mut records: Vec<ListingRecord>, mode: RankMode, max_total: usize) -> Vec<ListingRecord> {
    records.sort_by(|a, b| compare(mode, a, b));
    records.truncate(max_total);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingFormat;

    fn listing(title: &str, minutes: Option<u32>, bids: u32, total: f64, confidence: f64) -> ListingRecord {
        ListingRecord {
            title: title.to_string(),
            price: format!("${total:.2}"),
            link: "#".to_string(),
            image: String::new(),
            time_left: String::new(),
            time_minutes: minutes,
            confidence,
            identity_key: title.to_lowercase(),
            bid_count: bids,
            is_lot: false,
            format: ListingFormat::Auction,
            shipping: None,
            total_price: format!("${total:.2}"),
            total_value: total,
            category: None,
        }
    }

    fn titles(records: &[ListingRecord]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_str()).collect()
    }

    fn sample() -> Vec<ListingRecord> {
        vec![
            listing("a", None, 3, 40.0, 0.9),
            listing("b", Some(30), 0, 0.0, 1.0),
            listing("c", Some(5), 12, 25.0, 0.9),
            listing("d", Some(30), 3, 60.0, 0.8),
        ]
    }

    #[test]
    fn ending_soonest_puts_unknown_last() {
        let ranked = rank(sample(), RankMode::EndingSoonest, 10);
        assert_eq!(titles(&ranked), ["c", "b", "d", "a"]);
    }

    #[test]
    fn most_active_keeps_ties_in_input_order() {
        let ranked = rank(sample(), RankMode::MostActive, 10);
        assert_eq!(titles(&ranked), ["c", "a", "d", "b"]);
    }

    #[test]
    fn buy_it_now_is_cheapest_first() {
        let ranked = rank(sample(), RankMode::BuyItNow, 10);
        assert_eq!(titles(&ranked), ["c", "a", "d", "b"]);
    }

    #[test]
    fn relevance_truncates() {
        let ranked = rank(sample(), RankMode::Relevance, 2);
        assert_eq!(titles(&ranked), ["b", "a"]);
    }
}
