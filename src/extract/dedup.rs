use std::collections::HashSet;

use crate::models::ListingRecord;

/// Default similarity above which two titles count as the same listing
pub const SIMILARITY_THRESHOLD: f64 = 0.85;

/// Titles longer than this (in chars) are compared by word overlap
const LONG_TITLE: usize = 100;

/// Title similarity in `[0, 1]`
///
/// Short titles use the Ratcliff/Obershelp ratio on lowercased characters;
/// if either title is long, Jaccard overlap of lowercased words is used
/// instead. Empty input scores 0
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.chars().count() > LONG_TITLE || b.chars().count() > LONG_TITLE {
        return jaccard(&a, &b);
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let matched = matching_chars(&a, &b);
    2.0 * matched as f64 / (a.len() + b.len()) as f64
}

fn jaccard(a: &str, b: &str) -> f64 {
    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.union(&right).count();
    shared as f64 / union as f64
}

/// Longest common block within `a[alo..ahi]` and `b[blo..bhi]`, as
/// `(start_a, start_b, len)`. Ties go to the earliest start in `a`, then `b`
fn longest_block(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
    let (mut best_a, mut best_b, mut best_len) = (alo, blo, 0);
    // run[j - blo + 1] = length of the match ending at a[i - 1], b[j]
    let mut run = vec![0usize; bhi - blo + 1];
    for i in alo..ahi {
        let mut next = vec![0usize; bhi - blo + 1];
        for j in blo..bhi {
            if a[i] == b[j] {
                let len = run[j - blo] + 1;
                next[j - blo + 1] = len;
                if len > best_len {
                    best_a = i + 1 - len;
                    best_b = j + 1 - len;
                    best_len = len;
                }
            }
        }
        run = next;
    }
    (best_a, best_b, best_len)
}

/// Total characters in the recursively found matching blocks
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut pending = vec![(0, a.len(), 0, b.len())];
    let mut total = 0;
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, len) = longest_block(a, b, alo, ahi, blo, bhi);
        if len == 0 {
            continue;
        }
        total += len;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + len < ahi && j + len < bhi {
            pending.push((i + len, ahi, j + len, bhi));
        }
    }
    total
}

/// Drop records sharing an identity key with an earlier record
fn exact_pass(records: Vec<ListingRecord>) -> Vec<ListingRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(r.identity_key.clone()))
        .collect()
}

/// One pairwise sweep. Each candidate is compared with every kept record;
/// on a match the higher-confidence record takes the slot, ties keep the
/// incumbent
fn similarity_pass(records: Vec<ListingRecord>, threshold: f64) -> Vec<ListingRecord> {
    let mut kept: Vec<ListingRecord> = Vec::with_capacity(records.len());
    for candidate in records {
        match kept
            .iter()
            .position(|k| similarity(&candidate.title, &k.title) > threshold)
        {
            Some(idx) => {
                if candidate.confidence > kept[idx].confidence {
                    kept[idx] = candidate;
                }
            }
            None => kept.push(candidate),
        }
    }
    kept
}

/// Collapse exact and near-duplicate listings
///
/// The similarity sweep is O(n²) and is repeated until it stops removing
/// records: a replacement can leave the new winner similar to a record kept
/// after its twin, and the repeat makes the result a fixed point
pub fn dedupe(records: Vec<ListingRecord>, threshold: f64) -> Vec<ListingRecord> {
    let mut current = exact_pass(records);
    loop {
        let before = current.len();
        current = similarity_pass(current, threshold);
        if current.len() == before {
            return current;
        }
    }
}
