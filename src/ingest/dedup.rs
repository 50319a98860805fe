//! Deduplicator: collapses near-identical headlines within one fetched batch.

use std::collections::HashSet;

use crate::ingest::types::NewsRecord;

const FINGERPRINT_LEN: usize = 30;

/// Lowercase, ASCII alphanumerics only, first 30 characters.
pub fn fingerprint(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .take(FINGERPRINT_LEN)
        .collect()
}

/// Drop any record whose fingerprint or exact URL was already seen earlier in
/// the batch. First occurrence wins; order is preserved; idempotent.
pub fn dedup(records: Vec<NewsRecord>) -> Vec<NewsRecord> {
    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut keep = Vec::with_capacity(records.len());

    for rec in records {
        let fp = fingerprint(&rec.title);
        if seen_titles.contains(&fp) || seen_urls.contains(&rec.url) {
            continue;
        }
        seen_titles.insert(fp);
        seen_urls.insert(rec.url.clone());
        keep.push(rec);
    }
    keep
}
