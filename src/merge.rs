//! # Merge Engine
//! Three reconciliation rules with different invariants, kept as separate
//! functions:
//!
//! - news lists: append-only by URL, re-sorted newest first;
//! - geo markers: existing entries win untouched, new ones stamped and prepended;
//! - seismic events: replaced wholesale, first-seen carried from the ledger.
//!
//! Country risk and the market snapshot are replaced wholesale by the caller.

use std::collections::{HashMap, HashSet};

use crate::geo::GeoMarker;
use crate::ingest::seismic::SeismicEvent;
use crate::ingest::types::NewsRecord;

/// Append records whose URL is not yet present; never removes or mutates
/// existing entries. Lists grow for the lifetime of the process.
pub fn merge_news(existing: Vec<NewsRecord>, incoming: Vec<NewsRecord>) -> Vec<NewsRecord> {
    let mut known: HashSet<String> = existing.iter().map(|r| r.id.clone()).collect();
    let fresh: Vec<NewsRecord> = incoming
        .into_iter()
        .filter(|r| known.insert(r.id.clone()))
        .collect();

    if fresh.is_empty() {
        return existing;
    }

    let mut merged = fresh;
    merged.extend(existing);
    merged.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    merged
}

/// Known markers keep their content, position and first-seen time; unknown
/// ones are stamped `now` and prepended in incoming order.
pub fn merge_markers(existing: Vec<GeoMarker>, incoming: Vec<GeoMarker>, now: i64) -> Vec<GeoMarker> {
    let mut known: HashSet<String> = existing.iter().map(|m| m.id.clone()).collect();
    let mut fresh: Vec<GeoMarker> = incoming
        .into_iter()
        .filter(|m| known.insert(m.id.clone()))
        .map(|mut m| {
            m.first_seen_at = now;
            m
        })
        .collect();

    if fresh.is_empty() {
        return existing;
    }
    fresh.extend(existing);
    fresh
}

/// First observation time per seismic event id. Outlives an id's absence
/// from the feed, so a reappearing event keeps its original stamp.
///
/// Entries are never evicted: the ledger grows by one per distinct id for
/// the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct FirstSeenLedger {
    seen: HashMap<String, i64>,
}

impl FirstSeenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp for `id`: the recorded one, or `now` recorded on first sight.
    pub fn stamp(&mut self, id: &str, now: i64) -> i64 {
        *self.seen.entry(id.to_string()).or_insert(now)
    }

    pub fn get(&self, id: &str) -> Option<i64> {
        self.seen.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// The feed's current contents replace the collection; only `first_seen_at`
/// survives from earlier cycles.
pub fn merge_seismic(
    ledger: &mut FirstSeenLedger,
    incoming: Vec<SeismicEvent>,
    now: i64,
) -> Vec<SeismicEvent> {
    let mut ids = HashSet::new();
    incoming
        .into_iter()
        .filter(|e| ids.insert(e.id.clone()))
        .map(|mut e| {
            e.first_seen_at = ledger.stamp(&e.id, now);
            e
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::{Category, Priority};

    fn news(url: &str, published_at: i64) -> NewsRecord {
        NewsRecord {
            id: url.into(),
            title: format!("title {url}"),
            source: "News".into(),
            url: url.into(),
            timestamp: "1m ago".into(),
            published_at,
            category: Category::Trade,
            priority: Priority::Normal,
        }
    }

    fn marker(url: &str, title: &str) -> GeoMarker {
        GeoMarker {
            id: url.into(),
            lat: 1.0,
            lon: 2.0,
            title: title.into(),
            source: "News".into(),
            url: url.into(),
            category: Category::UsIndia,
            first_seen_at: 0,
        }
    }

    fn quake(id: &str, mag: f64) -> SeismicEvent {
        SeismicEvent {
            id: id.into(),
            place: "somewhere".into(),
            magnitude: mag,
            time_ms: 0,
            lat: 0.0,
            lon: 0.0,
            url: String::new(),
            first_seen_at: 0,
        }
    }

    #[test]
    fn news_appends_only_new_urls_and_sorts_desc() {
        let existing = vec![news("a", 300), news("b", 100)];
        let merged = merge_news(existing, vec![news("a", 999), news("c", 200)]);
        let order: Vec<(&str, i64)> = merged
            .iter()
            .map(|r| (r.url.as_str(), r.published_at))
            .collect();
        assert_eq!(order, vec![("a", 300), ("c", 200), ("b", 100)]);
    }

    #[test]
    fn news_merge_is_idempotent() {
        let batch = vec![news("a", 1), news("b", 2)];
        let once = merge_news(Vec::new(), batch.clone());
        let twice = merge_news(once.clone(), batch);
        assert_eq!(once, twice);
    }

    #[test]
    fn markers_keep_existing_content_and_first_seen() {
        let first = merge_markers(Vec::new(), vec![marker("u1", "old title")], 100);
        assert_eq!(first[0].first_seen_at, 100);

        let second = merge_markers(
            first,
            vec![marker("u2", "new"), marker("u1", "updated title")],
            200,
        );
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].id, "u2");
        assert_eq!(second[0].first_seen_at, 200);
        assert_eq!(second[1].id, "u1");
        assert_eq!(second[1].title, "old title");
        assert_eq!(second[1].first_seen_at, 100);
    }

    #[test]
    fn marker_merge_is_idempotent() {
        let batch = vec![marker("u1", "a"), marker("u2", "b")];
        let once = merge_markers(Vec::new(), batch.clone(), 10);
        let twice = merge_markers(once.clone(), batch, 20);
        assert_eq!(once, twice);
    }

    #[test]
    fn seismic_replaces_wholesale_and_carries_first_seen() {
        let mut ledger = FirstSeenLedger::new();
        let c1 = merge_seismic(&mut ledger, vec![quake("eq1", 4.6), quake("eq2", 5.0)], 10);
        assert_eq!(c1.len(), 2);

        // eq1 absent in cycle 2 → dropped from the collection
        let c2 = merge_seismic(&mut ledger, vec![quake("eq2", 5.1)], 20);
        assert_eq!(c2.len(), 1);
        assert_eq!(c2[0].magnitude, 5.1);
        assert_eq!(c2[0].first_seen_at, 10);

        // eq1 reappears with an updated magnitude and keeps its original stamp
        let c3 = merge_seismic(&mut ledger, vec![quake("eq1", 4.9), quake("eq3", 6.0)], 30);
        assert_eq!(c3[0].id, "eq1");
        assert_eq!(c3[0].magnitude, 4.9);
        assert_eq!(c3[0].first_seen_at, 10);
        assert_eq!(c3[1].first_seen_at, 30);
    }

    #[test]
    fn seismic_merge_is_idempotent() {
        let mut ledger = FirstSeenLedger::new();
        let batch = vec![quake("eq1", 4.6)];
        let once = merge_seismic(&mut ledger, batch.clone(), 10);
        let twice = merge_seismic(&mut ledger, batch, 99);
        assert_eq!(once, twice);
        assert_eq!(ledger.get("eq1"), Some(10));
    }

    #[test]
    fn ledger_keeps_ids_that_left_the_feed() {
        let mut ledger = FirstSeenLedger::new();
        for (i, id) in ["a", "b", "c"].into_iter().enumerate() {
            let now = i as i64 * 60;
            let out = merge_seismic(&mut ledger, vec![quake(id, 4.5)], now);
            assert_eq!(out.len(), 1);
        }
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.get("a"), Some(0));
        assert_eq!(ledger.get("b"), Some(60));
    }
}
