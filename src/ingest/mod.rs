// src/ingest/mod.rs
pub mod dedup;
pub mod fetcher;
pub mod filter;
pub mod market;
pub mod parser;
pub mod seismic;
pub mod transport;
pub mod types;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::classify;
use crate::ingest::fetcher::Topic;
use crate::ingest::types::{Candidate, NewsRecord};

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Normalize feed text: decode entities, strip tags, fold quotes and whitespace.
/// For payloads that still carry HTML entities (rss2json output).
pub fn normalize_text(s: &str) -> String {
    strip_markup(&html_escape::decode_html_entities(s))
}

/// Strip tags, fold typographic quotes and collapse whitespace without decoding
/// entities. For text the XML deserializer has already unescaped once.
pub fn strip_markup(s: &str) -> String {
    let mut out = RE_TAGS.replace_all(s, "").to_string();

    // “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // incl. NBSP
    out = RE_WS.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Temporal filter → classification → dedup → cap, for one topic's candidates.
pub fn prepare_batch(now: i64, topic: &Topic, candidates: Vec<Candidate>) -> Vec<NewsRecord> {
    let parsed = candidates.len();
    let admitted = filter::filter_window(now, topic.max_age_days, candidates);
    let in_window = admitted.len();

    let records = admitted
        .into_iter()
        .map(|(c, ts)| classify(c, ts, topic.category, now))
        .collect::<Vec<_>>();

    let mut kept = dedup::dedup(records);
    let deduped = in_window - kept.len();
    kept.truncate(topic.max_items);

    metrics::counter!("tracker_items_parsed_total").increment(parsed as u64);
    metrics::counter!("tracker_items_stale_total").increment((parsed - in_window) as u64);
    metrics::counter!("tracker_items_dedup_total").increment(deduped as u64);

    kept
}
