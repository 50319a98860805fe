//! Temporal Filter: admits candidates whose publish time parses and falls in
//! `[now - max_age_days, now + 15 min]`.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::ingest::types::Candidate;

/// Clock-skew allowance for items dated slightly in the future.
pub const FUTURE_SKEW_SECS: i64 = 15 * 60;
const DAY_SECS: i64 = 24 * 60 * 60;

/// Publish time as unix seconds. Accepts RFC 2822 (RSS), RFC 3339 and the
/// `YYYY-MM-DD HH:MM:SS` UTC form rss2json emits.
pub fn parse_published(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc2822) {
        return Some(dt.unix_timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

/// True when `published_at` is inside the admissible window around `now`.
pub fn within_window(now: i64, max_age_days: u32, published_at: i64) -> bool {
    let cutoff = now - i64::from(max_age_days) * DAY_SECS;
    published_at >= cutoff && published_at <= now + FUTURE_SKEW_SECS
}

/// Drop unparsable, too old and future-dated candidates. Keeps input order.
pub fn filter_window(
    now: i64,
    max_age_days: u32,
    candidates: Vec<Candidate>,
) -> Vec<(Candidate, i64)> {
    candidates
        .into_iter()
        .filter_map(|c| {
            let ts = parse_published(&c.raw_published)?;
            within_window(now, max_age_days, ts).then_some((c, ts))
        })
        .collect()
}

/// Age label for the display layer: "12m ago", "5h ago", then "Jan 3".
pub fn display_age(now: i64, published_at: i64) -> String {
    let diff = now - published_at;
    let mins = diff.div_euclid(60);
    let hours = diff.div_euclid(3600);
    if mins < 60 {
        format!("{}m ago", mins.max(0))
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        match Utc.timestamp_opt(published_at, 0).single() {
            Some(dt) => dt.format("%b %-d").to_string(),
            None => format!("{hours}h ago"),
        }
    }
}
