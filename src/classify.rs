//! Classifier: keyword-driven priority. Category is never inferred from
//! content; it is the topic the query was issued under.

use crate::gazetteer::URGENT_KEYWORDS;
use crate::ingest::filter::display_age;
use crate::ingest::types::{Candidate, Category, NewsRecord, Priority};

/// High when the title contains any urgent keyword (case-insensitive).
pub fn priority_for(title: &str) -> Priority {
    let lower = title.to_lowercase();
    if URGENT_KEYWORDS.iter().any(|k| lower.contains(*k)) {
        Priority::High
    } else {
        Priority::Normal
    }
}

/// Build the immutable record for one admitted candidate.
pub fn classify(candidate: Candidate, published_at: i64, category: Category, now: i64) -> NewsRecord {
    let priority = priority_for(&candidate.title);
    NewsRecord {
        id: candidate.link.clone(),
        title: candidate.title,
        source: candidate.source,
        url: candidate.link,
        timestamp: display_age(now, published_at),
        published_at,
        category,
        priority,
    }
}
