//! # Risk Aggregator
//! Recomputes the full country-risk ranking from one diaspora-safety batch.
//! No state survives between calls: each result replaces the previous one.
//!
//! Country attribution scans the country gazetteer in table order
//! (case-sensitive substring); records matching no country are dropped.
//! Severity per record: critical keyword → 3, elevated keyword → 2, else 1.
//! Per country the highest severity wins and the first record seen supplies
//! the representative headline.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::gazetteer::{OrderedTable, COUNTRY_KEYWORDS, CRITICAL_KEYWORDS, HIGH_KEYWORDS};
use crate::ingest::types::NewsRecord;

static RE_SOURCE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s-\s.*$").expect("source suffix regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Moderate = 1,
    High = 2,
    Critical = 3,
}

impl RiskLevel {
    pub fn severity(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRiskRecord {
    pub country: String,
    pub code: String,
    pub risk_level: RiskLevel,
    pub incident_count: usize,
    pub latest_headline: String,
    pub latest_url: String,
    pub last_updated: String,
}

/// Severity of a single headline.
pub fn severity_for(title: &str) -> RiskLevel {
    let lower = title.to_lowercase();
    if CRITICAL_KEYWORDS.iter().any(|k| lower.contains(*k)) {
        RiskLevel::Critical
    } else if HIGH_KEYWORDS.iter().any(|k| lower.contains(*k)) {
        RiskLevel::High
    } else {
        RiskLevel::Moderate
    }
}

/// First country (table order) with a variant contained in `title`.
pub fn attribute_country<'a>(
    table: &OrderedTable<'a, &'a str, &'a [&'a str]>,
    title: &str,
) -> Option<&'a str> {
    table
        .first_match(|_, variants| variants.iter().any(|v| title.contains(*v)))
        .map(|(country, _)| *country)
}

/// Headline without the trailing " - Publisher" suffix.
pub fn strip_source_suffix(title: &str) -> String {
    RE_SOURCE_SUFFIX.replace(title, "").into_owned()
}

fn country_code(country: &str) -> String {
    country.chars().take(2).collect::<String>().to_lowercase()
}

pub fn analyze(records: &[NewsRecord]) -> Vec<CountryRiskRecord> {
    analyze_with(&COUNTRY_KEYWORDS, records)
}

pub fn analyze_with<'a>(
    table: &OrderedTable<'a, &'a str, &'a [&'a str]>,
    records: &[NewsRecord],
) -> Vec<CountryRiskRecord> {
    struct Acc<'r> {
        country: &'r str,
        count: usize,
        max: RiskLevel,
        first: &'r NewsRecord,
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut accs: Vec<Acc<'_>> = Vec::new();

    for rec in records {
        let Some(country) = attribute_country(table, &rec.title) else {
            continue;
        };
        let sev = severity_for(&rec.title);
        match index.get(country) {
            Some(&i) => {
                let acc = &mut accs[i];
                acc.count += 1;
                acc.max = acc.max.max(sev);
            }
            None => {
                index.insert(country, accs.len());
                accs.push(Acc {
                    country,
                    count: 1,
                    max: sev,
                    first: rec,
                });
            }
        }
    }

    let mut out: Vec<CountryRiskRecord> = accs
        .into_iter()
        .map(|a| CountryRiskRecord {
            country: a.country.to_string(),
            code: country_code(a.country),
            risk_level: a.max,
            incident_count: a.count,
            latest_headline: strip_source_suffix(&a.first.title),
            latest_url: a.first.url.clone(),
            last_updated: a.first.timestamp.clone(),
        })
        .collect();

    // stable: equal (level, count) keep first-observed order
    out.sort_by(|a, b| {
        b.risk_level
            .cmp(&a.risk_level)
            .then_with(|| b.incident_count.cmp(&a.incident_count))
    });
    out
}
