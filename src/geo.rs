//! Geo Extractor: at most one map marker per distinct headline, chosen by the
//! first city gazetteer entry contained in the lowercased title.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::gazetteer::{Coord, OrderedTable, CITY_COORDS};
use crate::ingest::types::{Category, NewsRecord};

/// Identity is the originating record's URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoMarker {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub title: String,
    pub source: String,
    pub url: String,
    pub category: Category,
    /// Unix seconds; 0 until the merge engine admits the marker.
    pub first_seen_at: i64,
}

/// Markers for `records` using the built-in city table.
pub fn locate(records: &[NewsRecord]) -> Vec<GeoMarker> {
    locate_with(&CITY_COORDS, records)
}

/// Markers for `records` using an explicit table; scan order is table order.
pub fn locate_with(table: &OrderedTable<'_, &str, Coord>, records: &[NewsRecord]) -> Vec<GeoMarker> {
    let mut mapped_titles: HashSet<&str> = HashSet::new();
    let mut markers = Vec::new();

    for rec in records {
        if rec.url.is_empty() || mapped_titles.contains(rec.title.as_str()) {
            continue;
        }
        let lower = rec.title.to_lowercase();
        let Some((_, coord)) = table.first_match(|name, _| lower.contains(*name)) else {
            continue;
        };
        markers.push(GeoMarker {
            id: rec.url.clone(),
            lat: coord.lat,
            lon: coord.lon,
            title: rec.title.clone(),
            source: rec.source.clone(),
            url: rec.url.clone(),
            category: rec.category,
            first_seen_at: 0,
        });
        mapped_titles.insert(rec.title.as_str());
    }
    markers
}
