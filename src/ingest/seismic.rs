//! Seismic feed (USGS GeoJSON summary). Bypasses classification and geo
//! extraction; failures degrade to an empty batch.

use std::sync::Arc;

use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::ingest::types::FeedSource;

pub const DEFAULT_SEISMIC_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/4.5_week.geojson";

/// Identity is the upstream event id. Everything but `first_seen_at` is
/// refreshed from the latest feed on every cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicEvent {
    pub id: String,
    pub place: String,
    pub magnitude: f64,
    /// Upstream event time, epoch milliseconds.
    pub time_ms: i64,
    pub lat: f64,
    pub lon: f64,
    pub url: String,
    /// Unix seconds; stamped by the merge engine.
    pub first_seen_at: i64,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    id: String,
    properties: Properties,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    place: Option<String>,
    mag: Option<f64>,
    time: Option<i64>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

/// Map GeoJSON features to events. Features without a `[lon, lat]` pair are skipped.
pub fn parse_geojson(body: &str) -> Result<Vec<SeismicEvent>, FetchError> {
    let fc: FeatureCollection =
        serde_json::from_str(body).map_err(|e| FetchError::format(format!("geojson: {e}")))?;

    Ok(fc
        .features
        .into_iter()
        .filter_map(|f| {
            let coords = f.geometry?.coordinates;
            let (lon, lat) = (*coords.first()?, *coords.get(1)?);
            Some(SeismicEvent {
                id: f.id,
                place: f.properties.place.unwrap_or_default(),
                magnitude: f.properties.mag.unwrap_or_default(),
                time_ms: f.properties.time.unwrap_or_default(),
                lat,
                lon,
                url: f.properties.url.unwrap_or_default(),
                first_seen_at: 0,
            })
        })
        .collect())
}

pub struct SeismicClient {
    source: Arc<dyn FeedSource>,
    url: String,
}

impl SeismicClient {
    pub fn new(source: Arc<dyn FeedSource>, url: impl Into<String>) -> Self {
        Self {
            source,
            url: url.into(),
        }
    }

    /// Current events, or none plus the failure kind when the feed is down.
    pub async fn fetch_report(&self) -> (Vec<SeismicEvent>, Option<&'static str>) {
        let res = match self.source.fetch_text(&self.url).await {
            Ok(body) => parse_geojson(&body),
            Err(e) => Err(e),
        };
        match res {
            Ok(events) => (events, None),
            Err(e) => {
                counter!("tracker_fetch_failures_total", "kind" => e.kind()).increment(1);
                tracing::warn!(
                    target: "seismic",
                    source = self.source.name(),
                    error = %e,
                    "seismic feed unavailable"
                );
                (Vec::new(), Some(e.kind()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_usgs_features() {
        let body = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","id":"us7000abcd",
             "properties":{"mag":5.2,"place":"10 km N of Somewhere","time":1736160000000,"url":"https://usgs/us7000abcd"},
             "geometry":{"type":"Point","coordinates":[142.1,38.3,10.0]}},
            {"type":"Feature","id":"broken","properties":{"mag":null,"place":null,"time":null,"url":null},"geometry":null}
        ]}"#;
        let out = parse_geojson(body).unwrap();
        assert_eq!(out.len(), 1);
        let e = &out[0];
        assert_eq!(e.id, "us7000abcd");
        assert_eq!(e.lat, 38.3);
        assert_eq!(e.lon, 142.1);
        assert_eq!(e.magnitude, 5.2);
        assert_eq!(e.time_ms, 1_736_160_000_000);
    }

    #[test]
    fn garbage_is_a_format_failure() {
        assert_eq!(parse_geojson("<html/>").unwrap_err().kind(), "format");
    }
}
