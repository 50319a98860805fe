//! Feed Parser: turns the two payload shapes a fetch can yield into [`Candidate`]s.
//!
//! - Raw RSS markup from a proxy: fields live on each `<item>`, the publisher
//!   name is the text of `<source>`.
//! - rss2json output from the fallback endpoint: JSON `items[]` where the
//!   publisher name sits in `author`.
//!
//! No validation happens here; dates are passed through verbatim.

use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::FetchError;
use crate::ingest::{normalize_text, strip_markup};
use crate::ingest::types::Candidate;

const DEFAULT_SOURCE: &str = "News";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    source: Option<ItemSource>,
}

#[derive(Debug, Deserialize)]
struct ItemSource {
    #[serde(rename = "$text")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Rss2Json {
    #[serde(default)]
    items: Option<Vec<Rss2JsonItem>>,
}

#[derive(Debug, Deserialize)]
struct Rss2JsonItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
}

fn source_or_default(raw: Option<String>, clean: fn(&str) -> String) -> String {
    raw.map(|s| clean(&s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string())
}

/// Parse RSS markup returned by a proxy.
pub fn parse_rss(xml: &str) -> Result<Vec<Candidate>, FetchError> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss =
        from_str(&xml_clean).map_err(|e| FetchError::format(format!("rss xml: {e}")))?;

    Ok(rss
        .channel
        .item
        .into_iter()
        .map(|it| Candidate {
            // quick-xml has already unescaped entities once
            title: strip_markup(it.title.as_deref().unwrap_or_default()),
            link: it.link.unwrap_or_default().trim().to_string(),
            source: source_or_default(it.source.and_then(|s| s.name), strip_markup),
            raw_published: it.pub_date.unwrap_or_default(),
        })
        .collect())
}

/// Parse the structured JSON returned by the fallback transformation endpoint.
/// A payload without `items` (e.g. an upstream error object) yields no candidates.
pub fn parse_rss2json(json: &str) -> Result<Vec<Candidate>, FetchError> {
    let doc: Rss2Json =
        serde_json::from_str(json).map_err(|e| FetchError::format(format!("rss2json: {e}")))?;

    Ok(doc
        .items
        .unwrap_or_default()
        .into_iter()
        .map(|it| Candidate {
            title: normalize_text(it.title.as_deref().unwrap_or_default()),
            link: it.link.unwrap_or_default().trim().to_string(),
            source: source_or_default(it.author, normalize_text),
            raw_published: it.pub_date.unwrap_or_default(),
        })
        .collect())
}

/// HTML entities that are not valid XML and would otherwise abort the parse.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
