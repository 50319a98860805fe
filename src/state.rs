//! Accumulated state read by the display layer.
//!
//! Written once per completed cycle (by [`TrackerState::apply`]); readers take
//! a cloned snapshot and must tolerate it changing between reads.

use std::sync::{PoisonError, RwLock};

use serde::Serialize;

use crate::geo::GeoMarker;
use crate::ingest::market::MarketSnapshot;
use crate::ingest::seismic::SeismicEvent;
use crate::ingest::types::{Category, NewsRecord};
use crate::merge::{merge_markers, merge_news, merge_seismic, FirstSeenLedger};
use crate::risk::CountryRiskRecord;

/// Six topical lists plus the raw diaspora feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewsLists {
    pub us_india: Vec<NewsRecord>,
    pub china_india: Vec<NewsRecord>,
    pub ai_tech: Vec<NewsRecord>,
    pub trade: Vec<NewsRecord>,
    pub human_rights: Vec<NewsRecord>,
    pub fact_check: Vec<NewsRecord>,
    pub diaspora_raw: Vec<NewsRecord>,
}

impl NewsLists {
    pub fn get(&self, category: Category) -> Option<&Vec<NewsRecord>> {
        match category {
            Category::UsIndia => Some(&self.us_india),
            Category::ChinaIndia => Some(&self.china_india),
            Category::AiTech => Some(&self.ai_tech),
            Category::Trade => Some(&self.trade),
            Category::HumanRights => Some(&self.human_rights),
            Category::FactCheck => Some(&self.fact_check),
            Category::DiasporaSafety => Some(&self.diaspora_raw),
            Category::General => None,
        }
    }

    fn get_mut(&mut self, category: Category) -> Option<&mut Vec<NewsRecord>> {
        match category {
            Category::UsIndia => Some(&mut self.us_india),
            Category::ChinaIndia => Some(&mut self.china_india),
            Category::AiTech => Some(&mut self.ai_tech),
            Category::Trade => Some(&mut self.trade),
            Category::HumanRights => Some(&mut self.human_rights),
            Category::FactCheck => Some(&mut self.fact_check),
            Category::DiasporaSafety => Some(&mut self.diaspora_raw),
            Category::General => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackerSnapshot {
    pub news: NewsLists,
    pub risks: Vec<CountryRiskRecord>,
    pub markers: Vec<GeoMarker>,
    pub seismic: Vec<SeismicEvent>,
    pub market: MarketSnapshot,
    /// Unix seconds of the last merged cycle.
    pub last_cycle_at: Option<i64>,
}

/// Everything one cycle produced, ready to be merged.
#[derive(Debug, Clone, Default)]
pub struct CycleBatch {
    pub news: Vec<(Category, Vec<NewsRecord>)>,
    pub risks: Vec<CountryRiskRecord>,
    pub markers: Vec<GeoMarker>,
    pub seismic: Vec<SeismicEvent>,
    pub market: MarketSnapshot,
}

#[derive(Debug, Default)]
struct Inner {
    snapshot: TrackerSnapshot,
    ledger: FirstSeenLedger,
}

#[derive(Debug, Default)]
pub struct TrackerState {
    inner: RwLock<Inner>,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        self.read(|s| s.clone())
    }

    pub fn read<R>(&self, f: impl FnOnce(&TrackerSnapshot) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard.snapshot)
    }

    pub fn market(&self) -> MarketSnapshot {
        self.read(|s| s.market.clone())
    }

    /// Reconcile one cycle's output into the accumulated state.
    pub fn apply(&self, batch: CycleBatch, now: i64) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let Inner { snapshot, ledger } = &mut *guard;

        for (category, incoming) in batch.news {
            match snapshot.news.get_mut(category) {
                Some(list) => {
                    let existing = std::mem::take(list);
                    *list = merge_news(existing, incoming);
                }
                None => {
                    tracing::warn!(target: "merge", category = category.label(), "no list for category, batch dropped");
                }
            }
        }

        let markers = std::mem::take(&mut snapshot.markers);
        snapshot.markers = merge_markers(markers, batch.markers, now);
        snapshot.seismic = merge_seismic(ledger, batch.seismic, now);
        snapshot.risks = batch.risks;
        snapshot.market = batch.market;
        snapshot.last_cycle_at = Some(now);
    }
}
