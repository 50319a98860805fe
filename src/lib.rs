// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod gazetteer;
pub mod geo;
pub mod ingest;
pub mod merge;
pub mod metrics;
pub mod orchestrator;
pub mod risk;
pub mod state;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::TrackerConfig;
pub use crate::error::FetchError;
pub use crate::orchestrator::{CycleOutcome, CycleReport, Orchestrator};
pub use crate::state::{TrackerSnapshot, TrackerState};
