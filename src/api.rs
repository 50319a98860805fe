use std::sync::Arc;

use shuttle_axum::axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::gazetteer::{Hotspot, STATIC_HOTSPOTS};
use crate::ingest::types::Category;
use crate::orchestrator::Orchestrator;
use crate::state::TrackerSnapshot;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/snapshot", get(snapshot))
        .route("/api/news/{category}", get(news))
        .route("/api/risks", get(risks))
        .route("/api/markers", get(markers))
        .route("/api/seismic", get(seismic))
        .route("/api/market", get(market))
        .route("/api/hotspots", get(hotspots))
        .route("/api/refresh", post(refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct SnapshotResp {
    syncing: bool,
    #[serde(flatten)]
    snapshot: TrackerSnapshot,
}

async fn snapshot(State(st): State<AppState>) -> Json<SnapshotResp> {
    Json(SnapshotResp {
        syncing: st.orchestrator.is_running(),
        snapshot: st.orchestrator.state().snapshot(),
    })
}

async fn news(State(st): State<AppState>, Path(slug): Path<String>) -> Response {
    let Some(category) = Category::from_slug(&slug) else {
        return (StatusCode::NOT_FOUND, format!("unknown category: {slug}")).into_response();
    };
    let list = st
        .orchestrator
        .state()
        .read(|s| s.news.get(category).cloned());
    match list {
        Some(items) => Json(items).into_response(),
        None => (StatusCode::NOT_FOUND, format!("no list for category: {slug}")).into_response(),
    }
}

async fn risks(State(st): State<AppState>) -> impl IntoResponse {
    Json(st.orchestrator.state().read(|s| s.risks.clone()))
}

async fn markers(State(st): State<AppState>) -> impl IntoResponse {
    Json(st.orchestrator.state().read(|s| s.markers.clone()))
}

async fn seismic(State(st): State<AppState>) -> impl IntoResponse {
    Json(st.orchestrator.state().read(|s| s.seismic.clone()))
}

async fn market(State(st): State<AppState>) -> impl IntoResponse {
    Json(st.orchestrator.state().market())
}

async fn hotspots() -> Json<&'static [Hotspot]> {
    Json(STATIC_HOTSPOTS)
}

#[derive(serde::Serialize)]
struct RefreshResp {
    started: bool,
}

async fn refresh(State(st): State<AppState>) -> (StatusCode, Json<RefreshResp>) {
    let started = st.orchestrator.trigger();
    tracing::info!(target: "api", started, "manual refresh requested");
    (StatusCode::ACCEPTED, Json(RefreshResp { started }))
}
