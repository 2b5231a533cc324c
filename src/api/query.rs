use super::ApiError;
use crate::agent::AgentId;
use crate::client::ContinuousScan;
use crate::dashboard::{AgentStateView, AttackView, Dashboard, MonitorView, ScanSummary};
use crate::index::{EntityIndex, EntityRecord, Page};
use crate::observation::{LocationEstimate, Sample};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query parameters for entity listing
#[derive(Deserialize)]
pub struct PageParams {
    /// 1-based page; the index's current page when omitted
    pub page: Option<usize>,
    /// Relative move from the current page, used when `page` is absent
    pub delta: Option<i64>,
}

#[derive(Deserialize)]
pub struct AttackParams {
    pub network_page: Option<usize>,
    pub client_page: Option<usize>,
}

/// Entity detail: record plus the evidence behind its position
#[derive(Serialize)]
pub struct EntityDetail {
    #[serde(flatten)]
    pub record: EntityRecord,
    pub estimate: LocationEstimate,
    pub samples: Vec<Sample>,
}

/// Create view API router
pub fn create_query_router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/api/wifi", get(list_wifi))
        .route("/api/wifi/:address", get(get_wifi))
        .route("/api/bluetooth", get(list_bluetooth))
        .route("/api/bluetooth/:address", get(get_bluetooth))
        .route("/api/agents/state", get(agent_states))
        .route("/api/agents/:id/monitor", get(monitor_map))
        .route("/api/agents/:id/attack", get(attack_results))
        .route("/api/scans/recent", get(recent_scans))
        .route("/api/scans/continuous", get(continuous_scans))
        .with_state(dashboard)
}

fn page_of(index: &EntityIndex, params: &PageParams) -> Page<EntityRecord> {
    match (params.page, params.delta) {
        (Some(number), _) => index.goto_page(number),
        (None, Some(delta)) => index.change_page(delta),
        (None, None) => index.page(),
    }
}

fn detail_of(index: &EntityIndex, address: &str) -> Result<EntityDetail, ApiError> {
    let record = index
        .get(address)
        .ok_or_else(|| ApiError::NotFound(format!("No entity with address {}", address)))?;
    let now_ms = Utc::now().timestamp_millis();
    Ok(EntityDetail {
        estimate: index.estimate_for(&record.address, now_ms),
        samples: index.samples_for(&record.address, now_ms),
        record,
    })
}

/// GET /api/wifi?page=|delta= - Page of wifi networks and clients, newest first
async fn list_wifi(
    State(dashboard): State<Arc<Dashboard>>,
    Query(params): Query<PageParams>,
) -> Json<Page<EntityRecord>> {
    Json(page_of(dashboard.wifi(), &params))
}

/// GET /api/wifi/:address
async fn get_wifi(
    State(dashboard): State<Arc<Dashboard>>,
    Path(address): Path<String>,
) -> Result<Json<EntityDetail>, ApiError> {
    detail_of(dashboard.wifi(), &address).map(Json)
}

/// GET /api/bluetooth?page=|delta= - Page of Bluetooth devices, newest first
async fn list_bluetooth(
    State(dashboard): State<Arc<Dashboard>>,
    Query(params): Query<PageParams>,
) -> Json<Page<EntityRecord>> {
    Json(page_of(dashboard.bluetooth(), &params))
}

/// GET /api/bluetooth/:address
async fn get_bluetooth(
    State(dashboard): State<Arc<Dashboard>>,
    Path(address): Path<String>,
) -> Result<Json<EntityDetail>, ApiError> {
    detail_of(dashboard.bluetooth(), &address).map(Json)
}

/// GET /api/agents/state - Scan state, focus and polling flags per agent
async fn agent_states(State(dashboard): State<Arc<Dashboard>>) -> Json<Vec<AgentStateView>> {
    Json(dashboard.agent_states())
}

/// GET /api/agents/:id/monitor - Effective monitor map
async fn monitor_map(
    State(dashboard): State<Arc<Dashboard>>,
    Path(id): Path<AgentId>,
) -> Result<Json<MonitorView>, ApiError> {
    dashboard
        .monitor_view(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown agent {}", id)))
}

/// GET /api/agents/:id/attack - Paged attack-scan results
async fn attack_results(
    State(dashboard): State<Arc<Dashboard>>,
    Path(id): Path<AgentId>,
    Query(params): Query<AttackParams>,
) -> Result<Json<AttackView>, ApiError> {
    dashboard
        .attack_view(
            id,
            params.network_page.unwrap_or(1),
            params.client_page.unwrap_or(1),
        )
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No attack results for agent {}", id)))
}

/// GET /api/scans/recent
async fn recent_scans(State(dashboard): State<Arc<Dashboard>>) -> Json<Vec<ScanSummary>> {
    Json(dashboard.recent_scans())
}

/// GET /api/scans/continuous
async fn continuous_scans(State(dashboard): State<Arc<Dashboard>>) -> Json<Vec<ContinuousScan>> {
    Json(dashboard.continuous_scans())
}
