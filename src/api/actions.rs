use super::ApiError;
use crate::agent::AgentId;
use crate::agent::Agent;
use crate::client::{AgentRegistration, CaptureRequest, DeauthRequest};
use crate::dashboard::{AgentDetail, AttackStatus, Dashboard, Launched, ScanLaunch};
use crate::scan_state::ScanState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct InterfaceRequest {
    pub interface: String,
}

#[derive(Deserialize)]
pub struct StopContinuousRequest {
    pub agent_id: AgentId,
    #[serde(default)]
    pub interface: Option<String>,
    pub scan_type: String,
}

#[derive(Serialize)]
pub struct MonitorStarted {
    pub alias: Option<String>,
}

#[derive(Serialize)]
pub struct Done {
    pub status: &'static str,
}

/// Create action router (agents, focus, monitor mode, attack tools, launches)
pub fn create_action_router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/api/agents", post(register_agent))
        .route("/api/agents/:id", delete(delete_agent))
        .route("/api/agents/:id/focus", post(focus_agent))
        .route("/api/agents/:id/monitor/start", post(start_monitor))
        .route("/api/agents/:id/monitor/stop", post(stop_monitor))
        .route("/api/agents/:id/attack/start", post(start_attack))
        .route("/api/agents/:id/attack/stop", post(stop_attack))
        .route("/api/agents/:id/attack/status", get(attack_status))
        .route("/api/agents/:id/deauth", post(start_deauth))
        .route("/api/agents/:id/deauth/stopall", post(stop_all_deauths))
        .route("/api/agents/:id/capture", post(start_capture))
        .route("/api/scans", post(launch_scan))
        .route("/api/scans/continuous/stop", post(stop_continuous))
        .with_state(dashboard)
}

/// POST /api/agents - Register an agent with the controller
async fn register_agent(
    State(dashboard): State<Arc<Dashboard>>,
    Json(registration): Json<AgentRegistration>,
) -> Result<(StatusCode, Json<Agent>), ApiError> {
    let agent = dashboard.register_agent(&registration).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

/// DELETE /api/agents/:id
async fn delete_agent(
    State(dashboard): State<Arc<Dashboard>>,
    Path(id): Path<AgentId>,
) -> Result<Json<Done>, ApiError> {
    dashboard.delete_agent(id).await?;
    Ok(Json(Done { status: "deleted" }))
}

/// POST /api/agents/:id/focus
async fn focus_agent(
    State(dashboard): State<Arc<Dashboard>>,
    Path(id): Path<AgentId>,
) -> Result<Json<AgentDetail>, ApiError> {
    dashboard
        .focus_agent(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown agent {}", id)))
}

/// POST /api/agents/:id/monitor/start - `{interface}` is the managed interface
async fn start_monitor(
    State(dashboard): State<Arc<Dashboard>>,
    Path(id): Path<AgentId>,
    Json(request): Json<InterfaceRequest>,
) -> Result<Json<MonitorStarted>, ApiError> {
    let alias = dashboard.start_monitor_mode(id, &request.interface).await?;
    Ok(Json(MonitorStarted { alias }))
}

/// POST /api/agents/:id/monitor/stop - `{interface}` is the managed interface
async fn stop_monitor(
    State(dashboard): State<Arc<Dashboard>>,
    Path(id): Path<AgentId>,
    Json(request): Json<InterfaceRequest>,
) -> Result<Json<Done>, ApiError> {
    dashboard.stop_monitor_mode(id, &request.interface).await?;
    Ok(Json(Done { status: "stopped" }))
}

/// POST /api/agents/:id/attack/start - `{interface}` is the monitor alias
async fn start_attack(
    State(dashboard): State<Arc<Dashboard>>,
    Path(id): Path<AgentId>,
    Json(request): Json<InterfaceRequest>,
) -> Result<Json<ScanState>, ApiError> {
    Ok(Json(dashboard.start_attack_scan(id, &request.interface).await?))
}

/// POST /api/agents/:id/attack/stop
async fn stop_attack(
    State(dashboard): State<Arc<Dashboard>>,
    Path(id): Path<AgentId>,
    Json(request): Json<InterfaceRequest>,
) -> Result<Json<ScanState>, ApiError> {
    Ok(Json(dashboard.stop_attack_scan(id, &request.interface).await?))
}

/// POST /api/scans - Launch form; continuous wifi launches start a loop
async fn launch_scan(
    State(dashboard): State<Arc<Dashboard>>,
    Json(launch): Json<ScanLaunch>,
) -> Result<Json<Launched>, ApiError> {
    Ok(Json(dashboard.launch_scan(&launch).await?))
}

/// POST /api/scans/continuous/stop
async fn stop_continuous(
    State(dashboard): State<Arc<Dashboard>>,
    Json(request): Json<StopContinuousRequest>,
) -> Result<Json<Done>, ApiError> {
    dashboard
        .stop_continuous_scan(request.agent_id, request.interface, &request.scan_type)
        .await?;
    Ok(Json(Done { status: "stopped" }))
}

/// GET /api/agents/:id/attack/status?interface= - One-off status read
async fn attack_status(
    State(dashboard): State<Arc<Dashboard>>,
    Path(id): Path<AgentId>,
    Query(request): Query<InterfaceRequest>,
) -> Result<Json<AttackStatus>, ApiError> {
    Ok(Json(dashboard.attack_scan_status(id, &request.interface).await?))
}

/// POST /api/agents/:id/deauth
async fn start_deauth(
    State(dashboard): State<Arc<Dashboard>>,
    Path(id): Path<AgentId>,
    Json(request): Json<DeauthRequest>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(dashboard.start_deauth(id, &request).await?))
}

/// POST /api/agents/:id/deauth/stopall - `{interface}` is the monitor alias
async fn stop_all_deauths(
    State(dashboard): State<Arc<Dashboard>>,
    Path(id): Path<AgentId>,
    Json(request): Json<InterfaceRequest>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(dashboard.stop_all_deauths(id, &request.interface).await?))
}

/// POST /api/agents/:id/capture
async fn start_capture(
    State(dashboard): State<Arc<Dashboard>>,
    Path(id): Path<AgentId>,
    Json(request): Json<CaptureRequest>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(dashboard.start_capture(id, &request).await?))
}
