use super::ApiError;
use crate::dashboard::Dashboard;
use crate::event::ScanEvent;
use crate::ingest::IngestSummary;
use axum::{body::Bytes, extract::State, response::Json, routing::post, Router};
use std::sync::Arc;
use tracing::{info, warn};

/// Create push-event intake router
pub fn create_ingestion_router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/api/scan-events", post(receive_scan_event))
        .with_state(dashboard)
}

/// POST /api/scan-events - Apply one decoded push message
async fn receive_scan_event(
    State(dashboard): State<Arc<Dashboard>>,
    body: Bytes,
) -> Result<Json<IngestSummary>, ApiError> {
    let event: ScanEvent = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected scan event");
        ApiError::BadRequest(e.to_string())
    })?;

    info!(
        event = event.name(),
        agent_id = %event.body().agent_id,
        scan_id = ?event.body().scan_id,
        "Received scan event"
    );

    Ok(Json(dashboard.handle_scan_event(&event).await))
}
