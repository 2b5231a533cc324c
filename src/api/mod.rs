// View API, actions and push-event intake

mod actions;
mod error;
mod ingestion;
mod query;

pub use actions::create_action_router;
pub use error::ApiError;
pub use ingestion::create_ingestion_router;
pub use query::{create_query_router, EntityDetail};

use crate::dashboard::Dashboard;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Every route, with permissive CORS for a browser view layer.
pub fn create_router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .merge(create_query_router(dashboard.clone()))
        .merge(create_action_router(dashboard.clone()))
        .merge(create_ingestion_router(dashboard))
        .layer(CorsLayer::permissive())
}
