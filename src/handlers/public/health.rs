// handlers/public/health.rs - GET /health, GET /api/health

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::database::DatabaseManager;
use crate::state::AppState;

/// Liveness plus a database ping; 503 while the database is unreachable
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match DatabaseManager::health_check(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "service": "marketplace-api",
                "database": "connected"
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": "marketplace-api",
                    "database": "disconnected"
                })),
            )
        }
    }
}
