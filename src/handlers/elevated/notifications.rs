// handlers/elevated/notifications.rs - POST /api/notifications/broadcast

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::database::{models::User, notifications};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub message: Option<String>,
}

/// Sends an admin notification to every active user
pub async fn broadcast(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
    payload: Result<Json<BroadcastRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::from_json_rejection(e, "Notification message is required"))?;
    let message = req
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Notification message is required"))?;

    let notified = notifications::broadcast(&state.db, &message).await?;
    info!("Admin {} broadcast a notification to {} users", admin.id, notified);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Notification sent to {} users", notified),
            "users_notified": notified
        })),
    ))
}
