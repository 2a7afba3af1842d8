// handlers/protected/auth.rs - /api/auth/me, /api/auth/logout, /api/auth/change-password

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::database::{models::User, users};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn me(Extension(user): Extension<User>) -> Json<Value> {
    Json(json!({ "user": user }))
}

/// Tokens are stateless; the client discards its copy
pub async fn logout(Extension(user): Extension<User>) -> Json<Value> {
    info!("User {} logged out", user.id);
    Json(json!({ "message": "Logout successful" }))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) =
        payload.map_err(|e| ApiError::from_json_rejection(e, "Current and new password required"))?;

    let current_ok = verify_password_blocking(req.current_password, user.password_hash.clone())
        .await
        .unwrap_or(false);
    if !current_ok {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }

    let min_len = state.config.security.min_password_length;
    if req.new_password.chars().count() < min_len {
        return Err(ApiError::bad_request(format!(
            "New password must be at least {} characters",
            min_len
        )));
    }

    let password_hash = hash_password_blocking(req.new_password).await?;
    users::update_password(&state.db, user.id, &password_hash).await?;
    info!("User {} changed their password", user.id);

    Ok(Json(json!({ "message": "Password updated successfully" })))
}
