// handlers/public/auth.rs - POST /api/auth/register, POST /api/auth/login

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::database::users::{self, NewUser};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/**
 * POST /api/auth/register - Create an account and return a session token
 *
 * Input: `{ "username", "email", "password" }`
 * Output (201): `{ "message", "token", "user" }`
 */
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::from_json_rejection(e, "Missing required fields"))?;

    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();
    if username.is_empty() {
        return Err(ApiError::bad_request("Missing required fields"));
    }

    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }

    if users::username_exists(&state.db, &username).await? {
        return Err(ApiError::bad_request("Username already exists"));
    }
    if users::email_exists(&state.db, &email).await? {
        return Err(ApiError::bad_request("Email already registered"));
    }

    let min_len = state.config.security.min_password_length;
    if req.password.chars().count() < min_len {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            min_len
        )));
    }

    let password_hash = hash_password_blocking(req.password).await?;
    let user = users::create(
        &state.db,
        NewUser {
            username,
            email,
            password_hash,
            is_admin: false,
        },
    )
    .await?;

    let token = state.tokens.issue_default(user.id)?;
    info!("Registered user {} ({})", user.id, user.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "token": token,
            "user": user
        })),
    ))
}

/**
 * POST /api/auth/login - Exchange email and password for a session token
 *
 * Input: `{ "email", "password" }`
 * Output: `{ "message", "token", "user" }`
 */
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::from_json_rejection(e, "Email and password required"))?;
    let email = req.email.trim().to_lowercase();

    let Some(user) = users::find_by_email(&state.db, &email).await? else {
        warn!("Login failed for unknown email");
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    let matches = match verify_password_blocking(req.password, user.password_hash.clone()).await {
        Ok(matches) => matches,
        Err(crate::auth::PasswordError::InvalidHash) => {
            warn!("User {} has an unreadable password hash", user.id);
            false
        }
        Err(e) => return Err(e.into()),
    };
    if !matches {
        warn!("Login failed for user {}", user.id);
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    if !user.is_active {
        return Err(ApiError::unauthorized("Account is deactivated"));
    }

    let token = state.tokens.issue_default(user.id)?;
    info!("User {} logged in", user.id);

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": user
    })))
}

/// Shape check equivalent to `^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$`
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty()
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'))
    {
        return false;
    }
    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
    {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}
