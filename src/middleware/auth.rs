use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::{AuthError, Role, TokenService};
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Verifies the bearer token and injects the resolved [`User`] into the
/// request extensions for handlers to extract with `Extension<User>`.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(|e| {
        warn!("Rejected request to {}: {}", request.uri().path(), e);
        e
    })?;

    let user = state.tokens.verify(token).await.map_err(|e| {
        warn!("Rejected token for {}: {}", request.uri().path(), e);
        e
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Admin gate. Must run after [`require_auth`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<User>()
        .ok_or(AuthError::MissingToken)?;

    TokenService::require_role(user, Role::Admin).map_err(|e| {
        warn!("User {} denied admin route {}", user.id, request.uri().path());
        ApiError::from(e)
    })?;

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidTokenFormat)?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::InvalidTokenFormat),
    }
}
