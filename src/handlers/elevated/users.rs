// handlers/elevated/users.rs - /api/admin/users

use axum::{
    extract::State,
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::api::{Page, PageParams, Path, Query};
use crate::database::{models::User, users};
use crate::error::ApiError;
use crate::state::AppState;
use crate::uploads::stored_image_urls;

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub search: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = Page::new(&params, &state.config.api);
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let (items, total) = users::list(&state.db, search, page.limit(), page.offset()).await?;

    Ok(Json(json!({
        "users": items,
        "total": total,
        "pages": page.pages(total),
        "current_page": page.page
    })))
}

pub async fn toggle_active(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
    Path(user_id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    if user_id == admin.id {
        return Err(ApiError::bad_request("Cannot deactivate your own account"));
    }

    let user = users::toggle_active(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let action = if user.is_active { "activated" } else { "deactivated" };
    info!("Admin {} {} user {}", admin.id, action, user_id);

    Ok(Json(json!({
        "message": format!("User {} successfully", action),
        "user": user
    })))
}

/// Removes the user with their notifications, listings and listing images
pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
    Path(user_id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    if user_id == admin.id {
        return Err(ApiError::bad_request("Cannot delete your own account"));
    }

    let deleted = users::delete_cascade(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let image_urls: Vec<String> = deleted.image_urls.iter().flat_map(stored_image_urls).collect();
    let deleted_images_count = state.uploads.delete_product_images(&image_urls).await;
    info!(
        "Admin {} deleted user {} with {} products",
        admin.id, user_id, deleted.product_count
    );

    Ok(Json(json!({
        "message": "User and their data deleted successfully",
        "deleted_user": {
            "id": deleted.user.id,
            "username": deleted.user.username,
            "email": deleted.user.email
        },
        "deleted_products_count": deleted.product_count,
        "deleted_images_count": deleted_images_count
    })))
}
