// handlers/elevated/categories.rs - category administration

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::api::Path;
use crate::database::{categories, products};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// All categories with how many listings use each
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let categories = categories::list_with_counts(&state.db).await?;
    Ok(Json(json!({ "categories": categories })))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::from_json_rejection(e, "Category name is required"))?;
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("Category name is required"))?;

    // Unique violation surfaces as "Category already exists"
    let category = categories::create(&state.db, name, req.description.as_deref().unwrap_or("")).await?;
    info!("Created category {} ({})", category.id, category.name);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Category created successfully",
            "category": category
        })),
    ))
}

/// Refused while any listing still references the category
pub async fn delete(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    if categories::find(&state.db, category_id).await?.is_none() {
        return Err(ApiError::not_found("Category not found"));
    }

    let product_count = products::count_by_category(&state.db, category_id).await?;
    if product_count > 0 {
        return Err(ApiError::bad_request(format!(
            "Cannot delete category with {} products. Move products first.",
            product_count
        )));
    }

    if !categories::delete(&state.db, category_id).await? {
        return Err(ApiError::not_found("Category not found"));
    }
    info!("Deleted category {}", category_id);

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
