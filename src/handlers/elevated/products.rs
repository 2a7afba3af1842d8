// handlers/elevated/products.rs - /api/admin/products

use axum::{
    extract::State,
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::api::{Page, PageParams, Path, ProductView, Query};
use crate::database::models::User;
use crate::database::products::{self, ProductFilter};
use crate::error::ApiError;
use crate::state::AppState;
use crate::uploads::stored_image_urls;

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    /// `all` (default), `active` or `inactive`
    pub status: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = Page::new(&params, &state.config.api);
    let filter = ProductFilter {
        active: match query.status.as_deref() {
            Some("active") => Some(true),
            Some("inactive") => Some(false),
            _ => None,
        },
        ..Default::default()
    };

    let (rows, total) = products::list(&state.db, &filter, page.limit(), page.offset()).await?;

    Ok(Json(json!({
        "products": ProductView::from_rows(rows, &state.images),
        "total": total,
        "pages": page.pages(total),
        "current_page": page.page
    })))
}

pub async fn toggle_active(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let row = products::toggle_active(&state.db, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    let action = if row.is_active { "activated" } else { "deactivated" };
    info!("Product {} {}", product_id, action);

    Ok(Json(json!({
        "message": format!("Product {} successfully", action),
        "product": ProductView::from_row(row, &state.images)
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
    Path(product_id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let existing = products::find(&state.db, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    let images = products::delete(&state.db, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    let deleted_images_count = state
        .uploads
        .delete_product_images(&stored_image_urls(&images))
        .await;
    info!("Admin {} permanently deleted product {}", admin.id, product_id);

    Ok(Json(json!({
        "message": "Product permanently deleted",
        "deleted_product": {
            "id": existing.id,
            "name": existing.name,
            "seller_id": existing.user_id
        },
        "deleted_images_count": deleted_images_count
    })))
}
