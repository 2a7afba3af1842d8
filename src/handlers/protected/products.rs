// handlers/protected/products.rs - listing create/update/delete and "my products"

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::info;

use crate::api::{Page, PageParams, Path, ProductView, Query};
use crate::database::models::{ProductRow, User};
use crate::database::products::{self, NewProduct, ProductChanges, ProductFilter};
use crate::database::categories;
use crate::error::ApiError;
use crate::state::AppState;
use crate::uploads::stored_image_urls;

const MISSING_PRODUCT_FIELDS: &str = "Missing required fields: name, description, category_id, contact_info";

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub category_id: i32,
    pub contact_info: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub location: Option<String>,
    /// Any shape; normalized before it is stored
    #[serde(default)]
    pub image_urls: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    #[serde(default, deserialize_with = "present")]
    pub price: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "present")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub image_urls: Option<Value>,
    pub contact_info: Option<String>,
    pub is_active: Option<bool>,
    pub is_sold: Option<bool>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`)
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A required field may be left out of an update but not blanked
fn required_change(value: Option<String>) -> Result<Option<String>, ApiError> {
    value
        .map(|v| non_blank(&v).ok_or_else(|| ApiError::bad_request(MISSING_PRODUCT_FIELDS)))
        .transpose()
}

fn ensure_can_modify(user: &User, row: &ProductRow, action: &str) -> Result<(), ApiError> {
    if row.user_id != user.id && !user.is_admin {
        return Err(ApiError::forbidden(format!("Unauthorized to {} this product", action)));
    }
    Ok(())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::from_json_rejection(e, MISSING_PRODUCT_FIELDS))?;

    let (Some(name), Some(description), Some(contact_info)) = (
        non_blank(&req.name),
        non_blank(&req.description),
        non_blank(&req.contact_info),
    ) else {
        return Err(ApiError::bad_request(MISSING_PRODUCT_FIELDS));
    };

    if !categories::exists(&state.db, req.category_id).await? {
        return Err(ApiError::bad_request("Invalid category"));
    }

    let image_urls = state.images.normalize(&req.image_urls);
    let row = products::create(
        &state.db,
        NewProduct {
            user_id: user.id,
            category_id: req.category_id,
            name,
            description,
            price: req.price,
            location: req.location.as_deref().and_then(non_blank),
            image_urls,
            contact_info,
        },
    )
    .await?;
    info!("User {} created product {}", user.id, row.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product created successfully",
            "product": ProductView::from_row(row, &state.images)
        })),
    ))
}

/// Partial update by the owner or an admin. Images dropped from the list are
/// removed from disk once the update is stored.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(product_id): Path<i32>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload.map_err(ApiError::from)?;
    let name = required_change(req.name)?;
    let description = required_change(req.description)?;
    let contact_info = required_change(req.contact_info)?;

    let existing = products::find(&state.db, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    ensure_can_modify(&user, &existing, "update")?;

    if let Some(category_id) = req.category_id {
        if !categories::exists(&state.db, category_id).await? {
            return Err(ApiError::bad_request("Invalid category"));
        }
    }

    let new_images = req
        .image_urls
        .as_ref()
        .map(|raw| state.images.normalize(raw));

    let removed: Vec<String> = match &new_images {
        Some(kept) => stored_image_urls(&existing.image_urls)
            .into_iter()
            .filter(|old| match state.images.normalize(&Value::String(old.clone())).first() {
                Some(absolute) => !kept.contains(absolute),
                None => true,
            })
            .collect(),
        None => Vec::new(),
    };

    let changes = ProductChanges {
        name,
        description,
        category_id: req.category_id,
        price: req.price,
        location: req.location.map(|loc| loc.as_deref().and_then(non_blank)),
        image_urls: new_images,
        contact_info,
        is_active: req.is_active.filter(|_| user.is_admin),
        is_sold: req.is_sold,
    };

    let row = products::update(&state.db, product_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    if !removed.is_empty() {
        state.uploads.delete_product_images(&removed).await;
    }
    info!("User {} updated product {}", user.id, product_id);

    Ok(Json(json!({
        "message": "Product updated successfully",
        "product": ProductView::from_row(row, &state.images)
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(product_id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let existing = products::find(&state.db, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    ensure_can_modify(&user, &existing, "delete")?;

    let images = products::delete(&state.db, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    let deleted_images_count = state
        .uploads
        .delete_product_images(&stored_image_urls(&images))
        .await;
    info!("User {} deleted product {}", user.id, product_id);

    Ok(Json(json!({
        "message": "Product deleted successfully",
        "deleted_images_count": deleted_images_count
    })))
}

/// The caller's own listings in every state
pub async fn my_products(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, ApiError> {
    let page = Page::new(&params, &state.config.api);
    let filter = ProductFilter {
        user_id: Some(user.id),
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
