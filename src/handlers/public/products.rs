// handlers/public/products.rs - GET /api/products, GET /api/products/:id

use axum::{
    extract::State,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::api::{Page, PageParams, Path, ProductView, Query};
use crate::database::products::{self, ProductFilter};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category_id: Option<i32>,
    pub search: Option<String>,
}

/// Active listings, newest first, filtered by category and/or text search
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = Page::new(&params, &state.config.api);
    let filter = ProductFilter {
        active: Some(true),
        category_id: query.category_id,
        search: query.search.map(|s| s.trim().to_string()),
        ..Default::default()
    };

    let (rows, total) = products::list(&state.db, &filter, page.limit(), page.offset()).await?;
    debug!("Found {} products, {} on page {}", total, rows.len(), page.page);

    Ok(Json(json!({
        "products": ProductView::from_rows(rows, &state.images),
        "total": total,
        "pages": page.pages(total),
        "current_page": page.page
    })))
}

pub async fn get(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let row = products::find_active(&state.db, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    Ok(Json(json!({
        "product": ProductView::from_row(row, &state.images)
    })))
}
