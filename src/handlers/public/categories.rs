// handlers/public/categories.rs - GET /api/categories

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::database::categories;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let categories = categories::list(&state.db).await?;
    Ok(Json(json!({ "categories": categories })))
}
