// handlers/elevated/dashboard.rs - GET /api/admin/dashboard[/stats]

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::database::stats;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let stats = stats::dashboard(&state.db).await?;
    Ok(Json(json!({ "stats": stats })))
}
