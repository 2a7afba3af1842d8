// handlers/protected/notifications.rs - the caller's notification inbox

use axum::{
    extract::State,
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{Page, PageParams, Path, Query};
use crate::database::{models::User, notifications};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    pub unread_only: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(params): Query<PageParams>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = Page::new(&params, &state.config.api);
    let unread_only = query
        .unread_only
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let (items, total) =
        notifications::list_for_user(&state.db, user.id, unread_only, page.limit(), page.offset()).await?;
    let unread_count = notifications::unread_count(&state.db, user.id).await?;

    Ok(Json(json!({
        "notifications": items,
        "total": total,
        "unread_count": unread_count,
        "pages": page.pages(total),
        "current_page": page.page
    })))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(notification_id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let notification = notifications::mark_read(&state.db, notification_id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;

    Ok(Json(json!({
        "message": "Notification marked as read",
        "notification": notification
    })))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, ApiError> {
    notifications::mark_all_read(&state.db, user.id).await?;
    Ok(Json(json!({ "message": "All notifications marked as read" })))
}
