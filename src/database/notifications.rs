use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::models::Notification;

const NOTIFICATION_COLUMNS: &str = "id, user_id, message, is_read, is_admin_notification, created_at";

/// A user's notifications newest first, with the unpaginated total
pub async fn list_for_user(
    pool: &PgPool,
    user_id: i32,
    unread_only: bool,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Notification>, i64), DatabaseError> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM notifications WHERE user_id = ");
    count.push_bind(user_id);
    if unread_only {
        count.push(" AND is_read = FALSE");
    }
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {} FROM notifications WHERE user_id = ",
        NOTIFICATION_COLUMNS
    ));
    query.push_bind(user_id);
    if unread_only {
        query.push(" AND is_read = FALSE");
    }
    query
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let notifications = query.build_query_as::<Notification>().fetch_all(pool).await?;

    Ok((notifications, total))
}

pub async fn unread_count(pool: &PgPool, user_id: i32) -> Result<i64, DatabaseError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Mark one of the user's notifications read; `None` if it is not theirs
pub async fn mark_read(
    pool: &PgPool,
    id: i32,
    user_id: i32,
) -> Result<Option<Notification>, DatabaseError> {
    let notification = sqlx::query_as::<_, Notification>(&format!(
        "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2 RETURNING {}",
        NOTIFICATION_COLUMNS
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(notification)
}

pub async fn mark_all_read(pool: &PgPool, user_id: i32) -> Result<u64, DatabaseError> {
    let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Send an admin notification to every active user; returns how many got one
pub async fn broadcast(pool: &PgPool, message: &str) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "INSERT INTO notifications (user_id, message, is_admin_notification)
         SELECT id, $1, TRUE FROM users WHERE is_active = TRUE",
    )
    .bind(message)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
