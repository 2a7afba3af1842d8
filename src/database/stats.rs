use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;

#[derive(Debug, FromRow)]
struct StatCounts {
    total_users: i64,
    total_products: i64,
    active_products: i64,
    total_categories: i64,
    new_users_week: i64,
    new_products_week: i64,
    users_with_products: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_products: i64,
    pub active_products: i64,
    pub total_categories: i64,
    pub new_users_week: i64,
    pub new_products_week: i64,
    pub users_with_products: i64,
    pub active_users_percentage: f64,
}

pub async fn dashboard(pool: &PgPool) -> Result<DashboardStats, DatabaseError> {
    let counts = sqlx::query_as::<_, StatCounts>(
        "SELECT
            (SELECT COUNT(*) FROM users) AS total_users,
            (SELECT COUNT(*) FROM products) AS total_products,
            (SELECT COUNT(*) FROM products WHERE is_active = TRUE) AS active_products,
            (SELECT COUNT(*) FROM categories) AS total_categories,
            (SELECT COUNT(*) FROM users WHERE created_at >= NOW() - INTERVAL '7 days') AS new_users_week,
            (SELECT COUNT(*) FROM products WHERE created_at >= NOW() - INTERVAL '7 days') AS new_products_week,
            (SELECT COUNT(DISTINCT user_id) FROM products) AS users_with_products",
    )
    .fetch_one(pool)
    .await?;

    Ok(DashboardStats {
        active_users_percentage: active_percentage(counts.users_with_products, counts.total_users),
        total_users: counts.total_users,
        total_products: counts.total_products,
        active_products: counts.active_products,
        total_categories: counts.total_categories,
        new_users_week: counts.new_users_week,
        new_products_week: counts.new_products_week,
        users_with_products: counts.users_with_products,
    })
}

/// Share of users with at least one listing, one decimal place
pub fn active_percentage(users_with_products: i64, total_users: i64) -> f64 {
    if total_users <= 0 {
        return 0.0;
    }
    let pct = users_with_products as f64 / total_users as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}
