use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::models::ProductRow;

const PRODUCT_SELECT: &str = "SELECT p.id, p.user_id, p.category_id, p.name, p.description, p.price, \
     p.location, p.image_urls, p.contact_info, p.is_active, p.is_sold, p.created_at, p.updated_at, \
     u.username AS seller_username, c.name AS category_name \
     FROM products p \
     LEFT JOIN users u ON u.id = p.user_id \
     LEFT JOIN categories c ON c.id = p.category_id";

/// Listing filters; `None` fields are not applied
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub active: Option<bool>,
    pub category_id: Option<i32>,
    pub user_id: Option<i32>,
    pub search: Option<String>,
}

pub struct NewProduct {
    pub user_id: i32,
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub price: Option<Decimal>,
    pub location: Option<String>,
    pub image_urls: Vec<String>,
    pub contact_info: String,
}

/// Partial update. Outer `None` leaves a column alone; for nullable columns
/// `Some(None)` clears it.
#[derive(Debug, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub price: Option<Option<Decimal>>,
    pub location: Option<Option<String>>,
    pub image_urls: Option<Vec<String>>,
    pub contact_info: Option<String>,
    pub is_active: Option<bool>,
    pub is_sold: Option<bool>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    qb.push(" WHERE TRUE");
    if let Some(active) = filter.active {
        qb.push(" AND p.is_active = ").push_bind(active);
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND p.category_id = ").push_bind(category_id);
    }
    if let Some(user_id) = filter.user_id {
        qb.push(" AND p.user_id = ").push_bind(user_id);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Filtered listings newest first, with the unpaginated total
pub async fn list(
    pool: &PgPool,
    filter: &ProductFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<ProductRow>, i64), DatabaseError> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products p");
    push_filters(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut query = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
    push_filters(&mut query, filter);
    query
        .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let rows = query.build_query_as::<ProductRow>().fetch_all(pool).await?;

    Ok((rows, total))
}

pub async fn find(pool: &PgPool, id: i32) -> Result<Option<ProductRow>, DatabaseError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!("{} WHERE p.id = $1", PRODUCT_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_active(pool: &PgPool, id: i32) -> Result<Option<ProductRow>, DatabaseError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "{} WHERE p.id = $1 AND p.is_active = TRUE",
        PRODUCT_SELECT
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create(pool: &PgPool, product: NewProduct) -> Result<ProductRow, DatabaseError> {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO products (user_id, category_id, name, description, price, location, image_urls, contact_info)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING id",
    )
    .bind(product.user_id)
    .bind(product.category_id)
    .bind(product.name)
    .bind(product.description)
    .bind(product.price)
    .bind(product.location)
    .bind(Json(product.image_urls))
    .bind(product.contact_info)
    .fetch_one(pool)
    .await?;

    find(pool, id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("Product {}", id)))
}

/// Apply `changes` and bump `updated_at`; `None` when the listing does not exist
pub async fn update(
    pool: &PgPool,
    id: i32,
    changes: ProductChanges,
) -> Result<Option<ProductRow>, DatabaseError> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE products SET updated_at = NOW()");
    if let Some(name) = changes.name {
        qb.push(", name = ").push_bind(name);
    }
    if let Some(description) = changes.description {
        qb.push(", description = ").push_bind(description);
    }
    if let Some(category_id) = changes.category_id {
        qb.push(", category_id = ").push_bind(category_id);
    }
    if let Some(price) = changes.price {
        qb.push(", price = ").push_bind(price);
    }
    if let Some(location) = changes.location {
        qb.push(", location = ").push_bind(location);
    }
    if let Some(image_urls) = changes.image_urls {
        qb.push(", image_urls = ").push_bind(Json(image_urls));
    }
    if let Some(contact_info) = changes.contact_info {
        qb.push(", contact_info = ").push_bind(contact_info);
    }
    if let Some(is_active) = changes.is_active {
        qb.push(", is_active = ").push_bind(is_active);
    }
    if let Some(is_sold) = changes.is_sold {
        qb.push(", is_sold = ").push_bind(is_sold);
    }
    qb.push(" WHERE id = ").push_bind(id).push(" RETURNING id");

    let updated: Option<i32> = qb.build_query_scalar().fetch_optional(pool).await?;
    match updated {
        Some(id) => find(pool, id).await,
        None => Ok(None),
    }
}

pub async fn toggle_active(pool: &PgPool, id: i32) -> Result<Option<ProductRow>, DatabaseError> {
    let updated: Option<i32> = sqlx::query_scalar(
        "UPDATE products SET is_active = NOT is_active, updated_at = NOW() WHERE id = $1 RETURNING id",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    match updated {
        Some(id) => find(pool, id).await,
        None => Ok(None),
    }
}

/// Hard delete; returns the raw `image_urls` of the removed row
pub async fn delete(pool: &PgPool, id: i32) -> Result<Option<Value>, DatabaseError> {
    let images: Option<Value> = sqlx::query_scalar("DELETE FROM products WHERE id = $1 RETURNING image_urls")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(images)
}

pub async fn count_by_category(pool: &PgPool, category_id: i32) -> Result<i64, DatabaseError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
        .bind(category_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
