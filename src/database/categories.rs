use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{Category, CategoryWithCount};

pub async fn list(pool: &PgPool) -> Result<Vec<Category>, DatabaseError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, created_at FROM categories ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<CategoryWithCount>, DatabaseError> {
    let categories = sqlx::query_as::<_, CategoryWithCount>(
        "SELECT c.id, c.name, c.description, c.created_at, COUNT(p.id) AS product_count
         FROM categories c
         LEFT JOIN products p ON p.category_id = c.id
         GROUP BY c.id
         ORDER BY c.name",
    )
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

pub async fn find(pool: &PgPool, id: i32) -> Result<Option<Category>, DatabaseError> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, created_at FROM categories WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(category)
}

pub async fn exists(pool: &PgPool, id: i32) -> Result<bool, DatabaseError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

pub async fn create(pool: &PgPool, name: &str, description: &str) -> Result<Category, DatabaseError> {
    sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, description) VALUES ($1, $2)
         RETURNING id, name, description, created_at",
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Category"))
}

/// Insert unless a category with that name exists; true when inserted
pub async fn ensure(pool: &PgPool, name: &str, description: &str) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "INSERT INTO categories (name, description) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
    )
    .bind(name)
    .bind(description)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
