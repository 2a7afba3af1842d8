use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::auth::IdentityStore;
use crate::database::manager::DatabaseError;
use crate::database::models::User;

const USER_COLUMNS: &str = "id, username, email, password_hash, is_active, is_admin, created_at";

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// What an administrative delete removed, so callers can clean up files
pub struct DeletedUser {
    pub user: User,
    pub product_count: usize,
    /// Raw `image_urls` column of every deleted listing
    pub image_urls: Vec<Value>,
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, DatabaseError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, DatabaseError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

pub async fn create(pool: &PgPool, new_user: NewUser) -> Result<User, DatabaseError> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, email, password_hash, is_admin) VALUES ($1, $2, $3, $4) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(new_user.username)
    .bind(new_user.email)
    .bind(new_user.password_hash)
    .bind(new_user.is_admin)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "User"))
}

pub async fn update_password(pool: &PgPool, id: i32, password_hash: &str) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("User {}", id)));
    }
    Ok(())
}

/// Users newest first, optionally filtered by username/email substring
pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<User>, i64), DatabaseError> {
    let pattern = search.map(|s| format!("%{}%", s));

    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
    push_search(&mut count, pattern.as_deref());
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM users", USER_COLUMNS));
    push_search(&mut query, pattern.as_deref());
    query
        .push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let users = query.build_query_as::<User>().fetch_all(pool).await?;

    Ok((users, total))
}

fn push_search(qb: &mut QueryBuilder<'_, Postgres>, pattern: Option<&str>) {
    if let Some(pattern) = pattern {
        qb.push(" WHERE username ILIKE ")
            .push_bind(pattern.to_string())
            .push(" OR email ILIKE ")
            .push_bind(pattern.to_string());
    }
}

pub async fn toggle_active(pool: &PgPool, id: i32) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET is_active = NOT is_active WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Delete a user with their notifications and listings in one transaction
pub async fn delete_cascade(pool: &PgPool, id: i32) -> Result<Option<DeletedUser>, DatabaseError> {
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = $1 FOR UPDATE",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(user) = user else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM notifications WHERE user_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let image_urls: Vec<Value> =
        sqlx::query_scalar("DELETE FROM products WHERE user_id = $1 RETURNING image_urls")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Some(DeletedUser {
        user,
        product_count: image_urls.len(),
        image_urls,
    }))
}

/// Identity lookups for token verification, backed by the `users` table
#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_user(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        find_by_id(&self.pool, id).await
    }
}
