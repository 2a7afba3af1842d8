use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::FromRow;

/// A listing joined with its seller and category names.
///
/// `image_urls` is kept as raw JSON: rows written before normalization was
/// enforced may hold strings or other shapes, so readers run it through the
/// normalizer instead of trusting it.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: i32,
    pub user_id: i32,
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub price: Option<Decimal>,
    pub location: Option<String>,
    pub image_urls: Value,
    pub contact_info: String,
    pub is_active: bool,
    pub is_sold: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub seller_username: Option<String>,
    pub category_name: Option<String>,
}
