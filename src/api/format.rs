use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::database::models::ProductRow;
use crate::images::ImageUrlNormalizer;

/// Listing as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: i32,
    pub user_id: i32,
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub price: Option<f64>,
    pub price_display: Option<String>,
    pub location: Option<String>,
    pub image_urls: Vec<String>,
    pub contact_info: String,
    pub is_active: bool,
    pub is_sold: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub seller_username: String,
    pub category_name: String,
}

impl ProductView {
    pub fn from_row(row: ProductRow, images: &ImageUrlNormalizer) -> Self {
        Self {
            image_urls: images.normalize(&row.image_urls),
            price: row.price.and_then(|p| p.to_f64()),
            price_display: row.price.map(price_display),
            id: row.id,
            user_id: row.user_id,
            category_id: row.category_id,
            name: row.name,
            description: row.description,
            location: row.location,
            contact_info: row.contact_info,
            is_active: row.is_active,
            is_sold: row.is_sold,
            created_at: row.created_at,
            updated_at: row.updated_at,
            seller_username: row.seller_username.unwrap_or_else(|| "Unknown".to_string()),
            category_name: row.category_name.unwrap_or_else(|| "Uncategorized".to_string()),
        }
    }

    pub fn from_rows(rows: Vec<ProductRow>, images: &ImageUrlNormalizer) -> Vec<Self> {
        rows.into_iter().map(|row| Self::from_row(row, images)).collect()
    }
}

/// Whole Rwandan francs, half-to-even, space as thousands separator:
/// `1500.50` becomes `"RWF 1 500"`
pub fn price_display(price: Decimal) -> String {
    let whole = price.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = whole.abs().trunc().to_string();
    let sign = if whole.is_sign_negative() && !whole.is_zero() { "-" } else { "" };
    format!("RWF {}{}", sign, group_thousands(&digits))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}
