use clap::Args;
use serde_json::json;
use sqlx::PgPool;

use crate::auth::hash_password;
use crate::cli::utils::{load_config, output_success};
use crate::cli::OutputFormat;
use crate::database::users::{self, NewUser};
use crate::database::{categories, DatabaseManager};

pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Electronics", "Phones, laptops, gadgets and accessories"),
    ("Fashion", "Clothing, shoes, and accessories"),
    ("Home & Garden", "Furniture, decor, and garden items"),
    ("Vehicles", "Cars, motorcycles, and vehicles"),
    ("Real Estate", "Houses, apartments, and properties"),
    ("Services", "Various services offered"),
    ("Other", "Other miscellaneous items"),
];

#[derive(Args, Debug)]
pub struct SeedArgs {
    #[arg(long, default_value = "admin@marketplace.com")]
    pub admin_email: String,

    #[arg(long, default_value = "admin123", help = "Password for the admin account")]
    pub admin_password: String,

    #[arg(long, default_value = "test123", help = "Password for the test account")]
    pub test_password: String,

    #[arg(long, help = "Only create categories and the admin account")]
    pub skip_test_user: bool,
}

pub async fn handle(args: SeedArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config()?;
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;

    let mut categories_created = 0;
    for (name, description) in DEFAULT_CATEGORIES {
        if categories::ensure(&pool, name, description).await? {
            categories_created += 1;
        }
    }

    let admin_created = ensure_user(&pool, "admin", &args.admin_email, &args.admin_password, true).await?;
    let test_created = if args.skip_test_user {
        false
    } else {
        ensure_user(&pool, "testuser", "test@example.com", &args.test_password, false).await?
    };

    output_success(
        &output_format,
        &format!(
            "Seeded {} categories (admin {}, test user {})",
            categories_created,
            if admin_created { "created" } else { "exists" },
            if test_created { "created" } else { "skipped" }
        ),
        Some(json!({
            "categories_created": categories_created,
            "admin_created": admin_created,
            "test_user_created": test_created
        })),
    )
}

async fn ensure_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password: &str,
    is_admin: bool,
) -> anyhow::Result<bool> {
    if users::email_exists(pool, email).await? || users::username_exists(pool, username).await? {
        return Ok(false);
    }
    users::create(
        pool,
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            is_admin,
        },
    )
    .await?;
    Ok(true)
}
