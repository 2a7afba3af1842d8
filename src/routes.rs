use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_admin, require_auth};
use crate::state::AppState;

/// Multipart framing on top of the raw file bytes
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn app(state: AppState) -> Router {
    let uploads_dir = state.uploads.root().to_path_buf();
    let body_limit = state.config.uploads.max_bytes + MULTIPART_OVERHEAD;

    let router = Router::new()
        .route("/", get(root))
        .merge(public_routes())
        .merge(protected_routes(&state))
        .merge(elevated_routes(&state))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(&state.config.security));

    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(public::health::health))
        .route("/api/health", get(public::health::health))
        .route("/api/auth/register", post(public::auth::register))
        .route("/api/auth/login", post(public::auth::login))
        .route("/api/products", get(public::products::list))
        .route("/api/products/:id", get(public::products::get))
        .route("/api/categories", get(public::categories::list))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(protected::auth::me))
        .route("/api/auth/logout", post(protected::auth::logout))
        .route("/api/auth/change-password", post(protected::auth::change_password))
        .route("/api/products", post(protected::products::create))
        .route("/api/products/upload-image", post(protected::uploads::upload_image))
        .route(
            "/api/products/:id",
            put(protected::products::update).delete(protected::products::delete),
        )
        .route("/api/products/my-products", get(protected::products::my_products))
        .route("/api/products/user/products", get(protected::products::my_products))
        .route("/api/notifications", get(protected::notifications::list))
        .route("/api/notifications/read-all", put(protected::notifications::mark_all_read))
        .route("/api/notifications/:id/read", put(protected::notifications::mark_read))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

fn elevated_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/categories", post(elevated::categories::create))
        .route("/api/notifications/broadcast", post(elevated::notifications::broadcast))
        .route("/api/admin/dashboard", get(elevated::dashboard::dashboard))
        .route("/api/admin/dashboard/stats", get(elevated::dashboard::dashboard))
        .route("/api/admin/users", get(elevated::users::list))
        .route("/api/admin/users/:id", delete(elevated::users::delete))
        .route("/api/admin/users/:id/toggle-active", put(elevated::users::toggle_active))
        .route("/api/admin/products", get(elevated::products::list))
        .route("/api/admin/products/:id", delete(elevated::products::delete))
        .route("/api/admin/products/:id/toggle-active", put(elevated::products::toggle_active))
        .route(
            "/api/admin/categories",
            get(elevated::categories::list).post(elevated::categories::create),
        )
        .route("/api/admin/categories/:id", delete(elevated::categories::delete))
        // Layers run bottom-up: authenticate first, then check the role
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(600))
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "Marketplace API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health (public)",
            "auth": "/api/auth/* (register/login public, rest protected)",
            "products": "/api/products[/:id] (read public, write protected)",
            "categories": "/api/categories (read public, create admin)",
            "notifications": "/api/notifications/* (protected)",
            "admin": "/api/admin/* (admin)",
            "uploads": "/uploads/* (public static files)"
        }
    }))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Resource not found")
}
