use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::{IdentityStore, TokenService};
use crate::config::AppConfig;
use crate::database::PgIdentityStore;
use crate::images::ImageUrlNormalizer;
use crate::uploads::UploadStore;

/// Shared, immutable request state. Cloned per request; everything heavy is
/// behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: PgPool,
    pub tokens: Arc<TokenService>,
    pub images: Arc<ImageUrlNormalizer>,
    pub uploads: Arc<UploadStore>,
}

impl AppState {
    /// Production wiring: identities come from the `users` table
    pub fn new(config: AppConfig, db: PgPool) -> Self {
        let store = Arc::new(PgIdentityStore::new(db.clone()));
        Self::with_identity_store(config, db, store)
    }

    pub fn with_identity_store(config: AppConfig, db: PgPool, store: Arc<dyn IdentityStore>) -> Self {
        let tokens = TokenService::new(&config.security, store);
        let images = ImageUrlNormalizer::new(&config.images);
        let uploads = UploadStore::new(&config.uploads, &config.images);
        Self {
            config: Arc::new(config),
            db,
            tokens: Arc::new(tokens),
            images: Arc::new(images),
            uploads: Arc::new(uploads),
        }
    }
}
