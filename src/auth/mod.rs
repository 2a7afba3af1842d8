//! Session tokens.
//!
//! Tokens are stateless HS256 JWTs carrying `{user_id, exp}`. A token is good
//! for a request only while its signature checks out, `exp` is in the future
//! and the subject still exists and is active. Nothing is stored server side,
//! so there is no revocation: logout is the client dropping the token.

pub mod password;
pub mod store;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::config::SecurityConfig;
use crate::database::models::User;
use crate::database::DatabaseError;

pub use password::{hash_password, verify_password, PasswordError};
pub use store::{IdentityStore, MemoryIdentityStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Any authenticated user
    User,
    Admin,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization token is missing")]
    MissingToken,

    #[error("Authorization header is not a Bearer token")]
    InvalidTokenFormat,

    #[error("Token could not be decoded")]
    MalformedToken,

    #[error("Token signature does not verify")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token subject no longer exists")]
    UnknownSubject,

    #[error("User account is deactivated")]
    InactiveAccount,

    #[error("Admin access required")]
    Forbidden,

    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Identity lookup failed: {0}")]
    Lookup(#[source] DatabaseError),
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: u64,
    store: Arc<dyn IdentityStore>,
}

impl TokenService {
    pub fn new(config: &SecurityConfig, store: Arc<dyn IdentityStore>) -> Self {
        Self::from_secret(config.jwt_secret.as_bytes(), config.token_ttl_secs, store)
    }

    pub fn from_secret(secret: &[u8], default_ttl: u64, store: Arc<dyn IdentityStore>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by hand against `now >= exp`, without leeway
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = ["exp".to_string()].into_iter().collect();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            default_ttl,
            store,
        }
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    pub fn issue(&self, user_id: i32, ttl_secs: u64) -> Result<String, AuthError> {
        self.issue_at(user_id, Utc::now().timestamp(), ttl_secs)
    }

    pub fn issue_default(&self, user_id: i32) -> Result<String, AuthError> {
        self.issue(user_id, self.default_ttl)
    }

    fn issue_at(&self, user_id: i32, now: i64, ttl_secs: u64) -> Result<String, AuthError> {
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        let claims = Claims {
            user_id,
            exp: now.saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(AuthError::Signing)
    }

    /// Check signature and expiry without touching the identity store
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode_at(token, Utc::now().timestamp())
    }

    fn decode_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token rejected by decoder: {}", e);
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::MalformedToken,
            }
        })?;

        if now >= data.claims.exp {
            return Err(AuthError::Expired);
        }
        Ok(data.claims)
    }

    /// Full verification: signature, then expiry, then one store lookup
    pub async fn verify(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.decode(token)?;
        self.resolve(&claims).await
    }

    async fn resolve(&self, claims: &Claims) -> Result<User, AuthError> {
        let user = self
            .store
            .find_user(claims.user_id)
            .await
            .map_err(AuthError::Lookup)?
            .ok_or(AuthError::UnknownSubject)?;

        if !user.is_active {
            return Err(AuthError::InactiveAccount);
        }
        Ok(user)
    }

    pub fn require_role(user: &User, role: Role) -> Result<(), AuthError> {
        match role {
            Role::User => Ok(()),
            Role::Admin if user.is_admin => Ok(()),
            Role::Admin => Err(AuthError::Forbidden),
        }
    }
}
