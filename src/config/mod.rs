use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Signing secret used when nothing is configured. Refused in production.
pub const DEV_JWT_SECRET: &str = "dev-secret-key";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid image base URL '{0}': must be an absolute http(s) URL")]
    InvalidBaseUrl(String),

    #[error("Refusing to start in production with the development JWT secret")]
    InsecureSecret,

    #[error("JWT secret must not be empty")]
    EmptySecret,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub images: ImagesConfig,
    pub uploads: UploadsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: String,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub default_per_page: i64,
    pub max_per_page: i64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub min_password_length: usize,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Prefix for relative upload paths, without a trailing slash
    pub base_url: String,
    /// Substrings that mark an image reference as known-bad data
    pub blocklist: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    pub dir: PathBuf,
    pub max_bytes: usize,
    pub allowed_extensions: Vec<String>,
}

pub fn default_blocklist() -> Vec<String> {
    vec!["via.placeholder.com".to_string(), "Screenshot from".to_string()]
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)
        .validated()
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("MARKET_HOST").or_else(|| lookup("HOST")) {
            self.server.host = v;
        }
        if let Some(v) = lookup("MARKET_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        } else {
            self.database.url = database_url_from_parts(lookup);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Some(v) = lookup("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Some(v) = lookup("API_DEFAULT_PER_PAGE") {
            self.api.default_per_page = v.parse().unwrap_or(self.api.default_per_page);
        }
        if let Some(v) = lookup("API_MAX_PER_PAGE") {
            self.api.max_per_page = v.parse().unwrap_or(self.api.max_per_page);
        }
        if let Some(v) = lookup("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_JWT_SECRET")
            .or_else(|| lookup("JWT_SECRET_KEY"))
            .or_else(|| lookup("SECRET_KEY"))
        {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("SECURITY_TOKEN_TTL_SECS") {
            self.security.token_ttl_secs = v.parse().unwrap_or(self.security.token_ttl_secs);
        }
        if let Some(v) = lookup("SECURITY_MIN_PASSWORD_LENGTH") {
            self.security.min_password_length = v.parse().unwrap_or(self.security.min_password_length);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }

        // Image overrides
        if let Some(v) = lookup("IMAGES_BASE_URL").or_else(|| lookup("BASE_URL")) {
            self.images.base_url = v;
        }
        if let Some(v) = lookup("IMAGES_BLOCKLIST") {
            self.images.blocklist = split_list(&v);
        }
        if let Some(v) = lookup("IMAGES_BLOCKLIST_EXTRA") {
            self.images.blocklist.extend(split_list(&v));
        }

        // Upload overrides
        if let Some(v) = lookup("UPLOADS_DIR") {
            self.uploads.dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("UPLOADS_MAX_BYTES") {
            self.uploads.max_bytes = v.parse().unwrap_or(self.uploads.max_bytes);
        }
        if let Some(v) = lookup("UPLOADS_ALLOWED_EXTENSIONS") {
            self.uploads.allowed_extensions =
                split_list(&v).into_iter().map(|e| e.to_lowercase()).collect();
        }

        self
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.images.base_url.trim().trim_end_matches('/').to_string();
        match url::Url::parse(&trimmed) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::InvalidBaseUrl(self.images.base_url)),
        }
        self.images.base_url = trimmed;

        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.environment == Environment::Production && self.security.jwt_secret == DEV_JWT_SECRET {
            return Err(ConfigError::InsecureSecret);
        }

        self.api.max_per_page = self.api.max_per_page.max(1);
        self.api.default_per_page = self.api.default_per_page.clamp(1, self.api.max_per_page);
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                default_per_page: 20,
                max_per_page: 100,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                token_ttl_secs: 3600,
                min_password_length: 6,
                cors_origins: vec![
                    "http://127.0.0.1:3000".to_string(),
                    "http://localhost:3000".to_string(),
                ],
            },
            images: ImagesConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                blocklist: default_blocklist(),
            },
            uploads: UploadsConfig {
                dir: PathBuf::from("uploads"),
                max_bytes: 16 * 1024 * 1024, // 16MB
                allowed_extensions: default_extensions(),
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.api.max_per_page = 100;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.database.run_migrations = false;
        config.api.max_per_page = 50;
        config.api.enable_request_logging = false;
        config.security.cors_origins = vec!["https://app.example.com".to_string()];
        config
    }
}

fn default_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "gif", "webp"].iter().map(|s| s.to_string()).collect()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Assemble a connection URL from the individual DB_* variables
fn database_url_from_parts<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = lookup("DB_PORT").unwrap_or_else(|| "5432".to_string());
    let name = lookup("DB_NAME").unwrap_or_else(|| "marketplace_db".to_string());
    let user = lookup("DB_USER").unwrap_or_else(|| "marketplace_user".to_string());
    let password = lookup("DB_PASSWORD").unwrap_or_default();
    format!("postgres://{}:{}@{}:{}/{}", user, password, host, port, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_default_development_config() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.security.token_ttl_secs, 3600);
        assert_eq!(config.images.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.images.blocklist, default_blocklist());
        assert!(config.database.run_migrations);
    }

    #[test]
    fn test_production_rejects_dev_secret() {
        let result = config_with(&[("APP_ENV", "production")]);
        assert!(matches!(result, Err(ConfigError::InsecureSecret)));

        let config = config_with(&[("APP_ENV", "prod"), ("SECRET_KEY", "s3cr3t")]).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert!(!config.database.run_migrations);
    }

    #[test]
    fn test_base_url_is_validated_and_trimmed() {
        let config = config_with(&[("BASE_URL", "http://host:5000/")]).unwrap();
        assert_eq!(config.images.base_url, "http://host:5000");

        let result = config_with(&[("IMAGES_BASE_URL", "host-without-scheme")]);
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl(_))));

        let result = config_with(&[("IMAGES_BASE_URL", "ftp://files.example.com")]);
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_blocklist_replace_and_extend() {
        let config = config_with(&[("IMAGES_BLOCKLIST", "example.invalid, ,bad")]).unwrap();
        assert_eq!(config.images.blocklist, vec!["example.invalid", "bad"]);

        let config = config_with(&[("IMAGES_BLOCKLIST_EXTRA", "dummyimage.com")]).unwrap();
        assert_eq!(config.images.blocklist.len(), 3);
        assert_eq!(config.images.blocklist[2], "dummyimage.com");
    }

    #[test]
    fn test_database_url_from_parts() {
        let config = config_with(&[("DB_HOST", "db"), ("DB_PASSWORD", "pw")]).unwrap();
        assert_eq!(
            config.database.url,
            "postgres://marketplace_user:pw@db:5432/marketplace_db"
        );

        let config = config_with(&[("DATABASE_URL", "postgres://a:b@c/d"), ("DB_HOST", "ignored")]).unwrap();
        assert_eq!(config.database.url, "postgres://a:b@c/d");
    }

    #[test]
    fn test_secret_precedence_and_pagination_clamp() {
        let config = config_with(&[
            ("SECRET_KEY", "flask"),
            ("SECURITY_JWT_SECRET", "explicit"),
            ("API_DEFAULT_PER_PAGE", "500"),
            ("API_MAX_PER_PAGE", "40"),
        ])
        .unwrap();
        assert_eq!(config.security.jwt_secret, "explicit");
        assert_eq!(config.api.default_per_page, 40);
    }
}
