//! On-disk storage for uploaded listing images.
//!
//! Files live under `<uploads.dir>/products/` and are served back at
//! `/uploads/products/<file>`.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{ImagesConfig, UploadsConfig};

pub const PRODUCT_IMAGE_PREFIX: &str = "/uploads/products/";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No image file provided")]
    NoFile,

    #[error("No image selected")]
    EmptyFilename,

    #[error("File type not allowed (allowed: {0})")]
    DisallowedType(String),

    #[error("File larger than {0} bytes")]
    TooLarge(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    /// Public origin the files are served from; absolute URLs on any other
    /// host never map to a local file
    base_url: String,
    max_bytes: usize,
    allowed_extensions: Vec<String>,
}

impl UploadStore {
    pub fn new(config: &UploadsConfig, images: &ImagesConfig) -> Self {
        Self {
            root: config.dir.clone(),
            base_url: images.base_url.trim_end_matches('/').to_string(),
            max_bytes: config.max_bytes,
            allowed_extensions: config.allowed_extensions.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn products_dir(&self) -> PathBuf {
        self.root.join("products")
    }

    pub async fn ensure_dirs(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(self.products_dir()).await?;
        Ok(())
    }

    pub fn is_allowed(&self, filename: &str) -> bool {
        extension_of(filename)
            .map(|ext| self.allowed_extensions.iter().any(|a| a == &ext))
            .unwrap_or(false)
    }

    /// Store an uploaded image and return its public path
    pub async fn save_product_image(&self, filename: &str, bytes: &[u8]) -> Result<String, UploadError> {
        if filename.trim().is_empty() {
            return Err(UploadError::EmptyFilename);
        }
        if !self.is_allowed(filename) {
            return Err(UploadError::DisallowedType(self.allowed_extensions.join(", ")));
        }
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge(self.max_bytes));
        }

        let mut safe = secure_filename(filename);
        if !safe.contains('.') {
            // Sanitizing can strip everything but the extension
            let ext = extension_of(filename).unwrap_or_default();
            safe = format!("image.{}", ext);
        }
        let stored = format!("{}_{}", Uuid::new_v4().simple(), safe);

        let dir = self.products_dir();
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&stored), bytes).await?;

        info!("Stored product image {} ({} bytes)", stored, bytes.len());
        Ok(format!("{}{}", PRODUCT_IMAGE_PREFIX, stored))
    }

    /// The stored file name behind `url` when it is one of our uploads:
    /// either a bare `/uploads/products/..` path or that path under our own
    /// base URL
    pub fn local_file_name<'a>(&self, url: &'a str) -> Option<&'a str> {
        let path = url.strip_prefix(self.base_url.as_str()).unwrap_or(url);
        product_image_file_name(path)
    }

    /// Remove the local files behind `urls`; returns how many were deleted.
    /// External URLs are ignored and missing files are logged, not errors.
    pub async fn delete_product_images(&self, urls: &[String]) -> usize {
        let mut deleted = 0;
        for url in urls {
            let Some(name) = self.local_file_name(url) else {
                if url.contains(PRODUCT_IMAGE_PREFIX) {
                    warn!("Not deleting image on foreign host: {}", url);
                }
                continue;
            };
            let path = self.products_dir().join(name);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    info!("Deleted image file: {}", name);
                    deleted += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("Image file not found: {}", path.display());
                }
                Err(e) => {
                    warn!("Failed to delete image file {}: {}", path.display(), e);
                }
            }
        }
        if deleted > 0 {
            info!("Cleaned up {} image files", deleted);
        }
        deleted
    }
}

/// The stored file name behind a `/uploads/products/<file>` path. Anything
/// that could escape the directory is refused.
pub fn product_image_file_name(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(PRODUCT_IMAGE_PREFIX)?;

    let name = rest.split(['?', '#']).next().unwrap_or_default();
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return None;
    }
    Some(name)
}

/// String entries of a stored `image_urls` column, whatever shape it holds
pub fn stored_image_urls(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
            _ => s.split(',').map(str::trim).filter(|p| !p.is_empty()).map(str::to_string).collect(),
        },
        _ => Vec::new(),
    }
}

/// Reduce a client-supplied file name to `[A-Za-z0-9._-]`, with path
/// separators and whitespace runs turned into underscores
pub fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}
