// handlers/protected/uploads.rs - POST /api/products/upload-image

use axum::{
    extract::{Multipart, State},
    response::Json,
    Extension,
};
use serde_json::{json, Value};
use tracing::info;

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;
use crate::uploads::UploadError;

/// Accepts a multipart form with an `image` file field and stores it under
/// the uploads directory. The returned `image_url` is what clients put in a
/// listing's `image_urls`.
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(UploadError::EmptyFilename.into());
        }
        let bytes = field.bytes().await?;

        let image_url = state.uploads.save_product_image(&filename, &bytes).await?;
        info!("User {} uploaded {}", user.id, image_url);

        return Ok(Json(json!({
            "message": "Image uploaded successfully",
            "image_url": image_url
        })));
    }

    Err(UploadError::NoFile.into())
}
