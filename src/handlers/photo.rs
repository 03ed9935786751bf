use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::Method,
};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::StoreError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::planet_id::PlanetId;
use super::planets::planet_not_found;

pub const PHOTO_FIELD: &str = "photo";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUploaded {
    pub photo_filename: String,
}

struct Photo {
    extension: &'static str,
    bytes: Bytes,
}

/// File extension for an accepted photo MIME type.
pub fn photo_extension(content_type: Option<&str>) -> Option<&'static str> {
    match content_type? {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        _ => None,
    }
}

/// POST /planets/:id/photo
pub async fn upload(
    State(state): State<AppState>,
    PlanetId(id): PlanetId,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<PhotoUploaded> {
    // A request that is not multipart at all simply carries no file.
    let Ok(mut multipart) = multipart else {
        return Err(ApiError::UploadMissing);
    };
    let photo = read_photo(&mut multipart).await?.ok_or(ApiError::UploadMissing)?;

    let photo_filename = format!("{}.{}", Uuid::new_v4(), photo.extension);
    let path = state.uploads_dir.join(&photo_filename);
    tokio::fs::create_dir_all(state.uploads_dir.as_path()).await?;
    tokio::fs::write(&path, &photo.bytes).await?;

    match state.store.set_photo(id, &photo_filename).await {
        Ok(_) => {
            tracing::info!("Stored photo {} for planet {}", photo_filename, id);
            Ok(ApiResponse::created(PhotoUploaded { photo_filename }))
        }
        Err(err) => {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!("Failed to remove orphaned photo {}: {}", path.display(), e);
            }
            match err {
                StoreError::NotFound(_) => Err(planet_not_found(Method::POST, id, "/photo")),
                other => Err(other.into()),
            }
        }
    }
}

// Only file parts named `photo` count; other fields are skipped. The type is
// checked before the part's bytes are read.
async fn read_photo(multipart: &mut Multipart) -> Result<Option<Photo>, ApiError> {
    let mut photo = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(PHOTO_FIELD) || field.file_name().is_none() {
            continue;
        }
        if photo.is_some() {
            return Err(ApiError::malformed_body(format!("Unexpected field: {}", PHOTO_FIELD)));
        }
        let extension = photo_extension(field.content_type()).ok_or(ApiError::UploadType)?;
        let bytes = field.bytes().await?;
        photo = Some(Photo { extension, bytes });
    }
    Ok(photo)
}
