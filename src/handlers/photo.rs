use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use log::{error, info};
use serde::Serialize;

use crate::errors::AppError;
use crate::utils::s3::{photo_key, PhotoStore};

const PHOTO_FIELD: &str = "photo";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
const DEFAULT_MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Upload limits, registered as app data. Defaults apply when absent.
#[derive(Debug, Clone)]
pub struct PhotoUploadConfig {
    pub max_bytes: usize,
}

impl Default for PhotoUploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_PHOTO_BYTES,
        }
    }
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct PhotoUrlResponse {
    photo_url: String,
}

struct PhotoUpload {
    data: web::Bytes,
    declared_type: Option<String>,
}

pub async fn upload_photo(
    store: web::Data<dyn PhotoStore>,
    employee_id: web::Path<String>,
    limits: Option<web::Data<PhotoUploadConfig>>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let max_bytes = limits.map_or(DEFAULT_MAX_PHOTO_BYTES, |limits| limits.max_bytes);
    let upload = read_photo_field(payload, max_bytes)
        .await?
        .ok_or_else(|| AppError::BadRequest("Missing photo file".to_string()))?;

    // Sniffed type wins over whatever the client declared.
    let content_type = infer::get(&upload.data)
        .map(|kind| kind.mime_type().to_string())
        .or(upload.declared_type)
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

    let key = photo_key(&employee_id);
    store
        .put(&key, upload.data, &content_type)
        .await
        .map_err(|err| {
            error!("Error uploading photo: {err}");
            AppError::internal()
        })?;

    info!("Stored photo {key} ({content_type})");
    Ok(HttpResponse::Created().json(MessageResponse {
        message: "Photo uploaded",
    }))
}

pub async fn get_photo_url(
    store: web::Data<dyn PhotoStore>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let photo_url = store
        .presigned_url(&photo_key(&employee_id))
        .await
        .map_err(|err| {
            error!("Error generating photo URL: {err}");
            AppError::internal()
        })?;

    Ok(HttpResponse::Ok().json(PhotoUrlResponse { photo_url }))
}

/// Drains the multipart stream, keeping the first `photo` part.
/// Fails as soon as that part grows past `max_bytes`.
async fn read_photo_field(
    mut payload: Multipart,
    max_bytes: usize,
) -> Result<Option<PhotoUpload>, AppError> {
    let mut upload = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|err| AppError::BadRequest(format!("Invalid multipart body: {err}")))?
    {
        let is_photo = upload.is_none() && field.name() == Some(PHOTO_FIELD);
        let declared_type = field.content_type().map(|mime| mime.to_string());

        let mut data = web::BytesMut::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|err| AppError::BadRequest(format!("Invalid multipart body: {err}")))?
        {
            if is_photo {
                if data.len() + chunk.len() > max_bytes {
                    return Err(AppError::PayloadTooLarge(format!(
                        "Photo exceeds {max_bytes} bytes"
                    )));
                }
                data.extend_from_slice(&chunk);
            }
        }

        if is_photo {
            upload = Some(PhotoUpload {
                data: data.freeze(),
                declared_type,
            });
        }
    }

    Ok(upload)
}
