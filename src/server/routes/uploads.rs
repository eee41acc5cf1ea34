//! Multipart photo upload shared by several surfaces

use crate::auth::identity::AuthSession;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::{ApiError, Result};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt as _;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(upload_photo));
}

/// One file pulled out of a multipart payload
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Read the first file-bearing field of a multipart payload into memory,
/// bounded by the given size limit
pub async fn read_first_file(mut payload: Multipart, max_bytes: usize) -> Result<UploadedFile> {
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| ApiError::validation(format!("Invalid multipart payload: {}", e)))?;

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let Some(filename) = filename else {
            continue;
        };

        let content_type = field.content_type().map(|mime| mime.essence_str().to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| ApiError::validation(format!("Upload read failed: {}", e)))?;
            if bytes.len() + chunk.len() > max_bytes {
                return Err(ApiError::validation(format!(
                    "File exceeds the {} byte limit",
                    max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }

    Err(ApiError::validation("No file received"))
}

/// Store a photo from a multipart payload; returns the relative URL
pub async fn save_photo_from_multipart(
    state: &web::Data<AppState>,
    payload: Multipart,
) -> Result<String> {
    let file = read_first_file(payload, state.config.uploads.max_photo_bytes).await?;
    state
        .storage
        .files
        .store_photo(&file.filename, file.content_type.as_deref(), &file.bytes)
        .await
}

/// POST /api/upload-photo — any authenticated caller
async fn upload_photo(
    state: web::Data<AppState>,
    _session: AuthSession,
    payload: Multipart,
) -> Result<HttpResponse> {
    let url = save_photo_from_multipart(&state, payload).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        serde_json::json!({ "url": url }),
        "Upload OK",
    )))
}
