// API handlers for the web server

use super::{
    AppState,
    error::ApiError,
    extract_request_data::{extract_update_form, extract_upload_form},
    models::DeleteImageResponse,
};
use crate::{
    models::{ImagePatch, ImageRecord},
    uploads::UploadsDir,
};
use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::StatusCode,
};
use axum_extra::{TypedHeader, typed_header::TypedHeaderRejection};
use headers::ContentType;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

// --- GET /api/images ---
// Lists all stored images; an empty store yields an empty array
pub async fn list_images(
    State(state): State<AppState>,
) -> Result<Json<Vec<ImageRecord>>, ApiError> {
    let images = state.store.list()?;
    debug!("Returning {} image record(s)", images.len());
    Ok(Json(images))
}

// --- GET /api/images/{id} ---
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ImageRecord>, ApiError> {
    state
        .store
        .get(&id)?
        .map(Json)
        .ok_or(ApiError::ImageNotFound(id))
}

// --- POST /api/images ---
// Stores the uploaded file and records its metadata
pub async fn upload_image(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<ImageRecord>), ApiError> {
    let multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to process multipart request: {}", e)))?;
    let form = extract_upload_form(multipart).await?;

    let file = form
        .image
        .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let filename = UploadsDir::generate_filename(&file.original_name);
    let path = state.uploads.save(&filename, &file.data).await.map_err(|e| {
        error!("Failed to save uploaded file {}: {}", filename, e);
        ApiError::InternalServerError("Failed to save file".to_string())
    })?;

    let record = ImageRecord::new(
        Uuid::new_v4().to_string(),
        form.title,
        form.description,
        filename.clone(),
        UploadsDir::public_path(&filename),
    );

    if let Err(e) = state.store.insert(record.clone()) {
        // The record never became visible, so its file must not linger
        if let Err(cleanup_err) = state.uploads.remove(&filename).await {
            warn!(
                orphaned_file = %path.display(),
                "Failed to remove file after store insert failed: {}",
                cleanup_err
            );
        }
        return Err(e.into());
    }

    info!(
        "Uploaded image: id={}, filename={}, size={} bytes, content_type={:?}",
        record.id,
        record.filename,
        file.data.len(),
        file.content_type
    );

    Ok((StatusCode::CREATED, Json(record)))
}

// --- PUT /api/images/{id} ---
// Overwrites title/description when a non-empty value is submitted
pub async fn update_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    content_type: Result<TypedHeader<ContentType>, TypedHeaderRejection>,
    request: Request,
) -> Result<Json<ImageRecord>, ApiError> {
    if state.store.get(&id)?.is_none() {
        return Err(ApiError::ImageNotFound(id));
    }

    // An unparseable Content-Type carries no usable fields, same as a missing one
    let content_type = match content_type {
        Ok(TypedHeader(content_type)) => Some(mime::Mime::from(content_type)),
        Err(rejection) => {
            if !rejection.is_missing() {
                debug!("Ignoring update body with invalid content type: {}", rejection);
            }
            None
        }
    };
    let form = extract_update_form(request, content_type).await?;
    let patch = ImagePatch::from_form(form.title, form.description);

    debug!("Update image request: id={}, patch={:?}", id, patch);

    // The record may have been deleted while the body was being read
    let record = state
        .store
        .update(&id, patch)?
        .ok_or(ApiError::ImageNotFound(id))?;

    info!("Updated image: id={}", record.id);

    Ok(Json(record))
}

// --- DELETE /api/images/{id} ---
// Removes the record, then makes a best-effort attempt to remove its file
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteImageResponse>, ApiError> {
    let record = state
        .store
        .delete(&id)?
        .ok_or(ApiError::ImageNotFound(id))?;

    if let Err(e) = state.uploads.remove(&record.filename).await {
        warn!(
            orphaned_file = %state.uploads.file_path(&record.filename).display(),
            "Could not delete file for image {}: {}",
            record.id,
            e
        );
    }

    info!("Deleted image: id={}", record.id);

    Ok(Json(DeleteImageResponse::default()))
}
