use axum::{
    Form,
    extract::{FromRequest, Multipart, Request},
};
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::ApiError;

/// File part of an upload request.
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Fields of `POST /api/images`.
pub struct UploadForm {
    pub title: String,
    pub description: String,
    pub image: Option<UploadedFile>,
}

/// Fields of `PUT /api/images/{id}`. Absent fields are `None`.
#[derive(Deserialize, Debug, Default)]
pub struct UpdateForm {
    pub title: Option<String>,
    pub description: Option<String>,
}

pub async fn extract_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm {
        title: String::new(),
        description: String::new(),
        image: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to process multipart field: {}", e)))?
    {
        match field.name() {
            Some("title") => form.title = read_text(field).await?,
            Some("description") => form.description = read_text(field).await?,
            Some("image") => {
                // A part without a file name is a plain value, not an uploaded file.
                // Browsers send `filename=""` for an empty file input.
                let Some(original_name) = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                else {
                    debug!("Ignoring 'image' field without a file name");
                    continue;
                };
                if form.image.is_some() {
                    warn!("Multiple 'image' fields found in multipart request, using the last one");
                }

                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {}", e)))?
                    .to_vec();

                debug!(
                    "Received file {:?} ({} bytes, content type {:?})",
                    original_name,
                    data.len(),
                    content_type
                );
                form.image = Some(UploadedFile {
                    original_name,
                    content_type,
                    data,
                });
            }
            other => debug!("Ignoring multipart field: {}", other.unwrap_or("unnamed")),
        }
    }

    Ok(form)
}

/// Reads update fields from a multipart or url-encoded body.
/// Any other body carries no fields.
pub async fn extract_update_form(
    request: Request,
    content_type: Option<mime::Mime>,
) -> Result<UpdateForm, ApiError> {
    let Some(content_type) = content_type else {
        return Ok(UpdateForm::default());
    };

    if content_type.essence_str() == mime::MULTIPART_FORM_DATA.essence_str() {
        let mut multipart = Multipart::from_request(request, &()).await.map_err(|e| {
            ApiError::BadRequest(format!("Failed to process multipart request: {}", e))
        })?;

        let mut form = UpdateForm::default();
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            ApiError::BadRequest(format!("Failed to process multipart field: {}", e))
        })? {
            match field.name() {
                Some("title") => form.title = Some(read_text(field).await?),
                Some("description") => form.description = Some(read_text(field).await?),
                other => debug!("Ignoring multipart field: {}", other.unwrap_or("unnamed")),
            }
        }
        Ok(form)
    } else if content_type.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
        let Form(form) = Form::<UpdateForm>::from_request(request, &())
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to parse form body: {}", e)))?;
        Ok(form)
    } else {
        debug!("Ignoring update body with content type {}", content_type);
        Ok(UpdateForm::default())
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read form field: {}", e)))
}
