// Error types for the API server

use crate::store::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// API server error types
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    InternalServerError(String),

    // Application-specific errors
    ImageNotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ImageNotFound(_) => StatusCode::NOT_FOUND,
            Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            Self::BadRequest(msg) | Self::InternalServerError(msg) => msg,
            Self::ImageNotFound(id) => {
                tracing::debug!("Image {} not found", id);
                "Image not found".to_string()
            }
        };

        let body = Json(json!({ "error": error_message }));

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        tracing::error!("Image store failure: {}", error);
        Self::InternalServerError(format!("Image store failure: {}", error))
    }
}
