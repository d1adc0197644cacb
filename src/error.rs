use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to HTTP callers. Always rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No image data provided")]
    MissingImage,
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("{}", .0.body_text())]
    Body(#[from] BytesRejection),
    #[error("Invalid image data: {0}")]
    InvalidImage(#[from] base64::DecodeError),
    #[error("Endpoint not found")]
    NotFound { path: String },
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingImage | Self::InvalidBody(_) | Self::InvalidImage(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Body(rejection) => rejection.status(),
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::NotFound { path } => json!({ "error": self.to_string(), "path": path }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// Failures talking to a label oracle. Logged and swallowed by the handler.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("invalid service account credentials: {0}")]
    Credentials(String),
    #[error("failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("oracle returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Response(String),
    #[error("could not decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
