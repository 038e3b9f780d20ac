// src/error.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced by the upload pipeline.
///
/// Each variant maps to one client-facing status code. Client-facing
/// bodies are stable; raw causes stay in the server logs.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no links or non-empty files supplied")]
    Unprocessable,
    #[error("malformed multipart payload: {0}")]
    BadPayload(String),
    #[error("{dependency} failure: {message}")]
    Upstream {
        dependency: &'static str,
        message: String,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl UploadError {
    pub fn render(message: impl Into<String>) -> Self {
        Self::Upstream {
            dependency: "renderer",
            message: message.into(),
        }
    }

    pub fn ingest(message: impl Into<String>) -> Self {
        Self::Upstream {
            dependency: "ingestion",
            message: message.into(),
        }
    }
}

impl ResponseError for UploadError {
    fn status_code(&self) -> StatusCode {
        match self {
            UploadError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            UploadError::BadPayload(_) => StatusCode::BAD_REQUEST,
            UploadError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            UploadError::Io(_) | UploadError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            UploadError::Unprocessable => {
                HttpResponse::UnprocessableEntity().json(json!({ "error": "Unprocessable input" }))
            }
            UploadError::BadPayload(message) => {
                warn!(error = %message, "rejected malformed multipart payload");
                HttpResponse::BadRequest().json(json!({ "error": "Malformed multipart payload" }))
            }
            UploadError::Upstream {
                dependency,
                message,
            } => {
                warn!(dependency = %dependency, error = %message, "upstream dependency failed");
                HttpResponse::BadGateway().json(json!({ "error": "Upstream dependency failed" }))
            }
            UploadError::Io(e) => {
                error!(error = %e, "upload pipeline I/O failure");
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "Something went wrong, we are working on it!" }))
            }
            UploadError::Internal(message) => {
                error!(error = %message, "upload pipeline internal failure");
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "Something went wrong, we are working on it!" }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            UploadError::Unprocessable.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            UploadError::BadPayload("boundary missing".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            UploadError::render("browser crashed").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            UploadError::ingest("connection refused").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            UploadError::Internal("poisoned".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_display_names_dependency() {
        let e = UploadError::render("net::ERR_NAME_NOT_RESOLVED");
        assert_eq!(e.to_string(), "renderer failure: net::ERR_NAME_NOT_RESOLVED");
    }
}
