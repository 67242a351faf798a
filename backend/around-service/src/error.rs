use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::elasticsearch::ElasticsearchError;

pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
pub const SEARCH_BACKEND_ERROR: &str = "SEARCH_BACKEND_ERROR";
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Invalid query parameters: {0}")]
    InvalidQuery(String),
    #[error("Search backend error: {0}")]
    SearchBackend(#[from] ElasticsearchError),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// JSON envelope returned for every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
    pub status: u16,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidBody(_) | AppError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            AppError::SearchBackend(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidBody(_) | AppError::InvalidQuery(_) => INVALID_REQUEST,
            AppError::SearchBackend(_) => SEARCH_BACKEND_ERROR,
            AppError::Config(_) => INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message: self.to_string(),
            code: self.code().to_string(),
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}
