use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use sectorx_backend::civil::LookupError;
use sectorx_backend::storage::StoreError;

/// Handler error, rendered as plain text / 接口错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing required query parameter
    #[error("Query parameter '{0}' is required")]
    MissingParam(&'static str),

    /// User-supplied data failed validation
    #[error("{0}")]
    Validation(#[from] LookupError),

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingParam(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}
