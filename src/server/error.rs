//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failures a handler can report to the browser
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing or invalid userUUID cookie")]
    MissingCookie,
    #[error("browser is not paired")]
    NotPaired,
    #[error("invalid item identifier '{0}'")]
    InvalidItem(String),
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCookie | ApiError::NotPaired => StatusCode::UNAUTHORIZED,
            ApiError::InvalidItem(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
