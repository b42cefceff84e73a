use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::database::StoreError;
use crate::proximity::QueryError;
use crate::utils::{error_codes, error_to_api_response};

/// HTTP 边界层错误，负责映射为对外的状态码和响应体
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal server error")]
    Internal,
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        match &err {
            QueryError::InvalidCoordinate(_) | QueryError::BroadCoordinateMismatch { .. } => {
                AppError::Validation(err.to_string())
            }
            QueryError::NotFound { .. } => AppError::NotFound(err.to_string()),
            QueryError::RecordSource(StoreError::Duplicate(id)) => {
                AppError::Conflict(format!("record already exists: {id}"))
            }
            QueryError::RecordSource(e) => {
                tracing::error!("Record source failure: {}", e);
                AppError::Internal
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            AppError::Conflict(_) => (StatusCode::CONFLICT, error_codes::CONFLICT),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR),
        };

        (status, error_to_api_response::<()>(code, self.to_string())).into_response()
    }
}
