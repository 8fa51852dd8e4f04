use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{auth::AuthError, reports::ReportError};
use thiserror::Error;
use utils::response::ApiResponse;

/// Request-level error; every variant maps onto one HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("não autorizado")]
    Unauthorized,
    #[error("{0} não encontrado")]
    NotFound(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Report(err) => match err {
                ReportError::Filter(_) => StatusCode::BAD_REQUEST,
                ReportError::ClientNotFound(_) => StatusCode::NOT_FOUND,
                ReportError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
                ReportError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                // Out-of-process renderer is an upstream dependency.
                ReportError::Renderer(_) => StatusCode::BAD_GATEWAY,
                ReportError::Spreadsheet(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Auth(err) => match err {
                AuthError::MissingFields => StatusCode::BAD_REQUEST,
                AuthError::EmailTaken => StatusCode::CONFLICT,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::InvalidPassword => StatusCode::UNAUTHORIZED,
                AuthError::Database(_) | AuthError::Hash(_) | AuthError::Token(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
