use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::services::search::SearchError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Search backend error: {0}")]
    SearchBackend(String),

    #[error("Search backend timed out after {0:?}")]
    SearchTimeout(Duration),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SearchBackend(_) => StatusCode::BAD_GATEWAY,
            AppError::SearchTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_response = ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        };
        HttpResponse::build(status).json(error_response)
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        AppError::SearchBackend(err.to_string())
    }
}
