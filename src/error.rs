//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("merge: {0}")]
    Merge(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Merge(_) => (StatusCode::INTERNAL_SERVER_ERROR, "merge_error"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        let cases = [
            (AppError::Validation("name is required".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("host x".into()), StatusCode::NOT_FOUND),
            (AppError::Merge("shape mismatch".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Db(sqlx::Error::RowNotFound), StatusCode::NOT_FOUND),
            (AppError::Db(sqlx::Error::PoolClosed), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::BadRequest("bad id".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, want) in cases {
            assert_eq!(err.into_response().status(), want);
        }
    }
}
