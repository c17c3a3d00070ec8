//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
    #[error("unknown store backend '{0}' (expected 'postgres' or 'memory')")]
    UnknownStore(String),
    #[error("{0} must be set")]
    Missing(&'static str),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Map constraint violations raised by PostgreSQL to client errors; everything else stays a database error.
    pub fn from_write(e: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return AppError::Conflict(conflict.to_string());
            }
            if db.is_foreign_key_violation() {
                return AppError::Validation(db.message().to_string());
            }
        }
        AppError::Db(e)
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            success: false,
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
    fn client_errors_keep_their_status() {
        assert_eq!(
            AppError::NotFound("book 7".into()).status_and_code(),
            (StatusCode::NOT_FOUND, "not_found")
        );
        assert_eq!(
            AppError::Conflict("isbn".into()).status_and_code(),
            (StatusCode::CONFLICT, "conflict")
        );
        assert_eq!(
            AppError::Validation("title is required".into()).status_and_code(),
            (StatusCode::UNPROCESSABLE_ENTITY, "validation_error")
        );
    }

    #[test]
    fn row_not_found_is_a_404() {
        let (status, code) = AppError::Db(sqlx::Error::RowNotFound).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "not_found");
    }

    #[test]
    fn other_write_errors_stay_database_errors() {
        let e = AppError::from_write(sqlx::Error::PoolTimedOut, "isbn already exists");
        assert!(matches!(e, AppError::Db(sqlx::Error::PoolTimedOut)));
    }
}
