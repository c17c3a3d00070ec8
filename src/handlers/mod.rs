//! HTTP handlers. Thin: extract, delegate to the shaper or a service, wrap in the envelope.

pub mod books;
pub mod school;

use crate::error::AppError;
use axum::{extract::rejection::JsonRejection, Json};
use serde_json::Value;

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest("invalid id".into()))
}

/// Malformed or missing JSON is reported the same way as an empty object.
fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected request body");
            Err(AppError::BadRequest("no data provided".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_id("4.2"), Err(AppError::BadRequest(_))));
    }
}
