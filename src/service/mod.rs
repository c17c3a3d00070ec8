//! Business rules between handlers and stores: body decoding, validation, uniqueness and
//! reference checks.

mod books;
mod school;
mod validation;

pub use books::BookService;
pub use school::SchoolService;
pub use validation::{FieldRule, Format, RequestValidator, ValidationRule};

use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Request bodies must be non-empty JSON objects.
pub(crate) fn body_object(body: Value) -> Result<Map<String, Value>, AppError> {
    match body {
        Value::Object(m) if !m.is_empty() => Ok(m),
        _ => Err(AppError::BadRequest("no data provided".into())),
    }
}

/// Typed view of a validated body. Type mismatches (e.g. a string year) are validation errors.
pub(crate) fn decode<T: DeserializeOwned>(body: Map<String, Value>) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(body)).map_err(|e| AppError::Validation(e.to_string()))
}

pub(crate) fn trimmed(s: String) -> String {
    let t = s.trim();
    if t.len() == s.len() {
        s
    } else {
        t.to_string()
    }
}
