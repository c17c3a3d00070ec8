//! Request validation from static per-field rules.

use crate::error::AppError;
use regex::Regex;
use serde_json::{Map, Value};

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+$";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Email,
}

#[derive(Clone, Copy, Debug)]
pub struct ValidationRule {
    pub required: bool,
    pub format: Option<Format>,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub pattern: Option<&'static str>,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
}

impl ValidationRule {
    pub const NONE: ValidationRule = ValidationRule {
        required: false,
        format: None,
        max_length: None,
        min_length: None,
        pattern: None,
        minimum: None,
        maximum: None,
    };
}

#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub field: &'static str,
    pub rule: ValidationRule,
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body. All required fields must be present, non-null and non-blank.
    pub fn validate(body: &Map<String, Value>, rules: &[FieldRule]) -> Result<(), AppError> {
        for FieldRule { field, rule } in rules {
            let val = body.get(*field);
            if rule.required && val.map_or(true, is_blank) {
                return Err(AppError::Validation(format!("{} is required", field)));
            }
            if let Some(v) = val {
                validate_field(field, v, rule)?;
            }
        }
        Ok(())
    }

    /// Validate only the fields present in body (for partial updates). Required fields may be
    /// omitted but not cleared.
    pub fn validate_partial(body: &Map<String, Value>, rules: &[FieldRule]) -> Result<(), AppError> {
        for FieldRule { field, rule } in rules {
            let Some(v) = body.get(*field) else { continue };
            if rule.required && is_blank(v) {
                return Err(AppError::Validation(format!("{} cannot be empty", field)));
            }
            validate_field(field, v, rule)?;
        }
        Ok(())
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn validate_field(col: &str, v: &Value, rule: &ValidationRule) -> Result<(), AppError> {
    if v.is_null() {
        return Ok(());
    }
    if let Some(format) = rule.format {
        validate_format(col, v, format)?;
    }
    // Lengths are measured on the trimmed text, which is what gets stored.
    if let Some(max) = rule.max_length {
        if let Some(s) = v.as_str() {
            if s.trim().chars().count() > max {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    col, max
                )));
            }
        }
    }
    if let Some(min) = rule.min_length {
        if let Some(s) = v.as_str() {
            if s.trim().chars().count() < min {
                return Err(AppError::Validation(format!(
                    "{} must be at least {} characters",
                    col, min
                )));
            }
        }
    }
    if let Some(pattern) = rule.pattern {
        let re = Regex::new(pattern).map_err(|_| AppError::Validation(format!("invalid pattern for {}", col)))?;
        if let Some(s) = v.as_str() {
            if !re.is_match(s) {
                return Err(AppError::Validation(format!("{} does not match required pattern", col)));
            }
        }
    }
    if let Some(min) = rule.minimum {
        if let Some(n) = v.as_i64() {
            if n < min {
                return Err(AppError::Validation(format!("{} must be at least {}", col, min)));
            }
        }
    }
    if let Some(max) = rule.maximum {
        if let Some(n) = v.as_i64() {
            if n > max {
                return Err(AppError::Validation(format!("{} must be at most {}", col, max)));
            }
        }
    }
    Ok(())
}

fn validate_format(col: &str, v: &Value, format: Format) -> Result<(), AppError> {
    match format {
        Format::Email => {
            let re = Regex::new(EMAIL_PATTERN).map_err(|_| AppError::Validation(format!("invalid pattern for {}", col)))?;
            match v.as_str() {
                Some(s) if re.is_match(s.trim()) => {}
                _ => return Err(AppError::Validation(format!("{} must be a valid email", col))),
            }
        }
    }
    Ok(())
}
