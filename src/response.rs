//! Standard response envelope helpers. Every success body carries `success: true`.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

#[derive(Serialize)]
pub struct SuccessMessage {
    pub success: bool,
    pub message: &'static str,
}

/// Paged list body: the list result flattened next to the discriminator.
#[derive(Serialize)]
pub struct SuccessPage<P> {
    pub success: bool,
    #[serde(flatten)]
    pub page: P,
}

pub fn success_created<T: Serialize>(message: &'static str, data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (
        StatusCode::CREATED,
        Json(SuccessOne {
            success: true,
            message: Some(message),
            data,
        }),
    )
}

pub fn success_one<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (
        StatusCode::OK,
        Json(SuccessOne {
            success: true,
            message: None,
            data,
        }),
    )
}

pub fn success_updated<T: Serialize>(message: &'static str, data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (
        StatusCode::OK,
        Json(SuccessOne {
            success: true,
            message: Some(message),
            data,
        }),
    )
}

pub fn success_message(message: &'static str) -> (StatusCode, Json<SuccessMessage>) {
    (StatusCode::OK, Json(SuccessMessage { success: true, message }))
}

pub fn success_page<P: Serialize>(page: P) -> (StatusCode, Json<SuccessPage<P>>) {
    (StatusCode::OK, Json(SuccessPage { success: true, page }))
}
