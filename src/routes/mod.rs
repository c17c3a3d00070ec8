//! Router assembly.

mod books;
mod common;
mod school;

pub use books::book_routes;
pub use common::common_routes;
pub use school::school_routes;

use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Full application router with body limit and request tracing.
pub fn app(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes())
        .merge(book_routes())
        .merge(school_routes())
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
