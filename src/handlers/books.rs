use super::{json_body, parse_id};
use crate::error::AppError;
use crate::model::Book;
use crate::response::{success_created, success_message, success_one, success_page, success_updated};
use crate::service::BookService;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

pub async fn index() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Books API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET /api/books": "list books (page, per_page, sort, order, q, author, year)",
            "GET /api/books/search": "search books",
            "GET /api/books/{id}": "get a book",
            "POST /api/books": "create a book",
            "PUT /api/books/{id}": "update a book",
            "DELETE /api/books/{id}": "delete a book",
            "GET /api/teachers": "list teachers",
            "GET /api/courses": "list courses",
            "GET /api/students": "list students",
        }
    }))
}

pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let listed = state.shaper.list::<Book, _>(&*state.books, &params).await?;
    Ok(success_page(listed))
}

#[derive(Serialize)]
struct SearchBody {
    success: bool,
    count: u64,
    books: Vec<Book>,
}

/// Same shaping as [`list_books`], reported as `{count, books}` where `count` is the full match count.
pub async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let listed = state.shaper.list::<Book, _>(&*state.books, &params).await?;
    Ok(Json(SearchBody {
        success: true,
        count: listed.total_count,
        books: listed.items,
    }))
}

pub async fn get_book(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    Ok(success_one(BookService::get(&*state.books, id).await?))
}

pub async fn create_book(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let book = BookService::create(&*state.books, json_body(body)?).await?;
    Ok(success_created("Book created successfully", book))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let book = BookService::update(&*state.books, id, json_body(body)?).await?;
    Ok(success_updated("Book updated successfully", book))
}

pub async fn delete_book(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    BookService::delete(&*state.books, id).await?;
    Ok(success_message("Book deleted successfully"))
}
