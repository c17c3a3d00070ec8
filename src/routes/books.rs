use crate::handlers::books::{create_book, delete_book, get_book, index, list_books, search_books, update_book};
use crate::state::AppState;
use axum::{routing::get, Router};

/// `/` banner plus `/api/books` CRUD, list and search.
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/api/books", get(list_books).post(create_book))
        .route("/api/books/search", get(search_books))
        .route(
            "/api/books/:id",
            get(get_book).put(update_book).patch(update_book).delete(delete_book),
        )
}
