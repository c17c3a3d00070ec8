use super::{body_object, decode, trimmed, RequestValidator};
use crate::error::AppError;
use crate::model::{Book, BookPatch, NewBook, BOOK_RULES};
use crate::store::BookStore;
use serde_json::Value;

pub struct BookService;

/// Blank ISBNs are stored as absent so they never collide.
fn normalize_isbn(isbn: Option<String>) -> Option<String> {
    isbn.map(trimmed).filter(|s| !s.is_empty())
}

impl BookService {
    pub async fn get(store: &dyn BookStore, id: i64) -> Result<Book, AppError> {
        store
            .get_book(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {}", id)))
    }

    pub async fn create(store: &dyn BookStore, body: Value) -> Result<Book, AppError> {
        let body = body_object(body)?;
        RequestValidator::validate(&body, BOOK_RULES)?;
        let mut book: NewBook = decode(body)?;
        book.title = trimmed(book.title);
        book.author = trimmed(book.author);
        book.isbn = normalize_isbn(book.isbn);
        if let Some(isbn) = &book.isbn {
            if store.find_book_by_isbn(isbn).await?.is_some() {
                return Err(AppError::Conflict("isbn already exists".into()));
            }
        }
        let created = store.insert_book(book).await?;
        tracing::info!(id = created.id, title = %created.title, "book created");
        Ok(created)
    }

    pub async fn update(store: &dyn BookStore, id: i64, body: Value) -> Result<Book, AppError> {
        let body = body_object(body)?;
        RequestValidator::validate_partial(&body, BOOK_RULES)?;
        let mut patch: BookPatch = decode(body)?;
        Self::get(store, id).await?;
        patch.title = patch.title.map(trimmed);
        patch.author = patch.author.map(trimmed);
        patch.isbn = patch.isbn.map(normalize_isbn);
        if let Some(Some(isbn)) = &patch.isbn {
            if let Some(other) = store.find_book_by_isbn(isbn).await? {
                if other.id != id {
                    return Err(AppError::Conflict("isbn already exists".into()));
                }
            }
        }
        let updated = store
            .update_book(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {}", id)))?;
        tracing::info!(id, "book updated");
        Ok(updated)
    }

    pub async fn delete(store: &dyn BookStore, id: i64) -> Result<(), AppError> {
        if !store.delete_book(id).await? {
            return Err(AppError::NotFound(format!("book {}", id)));
        }
        tracing::info!(id, "book deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn create_trims_and_drops_blank_isbn() {
        let store = MemoryStore::new();
        let book = BookService::create(&store, json!({"title": " Dune ", "author": "Frank Herbert", "isbn": "  "}))
            .await
            .unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.isbn, None);
    }

    #[tokio::test]
    async fn create_requires_title_and_author() {
        let store = MemoryStore::new();
        let err = BookService::create(&store, json!({"author": "Anon"})).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "title is required"));
        let err = BookService::create(&store, json!({})).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn wrongly_typed_year_is_rejected() {
        let store = MemoryStore::new();
        let err = BookService::create(&store, json!({"title": "T", "author": "A", "year": "1999"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_keeps_own_isbn() {
        let store = MemoryStore::new();
        let book = BookService::create(&store, json!({"title": "T", "author": "A", "isbn": "978-1"}))
            .await
            .unwrap();
        let same = BookService::update(&store, book.id, json!({"isbn": "978-1", "year": 2001}))
            .await
            .unwrap();
        assert_eq!(same.year, Some(2001));
    }

    #[tokio::test]
    async fn updating_a_missing_book_wins_over_isbn_conflict() {
        let store = MemoryStore::new();
        BookService::create(&store, json!({"title": "T", "author": "A", "isbn": "978-1"}))
            .await
            .unwrap();
        let err = BookService::update(&store, 999, json!({"isbn": "978-1"})).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn title_length_counts_trimmed_text() {
        let store = MemoryStore::new();
        let padded = format!(" {} ", "x".repeat(200));
        let book = BookService::create(&store, json!({"title": padded, "author": "A"})).await.unwrap();
        assert_eq!(book.title.len(), 200);
        let err = BookService::create(&store, json!({"title": "y".repeat(201), "author": "A"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn isbn_is_only_length_limited() {
        let store = MemoryStore::new();
        let book = BookService::create(&store, json!({"title": "T", "author": "A", "isbn": "ISBN 0-13-235088"}))
            .await
            .unwrap();
        assert_eq!(book.isbn.as_deref(), Some("ISBN 0-13-235088"));
        let err = BookService::create(&store, json!({"title": "T", "author": "A", "isbn": "1".repeat(21)}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_books_are_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(BookService::get(&store, 4).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            BookService::update(&store, 4, json!({"title": "x"})).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(BookService::delete(&store, 4).await, Err(AppError::NotFound(_))));
    }
}
