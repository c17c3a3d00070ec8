//! Shared application state: injected store capabilities and the query shaper.

use crate::query::{PageLimits, QueryShaper};
use crate::store::{BookStore, MemoryStore, PgStore, SchoolStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub books: Arc<dyn BookStore>,
    pub school: Arc<dyn SchoolStore>,
    pub shaper: QueryShaper,
}

impl AppState {
    pub fn new(books: Arc<dyn BookStore>, school: Arc<dyn SchoolStore>, limits: PageLimits) -> Self {
        AppState {
            books,
            school,
            shaper: QueryShaper::new(limits),
        }
    }

    pub fn postgres(store: PgStore, limits: PageLimits) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store, limits)
    }

    pub fn in_memory(limits: PageLimits) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, limits)
    }
}
