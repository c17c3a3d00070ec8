//! Bookshelf: a books REST API and school directory whose list endpoints share one
//! query shaper (page, per_page, allow-listed sort, order, filters).

pub mod config;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod query;
pub mod response;
pub mod routes;
pub mod seed;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{AppConfig, StoreBackend};
pub use error::{AppError, ConfigError};
pub use migration::ensure_schema;
pub use query::{ListPlan, Listed, PageLimits, QueryShaper, SortOrder};
pub use routes::app;
pub use seed::seed_sample_data;
pub use state::AppState;
pub use store::{ensure_database_exists, BookStore, MemoryStore, PgStore, SchoolStore};
