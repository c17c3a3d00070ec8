//! Table DDL for the books API and the school directory. Every statement is idempotent, so
//! this runs on each start before the store is handed out.

use crate::error::AppError;
use sqlx::PgPool;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS books (
        id BIGSERIAL PRIMARY KEY,
        title VARCHAR(200) NOT NULL,
        author VARCHAR(100) NOT NULL,
        year INTEGER,
        isbn VARCHAR(20) UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS books_author_idx ON books (author)",
    r#"
    CREATE TABLE IF NOT EXISTS teachers (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(120) NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        description TEXT,
        teacher_id BIGINT NOT NULL REFERENCES teachers (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(120) NOT NULL UNIQUE,
        course_id BIGINT NOT NULL REFERENCES courses (id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS students_course_idx ON students (course_id)",
];

/// Create the tables and indexes if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), AppError> {
    for ddl in SCHEMA {
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::info!(statements = SCHEMA.len(), "schema ensured");
    Ok(())
}
