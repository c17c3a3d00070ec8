//! PostgreSQL store over a sqlx pool. List queries come from the safe SQL builder; writes use
//! fixed statements and map constraint violations to client errors.

use super::{BookStore, SchoolStore, EMAIL_TAKEN, ISBN_TAKEN};
use crate::error::AppError;
use crate::model::{
    Book, BookPatch, Course, NewBook, NewCourse, NewStudent, NewTeacher, Student, StudentPatch, Teacher,
};
use crate::query::{ListPlan, ListSource, Listing, Page, RecordFilter, SortField};
use crate::sql::{bind_as, bind_scalar, count, select_by_id, select_page};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

const INSERT_BOOK: &str = "INSERT INTO books (title, author, year, isbn) VALUES ($1, $2, $3, $4) \
     RETURNING id, title, author, year, isbn, created_at";
const UPDATE_BOOK: &str = "UPDATE books SET title = $1, author = $2, year = $3, isbn = $4 WHERE id = $5 \
     RETURNING id, title, author, year, isbn, created_at";
const INSERT_TEACHER: &str = "INSERT INTO teachers (name, email) VALUES ($1, $2) RETURNING id, name, email";
const INSERT_COURSE: &str = "INSERT INTO courses (name, description, teacher_id) VALUES ($1, $2, $3) \
     RETURNING id, name, description, teacher_id";
const INSERT_STUDENT: &str = "INSERT INTO students (name, email, course_id) VALUES ($1, $2, $3) \
     RETURNING id, name, email, course_id";
const UPDATE_STUDENT: &str = "UPDATE students SET name = $1, email = $2, course_id = $3 WHERE id = $4 \
     RETURNING id, name, email, course_id";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(PgStore { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn fetch_page<L>(pool: &PgPool, plan: &ListPlan<L>) -> Result<Page<L>, AppError>
where
    L: Listing + for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    let predicates = plan.filter.predicates();
    let count_q = count(L::TABLE, &predicates);
    let page_q = select_page(
        L::TABLE,
        L::COLUMNS,
        &predicates,
        plan.sort.column(),
        plan.order,
        plan.limit(),
        plan.offset(),
    );
    tracing::debug!(sql = %count_q.sql, params = ?count_q.params, "query");
    let total: i64 = bind_scalar(sqlx::query_scalar::<_, i64>(&count_q.sql), &count_q.params)
        .fetch_one(pool)
        .await?;
    tracing::debug!(sql = %page_q.sql, params = ?page_q.params, "query");
    let items = bind_as(sqlx::query_as::<_, L>(&page_q.sql), &page_q.params)
        .fetch_all(pool)
        .await?;
    Ok(Page {
        items,
        total_count: total.max(0) as u64,
    })
}

async fn fetch_by_id<L>(pool: &PgPool, id: i64) -> Result<Option<L>, AppError>
where
    L: Listing + for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = select_by_id(L::TABLE, L::COLUMNS);
    tracing::debug!(sql = %sql, id, "query");
    Ok(sqlx::query_as::<_, L>(&sql).bind(id).fetch_optional(pool).await?)
}

async fn count_all(pool: &PgPool, table: &str) -> Result<u64, AppError> {
    let q = count(table, &[]);
    let n = sqlx::query_scalar::<_, i64>(&q.sql).fetch_one(pool).await?;
    Ok(n.max(0) as u64)
}

async fn delete_by_id(pool: &PgPool, table: &str, id: i64) -> Result<bool, AppError> {
    let sql = format!("DELETE FROM {} WHERE id = $1", quote_ident(table));
    let done = sqlx::query(&sql).bind(id).execute(pool).await?;
    Ok(done.rows_affected() > 0)
}

macro_rules! list_source {
    ($record:ty) => {
        #[async_trait]
        impl ListSource<$record> for PgStore {
            async fn fetch_page(&self, plan: &ListPlan<$record>) -> Result<Page<$record>, AppError> {
                fetch_page(&self.pool, plan).await
            }
        }
    };
}

list_source!(Book);
list_source!(Teacher);
list_source!(Course);
list_source!(Student);

#[async_trait]
impl BookStore for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>, AppError> {
        fetch_by_id(&self.pool, id).await
    }

    async fn find_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>, AppError> {
        Ok(sqlx::query_as::<_, Book>("SELECT id, title, author, year, isbn, created_at FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_book(&self, book: NewBook) -> Result<Book, AppError> {
        sqlx::query_as::<_, Book>(INSERT_BOOK)
            .bind(book.title)
            .bind(book.author)
            .bind(book.year)
            .bind(book.isbn)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, ISBN_TAKEN))
    }

    async fn update_book(&self, id: i64, patch: BookPatch) -> Result<Option<Book>, AppError> {
        let mut tx = self.pool.begin().await?;
        let locked = format!("{} FOR UPDATE", select_by_id(Book::TABLE, Book::COLUMNS));
        let current: Option<Book> = sqlx::query_as(&locked).bind(id).fetch_optional(&mut *tx).await?;
        let Some(mut book) = current else {
            return Ok(None);
        };
        book.apply(patch);
        let updated: Book = sqlx::query_as(UPDATE_BOOK)
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.year)
            .bind(&book.isbn)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, ISBN_TAKEN))?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_book(&self, id: i64) -> Result<bool, AppError> {
        delete_by_id(&self.pool, Book::TABLE, id).await
    }

    async fn count_books(&self) -> Result<u64, AppError> {
        count_all(&self.pool, Book::TABLE).await
    }
}

#[async_trait]
impl SchoolStore for PgStore {
    async fn get_teacher(&self, id: i64) -> Result<Option<Teacher>, AppError> {
        fetch_by_id(&self.pool, id).await
    }

    async fn insert_teacher(&self, teacher: NewTeacher) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(INSERT_TEACHER)
            .bind(teacher.name)
            .bind(teacher.email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, EMAIL_TAKEN))
    }

    async fn count_teachers(&self) -> Result<u64, AppError> {
        count_all(&self.pool, Teacher::TABLE).await
    }

    async fn get_course(&self, id: i64) -> Result<Option<Course>, AppError> {
        fetch_by_id(&self.pool, id).await
    }

    async fn insert_course(&self, course: NewCourse) -> Result<Course, AppError> {
        sqlx::query_as::<_, Course>(INSERT_COURSE)
            .bind(course.name)
            .bind(course.description)
            .bind(course.teacher_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, "course already exists"))
    }

    async fn get_student(&self, id: i64) -> Result<Option<Student>, AppError> {
        fetch_by_id(&self.pool, id).await
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        Ok(sqlx::query_as::<_, Student>("SELECT id, name, email, course_id FROM students WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_student(&self, student: NewStudent) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(INSERT_STUDENT)
            .bind(student.name)
            .bind(student.email)
            .bind(student.course_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, EMAIL_TAKEN))
    }

    async fn update_student(&self, id: i64, patch: StudentPatch) -> Result<Option<Student>, AppError> {
        let mut tx = self.pool.begin().await?;
        let locked = format!("{} FOR UPDATE", select_by_id(Student::TABLE, Student::COLUMNS));
        let current: Option<Student> = sqlx::query_as(&locked).bind(id).fetch_optional(&mut *tx).await?;
        let Some(mut student) = current else {
            return Ok(None);
        };
        student.apply(patch);
        let updated: Student = sqlx::query_as(UPDATE_STUDENT)
            .bind(&student.name)
            .bind(&student.email)
            .bind(student.course_id)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, EMAIL_TAKEN))?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_student(&self, id: i64) -> Result<bool, AppError> {
        delete_by_id(&self.pool, Student::TABLE, id).await
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url.rfind('/').ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_url_swaps_the_database() {
        let (admin, name) = parse_db_name_from_url("postgres://u:p@localhost:5432/bookshelf?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "bookshelf");
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("book\"shelf"), "\"book\"\"shelf\"");
    }
}
