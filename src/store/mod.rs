//! Store-access capabilities injected into handlers and the query shaper.
//!
//! Two implementations: [`PgStore`] over a sqlx pool and [`MemoryStore`] for tests and
//! database-less runs. Both enforce the uniqueness invariants (book ISBN, teacher and student
//! email) and the course/teacher references.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::error::AppError;
use crate::model::{
    Book, BookPatch, Course, NewBook, NewCourse, NewStudent, NewTeacher, Student, StudentPatch, Teacher,
};
use crate::query::ListSource;
use async_trait::async_trait;

#[async_trait]
pub trait BookStore: ListSource<Book> {
    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
    async fn get_book(&self, id: i64) -> Result<Option<Book>, AppError>;
    async fn find_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>, AppError>;
    async fn insert_book(&self, book: NewBook) -> Result<Book, AppError>;
    /// Returns `None` when no book has this id.
    async fn update_book(&self, id: i64, patch: BookPatch) -> Result<Option<Book>, AppError>;
    /// Returns whether a book was removed.
    async fn delete_book(&self, id: i64) -> Result<bool, AppError>;
    async fn count_books(&self) -> Result<u64, AppError>;
}

#[async_trait]
pub trait SchoolStore: ListSource<Teacher> + ListSource<Course> + ListSource<Student> {
    async fn get_teacher(&self, id: i64) -> Result<Option<Teacher>, AppError>;
    async fn insert_teacher(&self, teacher: NewTeacher) -> Result<Teacher, AppError>;
    async fn count_teachers(&self) -> Result<u64, AppError>;
    async fn get_course(&self, id: i64) -> Result<Option<Course>, AppError>;
    async fn insert_course(&self, course: NewCourse) -> Result<Course, AppError>;
    async fn get_student(&self, id: i64) -> Result<Option<Student>, AppError>;
    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, AppError>;
    async fn insert_student(&self, student: NewStudent) -> Result<Student, AppError>;
    async fn update_student(&self, id: i64, patch: StudentPatch) -> Result<Option<Student>, AppError>;
    async fn delete_student(&self, id: i64) -> Result<bool, AppError>;
}

pub(crate) const ISBN_TAKEN: &str = "isbn already exists";
pub(crate) const EMAIL_TAKEN: &str = "email already exists";
