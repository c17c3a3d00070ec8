//! In-memory store. Tables are ordered maps behind one async RwLock; ids come from per-table
//! sequences and are never reused.

use super::{BookStore, SchoolStore, EMAIL_TAKEN, ISBN_TAKEN};
use crate::error::AppError;
use crate::model::{
    Book, BookPatch, Course, NewBook, NewCourse, NewStudent, NewTeacher, Student, StudentPatch, Teacher,
};
use crate::query::{ListPlan, ListSource, Listing, Page, RecordFilter};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Debug, Default)]
struct Tables {
    books: Table<Book>,
    teachers: Table<Teacher>,
    courses: Table<Course>,
    students: Table<Student>,
}

/// Filter, order and window records like the SQL store. Text keys compare case-folded first,
/// which approximates a non-C collation rather than matching it exactly.
fn select_page<'a, L: Listing>(rows: impl Iterator<Item = &'a L>, plan: &ListPlan<L>) -> Page<L> {
    let mut matched: Vec<&L> = rows.filter(|r| plan.filter.matches(r)).collect();
    matched.sort_by(|a, b| plan.compare(a, b));
    let total_count = matched.len() as u64;
    let offset = usize::try_from(plan.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(plan.limit()).unwrap_or(usize::MAX);
    let items = matched.into_iter().skip(offset).take(limit).cloned().collect();
    Page { items, total_count }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

macro_rules! list_source {
    ($record:ty, $table:ident) => {
        #[async_trait]
        impl ListSource<$record> for MemoryStore {
            async fn fetch_page(&self, plan: &ListPlan<$record>) -> Result<Page<$record>, AppError> {
                let tables = self.tables.read().await;
                Ok(select_page(tables.$table.rows.values(), plan))
            }
        }
    };
}

list_source!(Book, books);
list_source!(Teacher, teachers);
list_source!(Course, courses);
list_source!(Student, students);

fn isbn_taken(books: &Table<Book>, isbn: Option<&str>, except: Option<i64>) -> bool {
    let Some(isbn) = isbn else { return false };
    books
        .rows
        .values()
        .any(|b| Some(b.id) != except && b.isbn.as_deref() == Some(isbn))
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>, AppError> {
        Ok(self.tables.read().await.books.rows.get(&id).cloned())
    }

    async fn find_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .rows
            .values()
            .find(|b| b.isbn.as_deref() == Some(isbn))
            .cloned())
    }

    async fn insert_book(&self, book: NewBook) -> Result<Book, AppError> {
        let mut tables = self.tables.write().await;
        if isbn_taken(&tables.books, book.isbn.as_deref(), None) {
            return Err(AppError::Conflict(ISBN_TAKEN.into()));
        }
        let id = tables.books.next_id();
        let row = Book {
            id,
            title: book.title,
            author: book.author,
            year: book.year,
            isbn: book.isbn,
            created_at: Utc::now(),
        };
        tables.books.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update_book(&self, id: i64, patch: BookPatch) -> Result<Option<Book>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(mut updated) = tables.books.rows.get(&id).cloned() else {
            return Ok(None);
        };
        updated.apply(patch);
        if isbn_taken(&tables.books, updated.isbn.as_deref(), Some(id)) {
            return Err(AppError::Conflict(ISBN_TAKEN.into()));
        }
        tables.books.rows.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_book(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.write().await.books.rows.remove(&id).is_some())
    }

    async fn count_books(&self) -> Result<u64, AppError> {
        Ok(self.tables.read().await.books.rows.len() as u64)
    }
}

#[async_trait]
impl SchoolStore for MemoryStore {
    async fn get_teacher(&self, id: i64) -> Result<Option<Teacher>, AppError> {
        Ok(self.tables.read().await.teachers.rows.get(&id).cloned())
    }

    async fn insert_teacher(&self, teacher: NewTeacher) -> Result<Teacher, AppError> {
        let mut tables = self.tables.write().await;
        if tables.teachers.rows.values().any(|t| t.email == teacher.email) {
            return Err(AppError::Conflict(EMAIL_TAKEN.into()));
        }
        let id = tables.teachers.next_id();
        let row = Teacher {
            id,
            name: teacher.name,
            email: teacher.email,
        };
        tables.teachers.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn count_teachers(&self) -> Result<u64, AppError> {
        Ok(self.tables.read().await.teachers.rows.len() as u64)
    }

    async fn get_course(&self, id: i64) -> Result<Option<Course>, AppError> {
        Ok(self.tables.read().await.courses.rows.get(&id).cloned())
    }

    async fn insert_course(&self, course: NewCourse) -> Result<Course, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.teachers.rows.contains_key(&course.teacher_id) {
            return Err(AppError::Validation(format!("teacher {} does not exist", course.teacher_id)));
        }
        let id = tables.courses.next_id();
        let row = Course {
            id,
            name: course.name,
            description: course.description,
            teacher_id: course.teacher_id,
        };
        tables.courses.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn get_student(&self, id: i64) -> Result<Option<Student>, AppError> {
        Ok(self.tables.read().await.students.rows.get(&id).cloned())
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.students.rows.values().find(|s| s.email == email).cloned())
    }

    async fn insert_student(&self, student: NewStudent) -> Result<Student, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.courses.rows.contains_key(&student.course_id) {
            return Err(AppError::Validation(format!("course {} does not exist", student.course_id)));
        }
        if tables.students.rows.values().any(|s| s.email == student.email) {
            return Err(AppError::Conflict(EMAIL_TAKEN.into()));
        }
        let id = tables.students.next_id();
        let row = Student {
            id,
            name: student.name,
            email: student.email,
            course_id: student.course_id,
        };
        tables.students.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update_student(&self, id: i64, patch: StudentPatch) -> Result<Option<Student>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(mut updated) = tables.students.rows.get(&id).cloned() else {
            return Ok(None);
        };
        updated.apply(patch);
        if !tables.courses.rows.contains_key(&updated.course_id) {
            return Err(AppError::Validation(format!("course {} does not exist", updated.course_id)));
        }
        if tables
            .students
            .rows
            .values()
            .any(|s| s.id != id && s.email == updated.email)
        {
            return Err(AppError::Conflict(EMAIL_TAKEN.into()));
        }
        tables.students.rows.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_student(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.write().await.students.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{PageLimits, QueryShaper};
    use std::collections::HashMap;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn new_book(title: &str, author: &str, year: Option<i32>, isbn: Option<&str>) -> NewBook {
        NewBook {
            title: title.into(),
            author: author.into(),
            year,
            isbn: isbn.map(str::to_string),
        }
    }

    async fn store_with_books(n: usize) -> MemoryStore {
        let store = MemoryStore::new();
        for i in 1..=n {
            store
                .insert_book(new_book(&format!("Book {:02}", i), "Various", Some(2000 + i as i32), None))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn third_page_of_twenty_five_holds_five() {
        let store = store_with_books(25).await;
        let shaper = QueryShaper::default();
        let listed = shaper
            .list::<Book, _>(&store, &params(&[("page", "3"), ("per_page", "10")]))
            .await
            .unwrap();
        assert_eq!(listed.items.len(), 5);
        assert_eq!(listed.total_count, 25);
        assert_eq!(listed.total_pages, 3);
        assert_eq!(listed.items.first().map(|b| b.id), Some(21));
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let store = store_with_books(3).await;
        let listed = QueryShaper::default()
            .list::<Book, _>(&store, &params(&[("page", "9")]))
            .await
            .unwrap();
        assert!(listed.items.is_empty());
        assert_eq!(listed.page, 9);
        assert_eq!(listed.total_pages, 1);
    }

    #[tokio::test]
    async fn empty_store_has_no_pages() {
        let store = MemoryStore::new();
        let listed = QueryShaper::default()
            .list::<Book, _>(&store, &HashMap::new())
            .await
            .unwrap();
        assert_eq!(listed.total_count, 0);
        assert_eq!(listed.total_pages, 0);
    }

    #[tokio::test]
    async fn disallowed_sort_uses_id_ascending() {
        let store = MemoryStore::new();
        store.insert_book(new_book("Zebra", "B", None, None)).await.unwrap();
        store.insert_book(new_book("Apple", "A", None, None)).await.unwrap();
        let listed = QueryShaper::default()
            .list::<Book, _>(&store, &params(&[("sort", "secret_internal_field")]))
            .await
            .unwrap();
        assert_eq!(listed.sort, "id");
        assert_eq!(listed.items.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn descending_year_puts_missing_years_last() {
        let store = MemoryStore::new();
        store.insert_book(new_book("A", "x", None, None)).await.unwrap();
        store.insert_book(new_book("B", "x", Some(1990), None)).await.unwrap();
        store.insert_book(new_book("C", "x", Some(2010), None)).await.unwrap();
        let listed = QueryShaper::new(PageLimits::default())
            .list::<Book, _>(&store, &params(&[("sort", "year"), ("order", "desc")]))
            .await
            .unwrap();
        let titles: Vec<_> = listed.items.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn author_and_year_filters_intersect() {
        let store = MemoryStore::new();
        store.insert_book(new_book("Nineteen Eighty-Four", "George Orwell", Some(1949), None)).await.unwrap();
        store.insert_book(new_book("Animal Farm", "George Orwell", Some(1945), None)).await.unwrap();
        store.insert_book(new_book("Sexual Behavior in the Human Male", "Alfred Kinsey", Some(1948), None)).await.unwrap();
        store.insert_book(new_book("The Second Sex", "Simone de Beauvoir", Some(1949), None)).await.unwrap();
        let listed = QueryShaper::default()
            .list::<Book, _>(&store, &params(&[("author", "Orwell"), ("year", "1949")]))
            .await
            .unwrap();
        assert_eq!(listed.total_count, 1);
        assert_eq!(listed.items[0].title, "Nineteen Eighty-Four");
    }

    #[tokio::test]
    async fn isbn_stays_unique() {
        let store = MemoryStore::new();
        store.insert_book(new_book("A", "x", None, Some("978-1"))).await.unwrap();
        let b = store.insert_book(new_book("B", "y", None, Some("978-2"))).await.unwrap();
        assert!(matches!(
            store.insert_book(new_book("C", "z", None, Some("978-1"))).await,
            Err(AppError::Conflict(_))
        ));
        let patch = BookPatch {
            isbn: Some(Some("978-1".into())),
            ..BookPatch::default()
        };
        assert!(matches!(store.update_book(b.id, patch).await, Err(AppError::Conflict(_))));
        // Books without an ISBN never collide.
        store.insert_book(new_book("D", "w", None, None)).await.unwrap();
        store.insert_book(new_book("E", "v", None, None)).await.unwrap();
    }

    #[tokio::test]
    async fn ids_are_not_reused() {
        let store = store_with_books(2).await;
        assert!(store.delete_book(2).await.unwrap());
        assert!(!store.delete_book(2).await.unwrap());
        let next = store.insert_book(new_book("Next", "x", None, None)).await.unwrap();
        assert_eq!(next.id, 3);
    }

    #[tokio::test]
    async fn students_need_an_existing_course() {
        let store = MemoryStore::new();
        let err = store
            .insert_student(NewStudent {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                course_id: 1,
            })
            .await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }
}
