//! Sample data for empty stores.

use crate::error::AppError;
use crate::model::{NewBook, NewCourse, NewTeacher};
use crate::store::{BookStore, SchoolStore};

const BOOKS: &[(&str, &str, i32, &str)] = &[
    ("Python Crash Course", "Eric Matthes", 2019, "978-1593279288"),
    ("Flask Web Development", "Miguel Grinberg", 2018, "978-1491991732"),
    ("Clean Code", "Robert C. Martin", 2008, "978-0132350884"),
];

const TEACHERS: &[(&str, &str)] = &[
    ("John Smith", "john@example.com"),
    ("Alice Johnson", "alice@example.com"),
];

/// Course name, description, index into `TEACHERS`.
const COURSES: &[(&str, &str, usize)] = &[
    ("Python Basics", "Learn Python", 0),
    ("Web Development", "Flask & Frontend", 1),
];

/// Insert sample books, teachers and courses into whichever of the collections is empty.
pub async fn seed_sample_data(books: &dyn BookStore, school: &dyn SchoolStore) -> Result<(), AppError> {
    if books.count_books().await? == 0 {
        for (title, author, year, isbn) in BOOKS {
            books
                .insert_book(NewBook {
                    title: (*title).to_string(),
                    author: (*author).to_string(),
                    year: Some(*year),
                    isbn: Some((*isbn).to_string()),
                })
                .await?;
        }
        tracing::info!(count = BOOKS.len(), "sample books added");
    }

    if school.count_teachers().await? == 0 {
        let mut teacher_ids = Vec::with_capacity(TEACHERS.len());
        for (name, email) in TEACHERS {
            let teacher = school
                .insert_teacher(NewTeacher {
                    name: (*name).to_string(),
                    email: (*email).to_string(),
                })
                .await?;
            teacher_ids.push(teacher.id);
        }
        for (name, description, teacher) in COURSES {
            school
                .insert_course(NewCourse {
                    name: (*name).to_string(),
                    description: Some((*description).to_string()),
                    teacher_id: teacher_ids[*teacher],
                })
                .await?;
        }
        tracing::info!(teachers = TEACHERS.len(), courses = COURSES.len(), "sample school data added");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let store = MemoryStore::new();
        seed_sample_data(&store, &store).await.unwrap();
        seed_sample_data(&store, &store).await.unwrap();
        assert_eq!(store.count_books().await.unwrap(), 3);
        assert_eq!(store.count_teachers().await.unwrap(), 2);
        assert!(store.get_course(2).await.unwrap().is_some());
        assert!(store.find_book_by_isbn("978-0132350884").await.unwrap().is_some());
    }
}
