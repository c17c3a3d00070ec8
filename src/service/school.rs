use super::{body_object, decode, trimmed, RequestValidator};
use crate::error::AppError;
use crate::model::{
    Course, NewCourse, NewStudent, NewTeacher, Student, StudentPatch, Teacher, COURSE_RULES, STUDENT_RULES,
    TEACHER_RULES,
};
use crate::store::SchoolStore;
use serde_json::Value;

pub struct SchoolService;

impl SchoolService {
    pub async fn create_teacher(store: &dyn SchoolStore, body: Value) -> Result<Teacher, AppError> {
        let body = body_object(body)?;
        RequestValidator::validate(&body, TEACHER_RULES)?;
        let mut teacher: NewTeacher = decode(body)?;
        teacher.name = trimmed(teacher.name);
        teacher.email = trimmed(teacher.email);
        let created = store.insert_teacher(teacher).await?;
        tracing::info!(id = created.id, "teacher created");
        Ok(created)
    }

    pub async fn create_course(store: &dyn SchoolStore, body: Value) -> Result<Course, AppError> {
        let body = body_object(body)?;
        RequestValidator::validate(&body, COURSE_RULES)?;
        let mut course: NewCourse = decode(body)?;
        course.name = trimmed(course.name);
        if store.get_teacher(course.teacher_id).await?.is_none() {
            return Err(AppError::Validation(format!("teacher {} does not exist", course.teacher_id)));
        }
        let created = store.insert_course(course).await?;
        tracing::info!(id = created.id, teacher_id = created.teacher_id, "course created");
        Ok(created)
    }

    pub async fn get_student(store: &dyn SchoolStore, id: i64) -> Result<Student, AppError> {
        store
            .get_student(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("student {}", id)))
    }

    pub async fn create_student(store: &dyn SchoolStore, body: Value) -> Result<Student, AppError> {
        let body = body_object(body)?;
        RequestValidator::validate(&body, STUDENT_RULES)?;
        let mut student: NewStudent = decode(body)?;
        student.name = trimmed(student.name);
        student.email = trimmed(student.email);
        Self::ensure_course(store, student.course_id).await?;
        if store.find_student_by_email(&student.email).await?.is_some() {
            return Err(AppError::Conflict("email already exists".into()));
        }
        let created = store.insert_student(student).await?;
        tracing::info!(id = created.id, course_id = created.course_id, "student created");
        Ok(created)
    }

    pub async fn update_student(store: &dyn SchoolStore, id: i64, body: Value) -> Result<Student, AppError> {
        let body = body_object(body)?;
        RequestValidator::validate_partial(&body, STUDENT_RULES)?;
        let mut patch: StudentPatch = decode(body)?;
        Self::get_student(store, id).await?;
        patch.name = patch.name.map(trimmed);
        patch.email = patch.email.map(trimmed);
        if let Some(course_id) = patch.course_id {
            Self::ensure_course(store, course_id).await?;
        }
        if let Some(email) = &patch.email {
            if let Some(other) = store.find_student_by_email(email).await? {
                if other.id != id {
                    return Err(AppError::Conflict("email already exists".into()));
                }
            }
        }
        let updated = store
            .update_student(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("student {}", id)))?;
        tracing::info!(id, "student updated");
        Ok(updated)
    }

    pub async fn delete_student(store: &dyn SchoolStore, id: i64) -> Result<(), AppError> {
        if !store.delete_student(id).await? {
            return Err(AppError::NotFound(format!("student {}", id)));
        }
        tracing::info!(id, "student deleted");
        Ok(())
    }

    async fn ensure_course(store: &dyn SchoolStore, course_id: i64) -> Result<(), AppError> {
        match store.get_course(course_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::Validation(format!("course {} does not exist", course_id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    async fn store_with_course() -> MemoryStore {
        let store = MemoryStore::new();
        SchoolService::create_teacher(&store, json!({"name": "John Smith", "email": "john@example.com"}))
            .await
            .unwrap();
        SchoolService::create_course(&store, json!({"name": "Python Basics", "teacher_id": 1}))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn course_needs_a_teacher() {
        let store = MemoryStore::new();
        let err = SchoolService::create_course(&store, json!({"name": "Orphan", "teacher_id": 9}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m.contains("teacher 9")));
    }

    #[tokio::test]
    async fn student_email_must_be_valid_and_unique() {
        let store = store_with_course().await;
        let err = SchoolService::create_student(&store, json!({"name": "Ada", "email": "ada.example.com", "course_id": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        SchoolService::create_student(&store, json!({"name": "Ada", "email": "ada@example.com", "course_id": 1}))
            .await
            .unwrap();
        let err = SchoolService::create_student(&store, json!({"name": "Ada II", "email": "ada@example.com", "course_id": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn student_fields_are_all_required() {
        let store = store_with_course().await;
        let err = SchoolService::create_student(&store, json!({"name": "Ada", "email": "ada@example.com"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "course_id is required"));
    }

    #[tokio::test]
    async fn updating_a_missing_student_is_not_found() {
        let store = store_with_course().await;
        let err = SchoolService::update_student(&store, 42, json!({"course_id": 7}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn student_update_and_delete() {
        let store = store_with_course().await;
        let s = SchoolService::create_student(&store, json!({"name": "Ada", "email": "ada@example.com", "course_id": 1}))
            .await
            .unwrap();
        let updated = SchoolService::update_student(&store, s.id, json!({"name": "Ada Lovelace"}))
            .await
            .unwrap();
        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.email, "ada@example.com");
        assert!(matches!(
            SchoolService::update_student(&store, s.id, json!({"course_id": 7})).await,
            Err(AppError::Validation(_))
        ));
        SchoolService::delete_student(&store, s.id).await.unwrap();
        assert!(matches!(
            SchoolService::get_student(&store, s.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
