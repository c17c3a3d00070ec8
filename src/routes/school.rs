use crate::handlers::school::{
    create_course, create_student, create_teacher, delete_student, get_student, list_courses, list_students,
    list_teachers, update_student,
};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn school_routes() -> Router<AppState> {
    Router::new()
        .route("/api/teachers", get(list_teachers).post(create_teacher))
        .route("/api/courses", get(list_courses).post(create_course))
        .route("/api/students", get(list_students).post(create_student))
        .route(
            "/api/students/:id",
            get(get_student).put(update_student).patch(update_student).delete(delete_student),
        )
}
