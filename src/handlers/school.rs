use super::{json_body, parse_id};
use crate::error::AppError;
use crate::model::{Course, Student, Teacher};
use crate::response::{success_created, success_message, success_one, success_page, success_updated};
use crate::service::SchoolService;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

type Params = Query<HashMap<String, String>>;
type Body = Result<Json<Value>, JsonRejection>;

pub async fn list_teachers(State(state): State<AppState>, Query(params): Params) -> Result<impl IntoResponse, AppError> {
    let listed = state.shaper.list::<Teacher, _>(&*state.school, &params).await?;
    Ok(success_page(listed))
}

pub async fn create_teacher(State(state): State<AppState>, body: Body) -> Result<impl IntoResponse, AppError> {
    let teacher = SchoolService::create_teacher(&*state.school, json_body(body)?).await?;
    Ok(success_created("Teacher created successfully", teacher))
}

pub async fn list_courses(State(state): State<AppState>, Query(params): Params) -> Result<impl IntoResponse, AppError> {
    let listed = state.shaper.list::<Course, _>(&*state.school, &params).await?;
    Ok(success_page(listed))
}

pub async fn create_course(State(state): State<AppState>, body: Body) -> Result<impl IntoResponse, AppError> {
    let course = SchoolService::create_course(&*state.school, json_body(body)?).await?;
    Ok(success_created("Course created successfully", course))
}

pub async fn list_students(State(state): State<AppState>, Query(params): Params) -> Result<impl IntoResponse, AppError> {
    let listed = state.shaper.list::<Student, _>(&*state.school, &params).await?;
    Ok(success_page(listed))
}

pub async fn create_student(State(state): State<AppState>, body: Body) -> Result<impl IntoResponse, AppError> {
    let student = SchoolService::create_student(&*state.school, json_body(body)?).await?;
    Ok(success_created("Student created successfully", student))
}

pub async fn get_student(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    Ok(success_one(SchoolService::get_student(&*state.school, id).await?))
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Body,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let student = SchoolService::update_student(&*state.school, id, json_body(body)?).await?;
    Ok(success_updated("Student updated successfully", student))
}

pub async fn delete_student(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    SchoolService::delete_student(&*state.school, id).await?;
    Ok(success_message("Student deleted successfully"))
}
