//! Student management endpoints (librarian only)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::student::{CreateStudent, Student, StudentQuery, UpdateStudent},
};

use super::AuthenticatedUser;

/// List students
#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    security(("bearer_auth" = [])),
    params(StudentQuery),
    responses(
        (status = 200, description = "Matching students", body = Vec<Student>)
    )
)]
pub async fn list_students(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<StudentQuery>,
) -> AppResult<Json<Vec<Student>>> {
    claims.require_librarian()?;

    let students = state.services.students.list(&query).await?;
    Ok(Json(students))
}

/// Get a single student
#[utoipa::path(
    get,
    path = "/students/{id}",
    tag = "students",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_student(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Student>> {
    claims.require_librarian()?;

    let student = state.services.students.get(id).await?;
    Ok(Json(student))
}

/// Create a student record
#[utoipa::path(
    post,
    path = "/students",
    tag = "students",
    security(("bearer_auth" = [])),
    request_body = CreateStudent,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 409, description = "Student code already exists")
    )
)]
pub async fn create_student(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payload): Json<CreateStudent>,
) -> AppResult<(StatusCode, Json<Student>)> {
    claims.require_librarian()?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let student = state.services.students.create(payload).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// Update a student record
#[utoipa::path(
    put,
    path = "/students/{id}",
    tag = "students",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = UpdateStudent,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn update_student(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStudent>,
) -> AppResult<Json<Student>> {
    claims.require_librarian()?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let student = state.services.students.update(id, payload).await?;
    Ok(Json(student))
}

/// Deactivate a student (no deletion; history is preserved)
#[utoipa::path(
    post,
    path = "/students/{id}/deactivate",
    tag = "students",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student deactivated", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn deactivate_student(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Student>> {
    claims.require_librarian()?;

    let student = state.services.students.deactivate(id).await?;
    Ok(Json(student))
}
