//! Borrowing endpoints (librarian only, except a student's own list)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::borrowing::{Borrowing, BorrowingDetails, FinePreview},
};

use super::AuthenticatedUser;

/// Direct issuance payload
#[derive(Deserialize, Validate, ToSchema)]
pub struct IssueBookPayload {
    pub book_id: Uuid,
    pub student_id: Uuid,
    /// Borrow period; defaults to the configured max_borrow_days
    #[validate(range(min = 1, max = 60))]
    pub days: Option<i64>,
}

/// Return payload
#[derive(Deserialize, ToSchema)]
pub struct ReturnBookPayload {
    /// Confirmed or overridden fine; when omitted the computed fine applies
    #[schema(value_type = Option<String>)]
    pub fine_amount: Option<Decimal>,
}

/// Query parameters for borrowing listing
#[derive(Deserialize, utoipa::IntoParams)]
pub struct BorrowingListQuery {
    /// "active" (default) or "returned"
    pub state: Option<String>,
    pub limit: Option<i64>,
}

/// List active borrowings or returned history
#[utoipa::path(
    get,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(BorrowingListQuery),
    responses(
        (status = 200, description = "Borrowings", body = Vec<BorrowingDetails>)
    )
)]
pub async fn list_borrowings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BorrowingListQuery>,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    claims.require_librarian()?;

    let active = query.state.as_deref() != Some("returned");
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let borrowings = state.services.circulation.list_borrowings(active, limit).await?;
    Ok(Json(borrowings))
}

/// List the authenticated student's active borrowings
#[utoipa::path(
    get,
    path = "/borrowings/mine",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The student's active borrowings", body = Vec<BorrowingDetails>)
    )
)]
pub async fn my_borrowings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    let student_id = claims.require_student()?;

    let borrowings = state
        .services
        .circulation
        .list_student_borrowings(student_id)
        .await?;
    Ok(Json(borrowings))
}

/// Issue a book directly, without a prior request
#[utoipa::path(
    post,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    request_body = IssueBookPayload,
    responses(
        (status = 201, description = "Book issued", body = Borrowing),
        (status = 404, description = "Book or student not found"),
        (status = 409, description = "No copies available"),
        (status = 422, description = "Student deactivated or at borrowing limit")
    )
)]
pub async fn issue_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payload): Json<IssueBookPayload>,
) -> AppResult<(StatusCode, Json<Borrowing>)> {
    claims.require_librarian()?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let borrowing = state
        .services
        .circulation
        .issue_book(payload.book_id, payload.student_id, payload.days)
        .await?;
    Ok((StatusCode::CREATED, Json(borrowing)))
}

/// Preview the fine a return would settle right now
#[utoipa::path(
    get,
    path = "/borrowings/{id}/fine",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Borrowing ID")),
    responses(
        (status = 200, description = "Computed fine", body = FinePreview),
        (status = 404, description = "Borrowing not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn preview_fine(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(borrowing_id): Path<Uuid>,
) -> AppResult<Json<FinePreview>> {
    claims.require_librarian()?;

    let preview = state.services.circulation.preview_fine(borrowing_id).await?;
    Ok(Json(preview))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrowings/{id}/return",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Borrowing ID")),
    request_body = ReturnBookPayload,
    responses(
        (status = 200, description = "Book returned", body = Borrowing),
        (status = 404, description = "Borrowing not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(borrowing_id): Path<Uuid>,
    Json(payload): Json<ReturnBookPayload>,
) -> AppResult<Json<Borrowing>> {
    claims.require_librarian()?;

    let borrowing = state
        .services
        .circulation
        .return_book(borrowing_id, payload.fine_amount)
        .await?;
    Ok(Json(borrowing))
}

/// Mark a returned borrowing's fine as paid
#[utoipa::path(
    post,
    path = "/borrowings/{id}/fine/pay",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Borrowing ID")),
    responses(
        (status = 200, description = "Fine settled", body = Borrowing),
        (status = 404, description = "Borrowing not found"),
        (status = 409, description = "Borrowing is still active")
    )
)]
pub async fn mark_fine_paid(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(borrowing_id): Path<Uuid>,
) -> AppResult<Json<Borrowing>> {
    claims.require_librarian()?;

    let borrowing = state.services.circulation.mark_fine_paid(borrowing_id).await?;
    Ok(Json(borrowing))
}
