//! Borrow request endpoints
//!
//! Students submit and cancel their own requests; librarians review the
//! queue. Role checks happen here, at the boundary, and the circulation
//! service trusts the ids it is handed.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        borrowing::Borrowing,
        request::{BorrowRequest, RequestDetails, RequestStatus, ReviewDecision},
    },
    services::circulation::ReviewOutcome,
};

use super::AuthenticatedUser;

/// Submit request payload
#[derive(Deserialize, ToSchema)]
pub struct SubmitRequestPayload {
    /// Book the student wants to borrow
    pub book_id: Uuid,
}

/// Review payload
#[derive(Deserialize, ToSchema)]
pub struct ReviewRequestPayload {
    /// Approve or reject
    pub decision: ReviewDecision,
    /// Optional note shown to the student
    pub notes: Option<String>,
}

/// Review response
#[derive(Serialize, ToSchema)]
pub struct ReviewResponse {
    pub request_id: Uuid,
    pub status: RequestStatus,
    /// Present when the review issued the book
    pub borrowing: Option<Borrowing>,
}

/// Query parameters for request listing
#[derive(Deserialize, utoipa::IntoParams)]
pub struct RequestListQuery {
    /// "pending" (default) or "processed"
    pub state: Option<String>,
    pub limit: Option<i64>,
}

/// Submit a borrow request for the authenticated student
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = SubmitRequestPayload,
    responses(
        (status = 201, description = "Request submitted", body = BorrowRequest),
        (status = 404, description = "Book or student not found"),
        (status = 409, description = "A pending request for this book already exists"),
        (status = 422, description = "Student is deactivated")
    )
)]
pub async fn submit_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payload): Json<SubmitRequestPayload>,
) -> AppResult<(StatusCode, Json<BorrowRequest>)> {
    let student_id = claims.require_student()?;

    let request = state
        .services
        .circulation
        .submit_request(student_id, payload.book_id)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// List the review queue or processed history
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestListQuery),
    responses(
        (status = 200, description = "Requests", body = Vec<RequestDetails>)
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RequestListQuery>,
) -> AppResult<Json<Vec<RequestDetails>>> {
    claims.require_librarian()?;

    let pending = query.state.as_deref() != Some("processed");
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let requests = state.services.circulation.list_requests(pending, limit).await?;
    Ok(Json(requests))
}

/// List the authenticated student's own requests
#[utoipa::path(
    get,
    path = "/requests/mine",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The student's request history", body = Vec<RequestDetails>)
    )
)]
pub async fn my_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<RequestDetails>>> {
    let student_id = claims.require_student()?;

    let requests = state
        .services
        .circulation
        .list_student_requests(student_id)
        .await?;
    Ok(Json(requests))
}

/// Review a pending request; approval issues the book atomically
#[utoipa::path(
    post,
    path = "/requests/{id}/review",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = ReviewRequestPayload,
    responses(
        (status = 200, description = "Request reviewed", body = ReviewResponse),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Already reviewed, or no copies available"),
        (status = 422, description = "Student borrowing limit reached")
    )
)]
pub async fn review_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<ReviewRequestPayload>,
) -> AppResult<Json<ReviewResponse>> {
    claims.require_librarian()?;

    let outcome = state
        .services
        .circulation
        .review_request(
            request_id,
            payload.decision,
            claims.sub,
            payload.notes.as_deref(),
        )
        .await?;

    let response = match outcome {
        ReviewOutcome::Approved(borrowing) => ReviewResponse {
            request_id,
            status: RequestStatus::Approved,
            borrowing: Some(borrowing),
        },
        ReviewOutcome::Rejected(_) => ReviewResponse {
            request_id,
            status: RequestStatus::Rejected,
            borrowing: None,
        },
    };
    Ok(Json(response))
}

/// Cancel the authenticated student's own pending request
#[utoipa::path(
    post,
    path = "/requests/{id}/cancel",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request cancelled", body = BorrowRequest),
        (status = 403, description = "Request belongs to another student"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending")
    )
)]
pub async fn cancel_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<BorrowRequest>> {
    let student_id = claims.require_student()?;

    let request = state
        .services
        .circulation
        .cancel_request(request_id, student_id)
        .await?;
    Ok(Json(request))
}
