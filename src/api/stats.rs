//! Statistics endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::book::Book};

use super::AuthenticatedUser;

/// Dashboard statistics
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_books: i64,
    pub active_students: i64,
    pub active_borrowings: i64,
    /// Active borrowings past their due date, computed on read
    pub overdue_borrowings: i64,
    pub popular_books: Vec<Book>,
}

/// Get library statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Library statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    claims.require_librarian()?;

    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
