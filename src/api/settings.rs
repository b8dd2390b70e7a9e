//! Settings endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Settings response; values are the raw strings from the settings table
#[derive(Serialize, ToSchema)]
pub struct SettingsResponse {
    /// Overdue fine per day, e.g. "0.50"
    pub fine_per_day: String,
    /// Default/maximum borrow period in days
    pub max_borrow_days: String,
    /// Maximum simultaneous borrowings per student
    pub max_books_per_student: String,
}

/// Update settings request
#[derive(Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub fine_per_day: Option<String>,
    pub max_borrow_days: Option<String>,
    pub max_books_per_student: Option<String>,
}

/// Get current settings
#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current settings", body = SettingsResponse)
    )
)]
pub async fn get_settings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<SettingsResponse>> {
    claims.require_librarian()?;

    let settings = state.services.settings.get_settings().await?;
    Ok(Json(settings))
}

/// Update settings; not retroactive to existing borrowings
#[utoipa::path(
    put,
    path = "/settings",
    tag = "settings",
    security(("bearer_auth" = [])),
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = SettingsResponse),
        (status = 400, description = "Non-numeric or out-of-range value")
    )
)]
pub async fn update_settings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UpdateSettingsRequest>,
) -> AppResult<Json<SettingsResponse>> {
    claims.require_librarian()?;

    let settings = state.services.settings.update_settings(request).await?;
    Ok(Json(settings))
}
