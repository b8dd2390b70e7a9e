//! Student model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Student model from database
///
/// Students are deactivated rather than deleted when no longer enrolled;
/// `is_active` gates eligibility to request and borrow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: Uuid,
    /// School-issued identifier (printed on the library card)
    pub student_code: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub class_grade: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Short student form embedded in request/borrowing listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentSummary {
    pub id: Uuid,
    pub name: String,
    pub student_code: String,
}

/// Create student request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudent {
    #[validate(length(min = 1, max = 50))]
    pub student_code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub class_grade: Option<String>,
}

/// Update student request (all fields optional)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStudent {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub class_grade: Option<String>,
}

/// Query parameters for student listing
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct StudentQuery {
    /// Case-insensitive match against name or student code
    pub search: Option<String>,
    pub active_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
