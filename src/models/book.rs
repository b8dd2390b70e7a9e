//! Book model and related types
//!
//! Inventory invariant: `0 <= available_quantity <= quantity` at all times,
//! and `times_borrowed` is monotonically non-decreasing (it is a lifetime
//! popularity counter, not a live-loan counter).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub shelf_location: Option<String>,
    /// Total owned copies
    pub quantity: i32,
    /// Copies not currently lent out
    pub available_quantity: i32,
    /// Lifetime count of completed issuances
    pub times_borrowed: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Short book form embedded in request/borrowing listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub author: String,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[validate(length(min = 1, max = 300))]
    pub author: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub shelf_location: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: i32,
}

/// Update book request (all fields optional)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub shelf_location: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
}

/// Query parameters for book listing
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct BookQuery {
    /// Case-insensitive match against title or author
    pub search: Option<String>,
    /// Only books with at least one available copy
    pub available_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
