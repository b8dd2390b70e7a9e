//! Borrowing model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::book::BookSummary;
use super::student::StudentSummary;

/// Borrowing model from database
///
/// While `returned_at` is null the borrowing is active and counts against
/// the book's lent-out copies. Once set, the row is immutable except for
/// `fine_paid`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrowing {
    pub id: Uuid,
    pub book_id: Uuid,
    pub student_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    #[schema(value_type = String)]
    pub fine_amount: Decimal,
    pub fine_paid: bool,
}

/// Borrowing with book and student details for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowingDetails {
    pub id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    #[schema(value_type = String)]
    pub fine_amount: Decimal,
    pub fine_paid: bool,
    /// Computed on read; there is no background overdue job
    pub is_overdue: bool,
    pub days_overdue: i64,
    pub book: BookSummary,
    pub student: StudentSummary,
}

/// Computed fine for an active borrowing, shown before confirming a return
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FinePreview {
    pub borrowing_id: Uuid,
    pub due_date: DateTime<Utc>,
    pub days_overdue: i64,
    /// Rate in effect right now; the rate at return time governs the fine
    #[schema(value_type = String)]
    pub fine_per_day: Decimal,
    #[schema(value_type = String)]
    pub fine_amount: Decimal,
}
