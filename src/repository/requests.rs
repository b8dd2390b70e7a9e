//! Borrow requests repository for database operations
//!
//! Approval is the one transition here with inventory side-effects: the
//! status flip, the Borrowing insert and the decrement-if-positive on the
//! book all commit as a single transaction or not at all.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookSummary,
        borrowing::Borrowing,
        request::{BorrowRequest, RequestDetails, RequestStatus},
        student::StudentSummary,
    },
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))
    }

    /// Create a pending request
    ///
    /// The partial unique index on (student_id, book_id) WHERE pending is
    /// the authoritative duplicate guard; a racing second submit fails here
    /// rather than slipping past a read-then-write check.
    pub async fn create(&self, student_id: Uuid, book_id: Uuid) -> AppResult<BorrowRequest> {
        let result = sqlx::query_as::<_, BorrowRequest>(
            r#"
            INSERT INTO borrow_requests (student_id, book_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(request) => Ok(request),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::DuplicateRequest(format!(
                    "Student {} already has a pending request for book {}",
                    student_id, book_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List requests, pending queue first-come-first-served or processed
    /// history most recent first
    pub async fn list(&self, pending: bool, limit: i64) -> AppResult<Vec<RequestDetails>> {
        let rows = if pending {
            sqlx::query(
                r#"
                SELECT r.*, b.title AS book_title, b.author AS book_author,
                       s.name AS student_name, s.student_code
                FROM borrow_requests r
                JOIN books b ON r.book_id = b.id
                JOIN students s ON r.student_id = s.id
                WHERE r.status = 'pending'
                ORDER BY r.requested_at
                LIMIT $1
                "#,
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                SELECT r.*, b.title AS book_title, b.author AS book_author,
                       s.name AS student_name, s.student_code
                FROM borrow_requests r
                JOIN books b ON r.book_id = b.id
                JOIN students s ON r.student_id = s.id
                WHERE r.status != 'pending'
                ORDER BY r.reviewed_at DESC NULLS LAST
                LIMIT $1
                "#,
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows.into_iter().map(|row| Self::details_from_row(&row)).collect())
    }

    /// List a student's own requests, newest first
    pub async fn list_for_student(&self, student_id: Uuid) -> AppResult<Vec<RequestDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT r.*, b.title AS book_title, b.author AS book_author,
                   s.name AS student_name, s.student_code
            FROM borrow_requests r
            JOIN books b ON r.book_id = b.id
            JOIN students s ON r.student_id = s.id
            WHERE r.student_id = $1
            ORDER BY r.requested_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| Self::details_from_row(&row)).collect())
    }

    /// Approve a pending request and issue the book atomically
    ///
    /// Availability is re-checked here with a decrement-if-positive update:
    /// it may have changed since the request was submitted, and two
    /// reviewers racing on the last copy must not drive the counter
    /// negative.
    pub async fn approve(
        &self,
        id: Uuid,
        reviewer_id: Uuid,
        notes: Option<&str>,
        due_date: DateTime<Utc>,
        max_books_per_student: i64,
    ) -> AppResult<Borrowing> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE borrow_requests
            SET status = 'approved', reviewed_at = $2, reviewed_by = $3, admin_notes = $4
            WHERE id = $1 AND status = 'pending'
            RETURNING student_id, book_id
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(reviewer_id)
        .bind(notes)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            // Dropping the transaction rolls it back.
            drop(tx);
            let request = self.get_by_id(id).await?;
            return Err(AppError::AlreadyReviewed(format!(
                "Request {} has already been reviewed (status: {})",
                id, request.status
            )));
        };

        let student_id: Uuid = row.get("student_id");
        let book_id: Uuid = row.get("book_id");

        // Lock the student row so concurrent approvals (or a racing direct
        // issue) for the same student cannot both pass the cap count below.
        let _: Option<i32> = sqlx::query_scalar("SELECT 1 FROM students WHERE id = $1 FOR UPDATE")
            .bind(student_id)
            .fetch_optional(&mut *tx)
            .await?;

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowings WHERE student_id = $1 AND returned_at IS NULL",
        )
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await?;

        if active >= max_books_per_student {
            return Err(AppError::MaxBooksReached(format!(
                "Student {} already has {} of {} allowed books on loan",
                student_id, active, max_books_per_student
            )));
        }

        let decremented = sqlx::query(
            r#"
            UPDATE books
            SET available_quantity = available_quantity - 1,
                times_borrowed = times_borrowed + 1,
                updated_at = now()
            WHERE id = $1 AND available_quantity > 0
            "#,
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if decremented == 0 {
            return Err(AppError::NoCopiesAvailable(format!(
                "No copies of book {} are available",
                book_id
            )));
        }

        let borrowing = sqlx::query_as::<_, Borrowing>(
            r#"
            INSERT INTO borrowings (book_id, student_id, borrowed_at, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(student_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(borrowing)
    }

    /// Reject a pending request; never touches inventory
    pub async fn reject(
        &self,
        id: Uuid,
        reviewer_id: Uuid,
        notes: Option<&str>,
    ) -> AppResult<BorrowRequest> {
        let rejected = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = 'rejected', reviewed_at = $2, reviewed_by = $3, admin_notes = $4
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .bind(reviewer_id)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await?;

        match rejected {
            Some(request) => Ok(request),
            None => {
                let request = self.get_by_id(id).await?;
                Err(AppError::AlreadyReviewed(format!(
                    "Request {} has already been reviewed (status: {})",
                    id, request.status
                )))
            }
        }
    }

    /// Cancel a pending request on behalf of the student who filed it
    pub async fn cancel(&self, id: Uuid, student_id: Uuid) -> AppResult<BorrowRequest> {
        let cancelled = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = 'cancelled'
            WHERE id = $1 AND student_id = $2 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        match cancelled {
            Some(request) => Ok(request),
            None => {
                let request = self.get_by_id(id).await?;
                if request.student_id != student_id {
                    return Err(AppError::Authorization(format!(
                        "Request {} does not belong to student {}",
                        id, student_id
                    )));
                }
                Err(AppError::AlreadyReviewed(format!(
                    "Request {} is no longer pending (status: {})",
                    id, request.status
                )))
            }
        }
    }

    fn details_from_row(row: &sqlx::postgres::PgRow) -> RequestDetails {
        RequestDetails {
            id: row.get("id"),
            status: row.get::<RequestStatus, _>("status"),
            requested_at: row.get("requested_at"),
            reviewed_at: row.get("reviewed_at"),
            admin_notes: row.get("admin_notes"),
            book: BookSummary {
                id: row.get("book_id"),
                title: row.get("book_title"),
                author: row.get("book_author"),
            },
            student: StudentSummary {
                id: row.get("student_id"),
                name: row.get("student_name"),
                student_code: row.get("student_code"),
            },
        }
    }
}
