//! Borrowings repository for database operations

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookSummary,
        borrowing::{Borrowing, BorrowingDetails},
        student::StudentSummary,
    },
};

#[derive(Clone)]
pub struct BorrowingsRepository {
    pool: Pool<Postgres>,
}

impl BorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrowing by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Borrowing> {
        sqlx::query_as::<_, Borrowing>("SELECT * FROM borrowings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))
    }

    /// List active borrowings (due soonest first) or returned history
    pub async fn list(&self, active: bool, limit: i64) -> AppResult<Vec<BorrowingDetails>> {
        let rows = if active {
            sqlx::query(
                r#"
                SELECT br.*, b.title AS book_title, b.author AS book_author,
                       s.name AS student_name, s.student_code
                FROM borrowings br
                JOIN books b ON br.book_id = b.id
                JOIN students s ON br.student_id = s.id
                WHERE br.returned_at IS NULL
                ORDER BY br.due_date
                LIMIT $1
                "#,
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                SELECT br.*, b.title AS book_title, b.author AS book_author,
                       s.name AS student_name, s.student_code
                FROM borrowings br
                JOIN books b ON br.book_id = b.id
                JOIN students s ON br.student_id = s.id
                WHERE br.returned_at IS NOT NULL
                ORDER BY br.returned_at DESC
                LIMIT $1
                "#,
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        let now = Utc::now();
        Ok(rows
            .into_iter()
            .map(|row| Self::details_from_row(&row, now))
            .collect())
    }

    /// List a student's active borrowings
    pub async fn list_for_student(&self, student_id: Uuid) -> AppResult<Vec<BorrowingDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT br.*, b.title AS book_title, b.author AS book_author,
                   s.name AS student_name, s.student_code
            FROM borrowings br
            JOIN books b ON br.book_id = b.id
            JOIN students s ON br.student_id = s.id
            WHERE br.student_id = $1 AND br.returned_at IS NULL
            ORDER BY br.due_date
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();
        Ok(rows
            .into_iter()
            .map(|row| Self::details_from_row(&row, now))
            .collect())
    }

    /// Issue a book directly, without a prior request
    ///
    /// The student check, the borrowing cap, the decrement-if-positive and
    /// the Borrowing insert form one transaction; a race with a concurrent
    /// approval of the last copy loses on the conditional update.
    pub async fn issue(
        &self,
        book_id: Uuid,
        student_id: Uuid,
        due_date: DateTime<Utc>,
        max_books_per_student: i64,
    ) -> AppResult<Borrowing> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // FOR UPDATE serializes concurrent issues/approvals for the same
        // student; without it two transactions can both count under the cap.
        let is_active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM students WHERE id = $1 FOR UPDATE")
                .bind(student_id)
                .fetch_optional(&mut *tx)
                .await?;

        match is_active {
            None => {
                return Err(AppError::NotFound(format!(
                    "Student with id {} not found",
                    student_id
                )))
            }
            Some(false) => {
                return Err(AppError::InactiveStudent(format!(
                    "Student {} is deactivated and cannot borrow",
                    student_id
                )))
            }
            Some(true) => {}
        }

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
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                .bind(book_id)
                .fetch_one(&mut *tx)
                .await?;
            return Err(if exists {
                AppError::NoCopiesAvailable(format!(
                    "No copies of book {} are available",
                    book_id
                ))
            } else {
                AppError::NotFound(format!("Book with id {} not found", book_id))
            });
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

    /// Return a borrowing, recording the settled fine and freeing the copy
    ///
    /// The conditional `returned_at IS NULL` guard makes a double return
    /// fail instead of incrementing availability twice. The increment is
    /// itself conditional on staying within `quantity`; an excess means a
    /// prior accounting error and aborts the transaction.
    pub async fn return_borrowing(
        &self,
        id: Uuid,
        returned_at: DateTime<Utc>,
        fine_amount: Decimal,
    ) -> AppResult<Borrowing> {
        let mut tx = self.pool.begin().await?;

        let returned = sqlx::query_as::<_, Borrowing>(
            r#"
            UPDATE borrowings
            SET returned_at = $2, fine_amount = $3
            WHERE id = $1 AND returned_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(returned_at)
        .bind(fine_amount)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(borrowing) = returned else {
            drop(tx);
            self.get_by_id(id).await?;
            return Err(AppError::AlreadyReturned(format!(
                "Borrowing {} has already been returned",
                id
            )));
        };

        let incremented = sqlx::query(
            r#"
            UPDATE books
            SET available_quantity = available_quantity + 1, updated_at = now()
            WHERE id = $1 AND available_quantity < quantity
            "#,
        )
        .bind(borrowing.book_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if incremented == 0 {
            return Err(AppError::Consistency(format!(
                "Returning borrowing {} would push book {} above its total quantity",
                id, borrowing.book_id
            )));
        }

        tx.commit().await?;

        Ok(borrowing)
    }

    /// Mark the fine of a returned borrowing as paid
    pub async fn mark_fine_paid(&self, id: Uuid) -> AppResult<Borrowing> {
        let updated = sqlx::query_as::<_, Borrowing>(
            r#"
            UPDATE borrowings
            SET fine_paid = TRUE
            WHERE id = $1 AND returned_at IS NOT NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(borrowing) => Ok(borrowing),
            None => {
                self.get_by_id(id).await?;
                Err(AppError::Conflict(format!(
                    "Borrowing {} is still active; fines are settled on return",
                    id
                )))
            }
        }
    }

    /// Count active borrowings
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrowings WHERE returned_at IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count overdue borrowings, computed on read
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowings WHERE returned_at IS NULL AND due_date < NOW()",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    fn details_from_row(row: &sqlx::postgres::PgRow, now: DateTime<Utc>) -> BorrowingDetails {
        let due_date: DateTime<Utc> = row.get("due_date");
        let returned_at: Option<DateTime<Utc>> = row.get("returned_at");
        let is_overdue = returned_at.is_none() && due_date < now;

        BorrowingDetails {
            id: row.get("id"),
            borrowed_at: row.get("borrowed_at"),
            due_date,
            returned_at,
            fine_amount: row.get("fine_amount"),
            fine_paid: row.get("fine_paid"),
            is_overdue,
            days_overdue: if is_overdue {
                (now - due_date).num_days().max(0)
            } else {
                0
            },
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
