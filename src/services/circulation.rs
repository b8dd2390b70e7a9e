//! Borrowing lifecycle service
//!
//! The one place with real business rules: request intake, review,
//! direct issuance, return with overdue-fine computation, and the
//! available-copy accounting tied to each transition. Inventory is only
//! touched on approval/issuance and return, never on submit or reject.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrowing::{Borrowing, BorrowingDetails, FinePreview},
        request::{BorrowRequest, RequestDetails, ReviewDecision},
    },
    repository::Repository,
};

/// Number of whole days a borrowing is past its due date (zero if on time)
pub fn days_overdue(due_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - due_date).num_days().max(0)
}

/// Overdue fine at the given per-day rate, rounded to currency precision
pub fn compute_fine(due_date: DateTime<Utc>, now: DateTime<Utc>, fine_per_day: Decimal) -> Decimal {
    (Decimal::from(days_overdue(due_date, now)) * fine_per_day).round_dp(2)
}

/// Result of reviewing a pending request
#[derive(Debug, Clone)]
pub enum ReviewOutcome {
    /// Approval issues the book immediately
    Approved(Borrowing),
    Rejected(BorrowRequest),
}

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
}

impl CirculationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Student proposes borrowing a book
    ///
    /// Creates a pending request only; inventory is untouched until a
    /// librarian approves.
    pub async fn submit_request(&self, student_id: Uuid, book_id: Uuid) -> AppResult<BorrowRequest> {
        let student = self.repository.students.get_by_id(student_id).await?;
        if !student.is_active {
            return Err(AppError::InactiveStudent(format!(
                "Student {} is deactivated and cannot request books",
                student_id
            )));
        }

        // Book must exist; availability is deliberately not checked here,
        // it is re-verified at approval time.
        self.repository.books.get_by_id(book_id).await?;

        let request = self.repository.requests.create(student_id, book_id).await?;
        tracing::info!(request_id = %request.id, %student_id, %book_id, "Borrow request submitted");
        Ok(request)
    }

    /// Librarian approves or rejects a pending request
    ///
    /// On approval the due date comes from `max_borrow_days` as read at
    /// this instant, and the status flip, Borrowing creation and copy
    /// decrement commit atomically.
    pub async fn review_request(
        &self,
        request_id: Uuid,
        decision: ReviewDecision,
        reviewer_id: Uuid,
        notes: Option<&str>,
    ) -> AppResult<ReviewOutcome> {
        match decision {
            ReviewDecision::Rejected => {
                let request = self
                    .repository
                    .requests
                    .reject(request_id, reviewer_id, notes)
                    .await?;
                tracing::info!(%request_id, %reviewer_id, "Borrow request rejected");
                Ok(ReviewOutcome::Rejected(request))
            }
            ReviewDecision::Approved => {
                let policy = self.repository.settings.load_policy().await?;
                let due_date = Utc::now() + Duration::days(policy.max_borrow_days);
                let borrowing = self
                    .repository
                    .requests
                    .approve(
                        request_id,
                        reviewer_id,
                        notes,
                        due_date,
                        policy.max_books_per_student,
                    )
                    .await?;
                tracing::info!(
                    %request_id, %reviewer_id, borrowing_id = %borrowing.id,
                    due_date = %borrowing.due_date, "Borrow request approved, book issued"
                );
                Ok(ReviewOutcome::Approved(borrowing))
            }
        }
    }

    /// Librarian issues a book directly, without a prior request
    ///
    /// `days` defaults to the configured borrow period when not given.
    pub async fn issue_book(
        &self,
        book_id: Uuid,
        student_id: Uuid,
        days: Option<i64>,
    ) -> AppResult<Borrowing> {
        let policy = self.repository.settings.load_policy().await?;
        let days = days.unwrap_or(policy.max_borrow_days);
        if days <= 0 {
            return Err(AppError::Validation(format!(
                "Borrow period must be positive, got {} days",
                days
            )));
        }

        let due_date = Utc::now() + Duration::days(days);
        let borrowing = self
            .repository
            .borrowings
            .issue(book_id, student_id, due_date, policy.max_books_per_student)
            .await?;
        tracing::info!(
            borrowing_id = %borrowing.id, %book_id, %student_id,
            due_date = %borrowing.due_date, "Book issued"
        );
        Ok(borrowing)
    }

    /// Process a return, computing the overdue fine
    ///
    /// The fine rate in effect at return time governs, not the rate at
    /// issuance. A caller may override a nonzero computed fine (after
    /// confirming it); the service never waives one on its own.
    pub async fn return_book(
        &self,
        borrowing_id: Uuid,
        fine_override: Option<Decimal>,
    ) -> AppResult<Borrowing> {
        let borrowing = self.repository.borrowings.get_by_id(borrowing_id).await?;
        if borrowing.returned_at.is_some() {
            return Err(AppError::AlreadyReturned(format!(
                "Borrowing {} has already been returned",
                borrowing_id
            )));
        }

        let policy = self.repository.settings.load_policy().await?;
        let now = Utc::now();
        let computed = compute_fine(borrowing.due_date, now, policy.fine_per_day);

        let fine_amount = match fine_override {
            Some(fine) if fine < Decimal::ZERO => {
                return Err(AppError::Validation(format!(
                    "Fine amount cannot be negative: {}",
                    fine
                )))
            }
            Some(fine) => fine.round_dp(2),
            None => computed,
        };

        let returned = self
            .repository
            .borrowings
            .return_borrowing(borrowing_id, now, fine_amount)
            .await?;
        tracing::info!(
            %borrowing_id, fine = %fine_amount, computed = %computed,
            "Book returned"
        );
        Ok(returned)
    }

    /// Student cancels their own pending request
    pub async fn cancel_request(
        &self,
        request_id: Uuid,
        student_id: Uuid,
    ) -> AppResult<BorrowRequest> {
        let request = self.repository.requests.cancel(request_id, student_id).await?;
        tracing::info!(%request_id, %student_id, "Borrow request cancelled");
        Ok(request)
    }

    /// Compute the fine a return would settle right now, without committing
    pub async fn preview_fine(&self, borrowing_id: Uuid) -> AppResult<FinePreview> {
        let borrowing = self.repository.borrowings.get_by_id(borrowing_id).await?;
        if borrowing.returned_at.is_some() {
            return Err(AppError::AlreadyReturned(format!(
                "Borrowing {} has already been returned",
                borrowing_id
            )));
        }

        let policy = self.repository.settings.load_policy().await?;
        let now = Utc::now();

        Ok(FinePreview {
            borrowing_id,
            due_date: borrowing.due_date,
            days_overdue: days_overdue(borrowing.due_date, now),
            fine_per_day: policy.fine_per_day,
            fine_amount: compute_fine(borrowing.due_date, now, policy.fine_per_day),
        })
    }

    /// Settle the fine of a returned borrowing
    pub async fn mark_fine_paid(&self, borrowing_id: Uuid) -> AppResult<Borrowing> {
        self.repository.borrowings.mark_fine_paid(borrowing_id).await
    }

    /// Pending queue or processed history for the admin review screen
    pub async fn list_requests(&self, pending: bool, limit: i64) -> AppResult<Vec<RequestDetails>> {
        self.repository.requests.list(pending, limit).await
    }

    /// A student's own request history
    pub async fn list_student_requests(&self, student_id: Uuid) -> AppResult<Vec<RequestDetails>> {
        self.repository.requests.list_for_student(student_id).await
    }

    /// Active or returned borrowings for the admin screen
    pub async fn list_borrowings(&self, active: bool, limit: i64) -> AppResult<Vec<BorrowingDetails>> {
        self.repository.borrowings.list(active, limit).await
    }

    /// A student's active borrowings
    pub async fn list_student_borrowings(
        &self,
        student_id: Uuid,
    ) -> AppResult<Vec<BorrowingDetails>> {
        // Verify the student exists so an unknown id is a 404, not an empty list
        self.repository.students.get_by_id(student_id).await?;
        self.repository.borrowings.list_for_student(student_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rate(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn no_fine_when_returned_on_or_before_due_date() {
        let due = at(2026, 3, 10);
        assert_eq!(compute_fine(due, at(2026, 3, 10), rate(50)), Decimal::ZERO);
        assert_eq!(compute_fine(due, at(2026, 3, 1), rate(50)), Decimal::ZERO);
    }

    #[test]
    fn five_days_overdue_at_fifty_cents_is_two_fifty() {
        let due = at(2026, 3, 10);
        let returned = at(2026, 3, 15);
        assert_eq!(days_overdue(due, returned), 5);
        assert_eq!(compute_fine(due, returned, rate(50)), rate(250));
    }

    #[test]
    fn partial_days_floor_to_whole_days() {
        let due = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        // 1 day and 23 hours late still counts as 1 day
        let returned = Utc.with_ymd_and_hms(2026, 3, 12, 11, 0, 0).unwrap();
        assert_eq!(days_overdue(due, returned), 1);
        assert_eq!(compute_fine(due, returned, rate(50)), rate(50));
    }

    #[test]
    fn fine_is_rounded_to_two_decimal_places() {
        let due = at(2026, 3, 10);
        let returned = at(2026, 3, 13);
        // 3 days at 0.333/day = 0.999 -> 1.00
        let fine = compute_fine(due, returned, Decimal::new(333, 3));
        assert_eq!(fine, Decimal::new(100, 2));
    }

    #[test]
    fn fine_scales_with_rate_in_effect_at_return() {
        let due = at(2026, 3, 10);
        let returned = at(2026, 3, 20);
        assert_eq!(compute_fine(due, returned, rate(25)), rate(250));
        assert_eq!(compute_fine(due, returned, rate(100)), rate(1000));
    }
}
