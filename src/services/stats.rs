//! Statistics service

use crate::{api::stats::StatsResponse, error::AppResult, repository::Repository};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Dashboard counters; overdue is computed on read, no polling job
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        Ok(StatsResponse {
            total_books: self.repository.books.count().await?,
            active_students: self.repository.students.count_active().await?,
            active_borrowings: self.repository.borrowings.count_active().await?,
            overdue_borrowings: self.repository.borrowings.count_overdue().await?,
            popular_books: self.repository.books.popular(5).await?,
        })
    }
}
