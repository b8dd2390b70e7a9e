//! Repository layer for database operations
//!
//! Lifecycle transitions that touch several tables (request review, direct
//! issuance, return) run inside a single transaction here, with
//! conditional updates guarding the inventory counters.

pub mod books;
pub mod borrowings;
pub mod requests;
pub mod settings;
pub mod students;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub students: students::StudentsRepository,
    pub requests: requests::RequestsRepository,
    pub borrowings: borrowings::BorrowingsRepository,
    pub settings: settings::SettingsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            students: students::StudentsRepository::new(pool.clone()),
            requests: requests::RequestsRepository::new(pool.clone()),
            borrowings: borrowings::BorrowingsRepository::new(pool.clone()),
            settings: settings::SettingsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Verify the database connection is usable
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
