//! Library settings repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::setting::{LibrarySetting, LoanPolicy},
};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: Pool<Postgres>,
}

impl SettingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Fetch all setting rows
    pub async fn all(&self) -> AppResult<Vec<LibrarySetting>> {
        let settings = sqlx::query_as::<_, LibrarySetting>(
            "SELECT * FROM library_settings ORDER BY setting_key",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(settings)
    }

    /// Read the loan policy as of right now
    ///
    /// Called at the moment of each lifecycle transition; values are never
    /// cached so setting changes apply to the next operation only.
    pub async fn load_policy(&self) -> AppResult<LoanPolicy> {
        let settings = self.all().await?;
        Ok(LoanPolicy::from_settings(&settings))
    }

    /// Update a single setting value by key
    pub async fn update(&self, key: &str, value: &str) -> AppResult<LibrarySetting> {
        sqlx::query_as::<_, LibrarySetting>(
            r#"
            UPDATE library_settings
            SET setting_value = $2, updated_at = now()
            WHERE setting_key = $1
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Unknown setting key: {}", key)))
    }
}
