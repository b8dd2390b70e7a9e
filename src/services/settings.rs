//! Settings service

use rust_decimal::Decimal;

use crate::{
    api::settings::{SettingsResponse, UpdateSettingsRequest},
    error::{AppError, AppResult},
    models::setting,
    repository::Repository,
};

#[derive(Clone)]
pub struct SettingsService {
    repository: Repository,
}

impl SettingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get current settings as the raw key/value strings
    pub async fn get_settings(&self) -> AppResult<SettingsResponse> {
        let rows = self.repository.settings.all().await?;
        let value_of = |key: &str| {
            rows.iter()
                .find(|s| s.setting_key == key)
                .map(|s| s.setting_value.clone())
                .unwrap_or_default()
        };

        Ok(SettingsResponse {
            fine_per_day: value_of(setting::FINE_PER_DAY),
            max_borrow_days: value_of(setting::MAX_BORROW_DAYS),
            max_books_per_student: value_of(setting::MAX_BOOKS_PER_STUDENT),
        })
    }

    /// Update settings
    ///
    /// Changes are not retroactive: existing borrowings keep their due
    /// dates, and fines are computed with the rate at return time.
    pub async fn update_settings(&self, request: UpdateSettingsRequest) -> AppResult<SettingsResponse> {
        if let Some(value) = &request.fine_per_day {
            let parsed = value.parse::<Decimal>().map_err(|_| {
                AppError::Validation(format!("fine_per_day must be a decimal amount: {:?}", value))
            })?;
            if parsed < Decimal::ZERO {
                return Err(AppError::Validation(
                    "fine_per_day cannot be negative".to_string(),
                ));
            }
            self.repository
                .settings
                .update(setting::FINE_PER_DAY, value)
                .await?;
        }

        if let Some(value) = &request.max_borrow_days {
            Self::parse_positive_int(setting::MAX_BORROW_DAYS, value)?;
            self.repository
                .settings
                .update(setting::MAX_BORROW_DAYS, value)
                .await?;
        }

        if let Some(value) = &request.max_books_per_student {
            Self::parse_positive_int(setting::MAX_BOOKS_PER_STUDENT, value)?;
            self.repository
                .settings
                .update(setting::MAX_BOOKS_PER_STUDENT, value)
                .await?;
        }

        self.get_settings().await
    }

    fn parse_positive_int(key: &str, value: &str) -> AppResult<i64> {
        match value.parse::<i64>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(AppError::Validation(format!(
                "{} must be a positive integer: {:?}",
                key, value
            ))),
        }
    }
}
