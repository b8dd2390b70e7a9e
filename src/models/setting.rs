//! Library settings and the loan policy derived from them

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Key/value setting row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LibrarySetting {
    pub id: Uuid,
    pub setting_key: String,
    pub setting_value: String,
    pub updated_at: DateTime<Utc>,
}

pub const FINE_PER_DAY: &str = "fine_per_day";
pub const MAX_BORROW_DAYS: &str = "max_borrow_days";
pub const MAX_BOOKS_PER_STUDENT: &str = "max_books_per_student";

/// Numeric loan policy parsed from the settings table
///
/// Read at the moment a transition runs, never cached: a rate change takes
/// effect for the next operation but is not retroactive to existing
/// borrowings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanPolicy {
    pub fine_per_day: Decimal,
    pub max_borrow_days: i64,
    pub max_books_per_student: i64,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            fine_per_day: Decimal::new(50, 2), // 0.50
            max_borrow_days: 14,
            max_books_per_student: 3,
        }
    }
}

impl LoanPolicy {
    /// Build a policy from raw setting rows, falling back to defaults for
    /// missing or malformed values.
    pub fn from_settings(settings: &[LibrarySetting]) -> Self {
        let mut policy = Self::default();
        for setting in settings {
            match setting.setting_key.as_str() {
                FINE_PER_DAY => match setting.setting_value.parse::<Decimal>() {
                    Ok(v) if v >= Decimal::ZERO => policy.fine_per_day = v,
                    _ => tracing::warn!(
                        "Ignoring malformed {} setting: {:?}",
                        FINE_PER_DAY,
                        setting.setting_value
                    ),
                },
                MAX_BORROW_DAYS => match setting.setting_value.parse::<i64>() {
                    Ok(v) if v > 0 => policy.max_borrow_days = v,
                    _ => tracing::warn!(
                        "Ignoring malformed {} setting: {:?}",
                        MAX_BORROW_DAYS,
                        setting.setting_value
                    ),
                },
                MAX_BOOKS_PER_STUDENT => match setting.setting_value.parse::<i64>() {
                    Ok(v) if v > 0 => policy.max_books_per_student = v,
                    _ => tracing::warn!(
                        "Ignoring malformed {} setting: {:?}",
                        MAX_BOOKS_PER_STUDENT,
                        setting.setting_value
                    ),
                },
                _ => {}
            }
        }
        policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(key: &str, value: &str) -> LibrarySetting {
        LibrarySetting {
            id: Uuid::new_v4(),
            setting_key: key.to_string(),
            setting_value: value.to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn parses_all_known_keys() {
        let rows = vec![
            setting(FINE_PER_DAY, "1.25"),
            setting(MAX_BORROW_DAYS, "21"),
            setting(MAX_BOOKS_PER_STUDENT, "5"),
        ];
        let policy = LoanPolicy::from_settings(&rows);
        assert_eq!(policy.fine_per_day, Decimal::new(125, 2));
        assert_eq!(policy.max_borrow_days, 21);
        assert_eq!(policy.max_books_per_student, 5);
    }

    #[test]
    fn falls_back_to_defaults_on_missing_or_malformed_values() {
        let rows = vec![
            setting(FINE_PER_DAY, "not-a-number"),
            setting(MAX_BORROW_DAYS, "-3"),
            setting("unrelated_key", "whatever"),
        ];
        let policy = LoanPolicy::from_settings(&rows);
        assert_eq!(policy, LoanPolicy::default());
    }

    #[test]
    fn empty_settings_yield_defaults() {
        let policy = LoanPolicy::from_settings(&[]);
        assert_eq!(policy.fine_per_day, Decimal::new(50, 2));
        assert_eq!(policy.max_borrow_days, 14);
        assert_eq!(policy.max_books_per_student, 3);
    }
}
