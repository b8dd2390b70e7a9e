//! JWT claims for callers authenticated by the external identity provider
//!
//! The server never issues credentials itself; it only verifies bearer
//! tokens and enforces the role they carry at the API boundary. The
//! lifecycle services below this layer trust the pre-authorized role.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Caller role carried in the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Librarian,
    Student,
}

/// Verified JWT claims
///
/// For students, `sub` is the student row id; for librarians it is the
/// staff account id recorded as `reviewed_by` on reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a JWT token (used by tests and provisioning tools)
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn require_librarian(&self) -> AppResult<()> {
        if self.role == Role::Librarian {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Librarian privileges required".to_string(),
            ))
        }
    }

    /// Require the student role and return the caller's student id
    pub fn require_student(&self) -> AppResult<Uuid> {
        if self.role == Role::Student {
            Ok(self.sub)
        } else {
            Err(AppError::Authorization(
                "Student account required".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn claims(role: Role) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: Uuid::new_v4(),
            role,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn token_round_trip_preserves_role() {
        let original = claims(Role::Student);
        let token = original.create_token("test-secret").unwrap();
        let parsed = UserClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(parsed.sub, original.sub);
        assert_eq!(parsed.role, Role::Student);
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let token = claims(Role::Librarian).create_token("secret-a").unwrap();
        assert!(UserClaims::from_token(&token, "secret-b").is_err());
    }

    #[test]
    fn role_checks() {
        let librarian = claims(Role::Librarian);
        assert!(librarian.require_librarian().is_ok());
        assert!(librarian.require_student().is_err());

        let student = claims(Role::Student);
        assert!(student.require_librarian().is_err());
        assert_eq!(student.require_student().unwrap(), student.sub);
    }
}
