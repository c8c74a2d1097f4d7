//! JWT claims structure
//!
//! The payload of an access token: registered claims only (RFC 7519), with
//! the user's identity carried in `sub`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a user, expiring `expiry_seconds` from now.
    pub fn new(user_id: Uuid, issuer: String, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            iss: issuer,
            sub: user_id.to_string(),
            iat: now,
            exp: now + expiry_seconds,
        }
    }

    /// Extract the user ID from the subject claim.
    ///
    /// A subject that is not a well-formed UUID makes the whole token
    /// invalid, not an internal error.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| {
            tracing::warn!("access token subject is not a valid UUID");
            AppError::Auth(AuthError::InvalidToken)
        })
    }

    /// A token is expired from its expiry second onward (zero-width grace).
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_carry_subject_and_issuer() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "pipit".to_string(), 3600);

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, "pipit");
        assert_eq!(claims.exp, claims.iat + 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn user_id_round_trips() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "pipit".to_string(), 3600);

        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn malformed_subject_is_an_auth_failure() {
        let mut claims = Claims::new(Uuid::new_v4(), "pipit".to_string(), 3600);
        claims.sub = "not-a-uuid".to_string();

        match claims.user_id() {
            Err(AppError::Auth(AuthError::InvalidToken)) => (),
            other => panic!("Expected invalid-token failure, got {:?}", other),
        }
    }

    #[test]
    fn zero_lifetime_is_immediately_expired() {
        let claims = Claims::new(Uuid::new_v4(), "pipit".to_string(), 0);
        assert!(claims.is_expired());
    }
}
