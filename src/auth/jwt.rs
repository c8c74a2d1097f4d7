//! Access token issuance and validation
//!
//! HS256 tokens carrying the claims in `claims.rs`. There is no path that
//! reads claims without the signature verifying first.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};

/// Issue an access token for a user with the given lifetime.
///
/// `expiry_seconds` is supplied by the caller so the ceiling policy stays in
/// the session layer.
pub fn issue_access_token(
    user_id: Uuid,
    config: &AuthSettings,
    expiry_seconds: i64,
) -> Result<String, AppError> {
    let claims = Claims::new(user_id, config.issuer.clone(), expiry_seconds);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
}

/// Validate an access token and return the user it identifies.
///
/// Rejects bad signatures, wrong issuers, expired tokens, and malformed
/// subjects, all as the same generic failure. Expiry is checked strictly:
/// the default leeway is zeroed and the boundary second counts as expired.
pub fn validate_access_token(token: &str, config: &AuthSettings) -> Result<Uuid, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::warn!("access token rejected: {}", e);
        AppError::Auth(AuthError::InvalidToken)
    })?;

    // The library accepts exp == now; the contract here does not.
    if data.claims.is_expired() {
        tracing::warn!("access token rejected: expired");
        return Err(AppError::Auth(AuthError::InvalidToken));
    }

    data.claims.user_id()
}
