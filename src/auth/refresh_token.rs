//! Refresh token lifecycle
//!
//! Opaque 256-bit tokens from the OS entropy source, hex-encoded, stored
//! verbatim as the row key. The functions here own the lifecycle policy
//! (active means present, unrevoked, unexpired); the store just holds rows.

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

use crate::error::{AppError, AuthError};
use crate::store::RefreshTokenStore;

const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new refresh token: 32 random bytes as 64 lowercase hex chars.
///
/// Fails only if the OS entropy source does.
pub fn generate_refresh_token() -> Result<String, AppError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::Internal(format!("entropy source failed: {}", e)))?;

    Ok(hex::encode(bytes))
}

/// Persist a freshly issued token for a user.
pub async fn store_refresh_token(
    store: &dyn RefreshTokenStore,
    token: &str,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<(), AppError> {
    store.insert_refresh_token(token, user_id, expires_at).await?;
    Ok(())
}

/// Resolve a presented token to its owner.
///
/// Missing, revoked, and expired tokens are indistinguishable to the caller;
/// the distinction only reaches the log.
pub async fn resolve_active_owner(
    store: &dyn RefreshTokenStore,
    token: &str,
) -> Result<Uuid, AppError> {
    let record = store.find_refresh_token(token).await?;

    match record {
        None => {
            tracing::warn!("unknown refresh token presented");
            Err(AppError::Auth(AuthError::InvalidToken))
        }
        Some(record) if record.is_revoked() => {
            tracing::warn!(user_id = %record.user_id, "revoked refresh token presented");
            Err(AppError::Auth(AuthError::InvalidToken))
        }
        Some(record) if record.is_expired() => {
            tracing::info!(user_id = %record.user_id, "expired refresh token presented");
            Err(AppError::Auth(AuthError::InvalidToken))
        }
        Some(record) => Ok(record.user_id),
    }
}

/// Mark a token revoked. The record stays in place with its original expiry;
/// reads simply treat it as inactive from now on.
pub async fn revoke_refresh_token(
    store: &dyn RefreshTokenStore,
    token: &str,
) -> Result<(), AppError> {
    let found = store.revoke_refresh_token(token).await?;
    if !found {
        return Err(AppError::NotFound("refresh token".to_string()));
    }

    Ok(())
}
