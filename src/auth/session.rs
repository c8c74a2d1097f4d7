//! Session orchestration
//!
//! Composes the hasher, token codec, extractor, and refresh-token lifecycle
//! into the flows the HTTP layer calls. Constructed once at startup with its
//! stores and settings; holds no mutable state of its own.

use actix_web::http::header::HeaderMap;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::bearer::bearer_token;
use crate::auth::jwt::{issue_access_token, validate_access_token};
use crate::auth::password::verify_password;
use crate::auth::refresh_token::{
    generate_refresh_token, resolve_active_owner, revoke_refresh_token, store_refresh_token,
};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};
use crate::store::{RefreshTokenStore, User, UserStore};

pub struct SessionManager {
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    settings: AuthSettings,
}

/// Everything a successful login produces.
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// A re-minted access token from a refresh.
pub struct RefreshedAccess {
    pub access_token: String,
    pub expires_in: i64,
}

impl SessionManager {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            settings,
        }
    }

    /// Authenticate credentials and mint a session.
    ///
    /// Unknown email and wrong password are the same failure; nothing in the
    /// response or its timing distinguishes them beyond the hash check
    /// itself. A client-requested access lifetime is honored only up to the
    /// configured ceiling. Each login stores one refresh-token row, so
    /// concurrent sessions for one account coexist.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        requested_ttl: Option<i64>,
    ) -> Result<LoginOutcome, AppError> {
        let user = self
            .users
            .find_user_by_email(email)
            .await?
            .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

        if !verify_password(password, &user.hashed_password)? {
            return Err(AppError::Auth(AuthError::InvalidCredentials));
        }

        let expires_in = clamp_access_ttl(requested_ttl, self.settings.access_token_expiry);
        let access_token = issue_access_token(user.id, &self.settings, expires_in)?;

        let refresh_token = generate_refresh_token()?;
        let expires_at = Utc::now() + Duration::seconds(self.settings.refresh_token_expiry);
        store_refresh_token(self.refresh_tokens.as_ref(), &refresh_token, user.id, expires_at)
            .await?;

        tracing::info!(user_id = %user.id, "user logged in");

        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
            expires_in,
        })
    }

    /// Resolve the access token in an Authorization header to a user.
    ///
    /// Purely computational; no store access.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Uuid, AppError> {
        let token = bearer_token(headers)?;
        validate_access_token(&token, &self.settings)
    }

    /// Exchange an active refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated; it stays valid until it
    /// expires or is revoked. A token whose owning user no longer exists is
    /// just another invalid token.
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<RefreshedAccess, AppError> {
        let token = bearer_token(headers)?;
        let user_id = resolve_active_owner(self.refresh_tokens.as_ref(), &token).await?;

        let user = match self.users.find_user_by_id(user_id).await? {
            Some(user) => user,
            None => {
                tracing::warn!(user_id = %user_id, "refresh token owned by a missing user");
                return Err(AppError::Auth(AuthError::InvalidToken));
            }
        };

        let expires_in = self.settings.access_token_expiry;
        let access_token = issue_access_token(user.id, &self.settings, expires_in)?;

        tracing::info!(user_id = %user.id, "access token refreshed");

        Ok(RefreshedAccess {
            access_token,
            expires_in,
        })
    }

    /// Revoke the refresh token in an Authorization header.
    ///
    /// Succeeds whether or not the token existed; telling a caller which
    /// would confirm token validity.
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let token = bearer_token(headers)?;

        match revoke_refresh_token(self.refresh_tokens.as_ref(), &token).await {
            Ok(()) => Ok(()),
            Err(AppError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn clamp_access_ttl(requested: Option<i64>, ceiling: i64) -> i64 {
    match requested {
        Some(seconds) if seconds > 0 => seconds.min(ceiling),
        _ => ceiling,
    }
}
