//! Storage layer
//!
//! Narrow async traits over the durable records, with a PostgreSQL
//! implementation for production and an in-memory one for tests and local
//! runs. Lifecycle policy (expiry, revocation checks) lives in the auth
//! layer; the stores only persist and report.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub hashed_password: String,
    pub is_premium: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

/// A stored refresh token. The raw token value is the primary key.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    pub fn is_active(&self) -> bool {
        !self.is_revoked() && !self.is_expired()
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Replaces email and credential material; `None` when the user is gone.
    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Flags the user as premium. Returns false when no such user exists.
    async fn set_premium(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn delete_all_users(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Fetches the record regardless of lifecycle state; revoked and expired
    /// rows are returned as-is so the caller decides what they mean.
    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Stamps `revoked_at`. Returns false when no such token exists;
    /// re-stamping an already revoked token is not an error.
    async fn revoke_refresh_token(&self, token: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, body: &str, user_id: Uuid) -> Result<Post, StoreError>;

    /// Lists posts in ascending creation order, optionally by author.
    async fn list_posts(&self, author_id: Option<Uuid>) -> Result<Vec<Post>, StoreError>;

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), StoreError>;

    async fn delete_all_posts(&self) -> Result<(), StoreError>;
}

/// Handle bundling the store trait objects the application runs against.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserStore>,
    pub posts: Arc<dyn PostStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl Storage {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            users: store.clone(),
            posts: store.clone(),
            refresh_tokens: store,
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            posts: store.clone(),
            refresh_tokens: store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_at: DateTime<Utc>, revoked_at: Option<DateTime<Utc>>) -> RefreshTokenRecord {
        RefreshTokenRecord {
            token: "a".repeat(64),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            user_id: Uuid::new_v4(),
            expires_at,
            revoked_at,
        }
    }

    #[test]
    fn fresh_record_is_active() {
        let r = record(Utc::now() + Duration::days(60), None);
        assert!(r.is_active());
        assert!(!r.is_revoked());
        assert!(!r.is_expired());
    }

    #[test]
    fn revoked_record_is_not_active() {
        let r = record(Utc::now() + Duration::days(60), Some(Utc::now()));
        assert!(r.is_revoked());
        assert!(!r.is_active());
    }

    #[test]
    fn expired_record_is_not_active() {
        let r = record(Utc::now() - Duration::seconds(1), None);
        assert!(r.is_expired());
        assert!(!r.is_active());
    }
}
