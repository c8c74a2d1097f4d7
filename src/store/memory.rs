//! In-memory store
//!
//! Backs integration tests and local development. A single mutex serializes
//! all access, giving the same one-row-one-state guarantee the database
//! provides when a revoke races a refresh.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{Post, PostStore, RefreshTokenRecord, RefreshTokenStore, User, UserStore};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    posts: Vec<Post>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError> {
        let mut inner = self.lock()?;

        if inner.users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_premium: false,
        };
        inner.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.users.get(&id).cloned())
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, StoreError> {
        let mut inner = self.lock()?;

        if inner.users.values().any(|u| u.email == email && u.id != id) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }

        match inner.users.get_mut(&id) {
            Some(user) => {
                user.email = email.to_string();
                user.hashed_password = hashed_password.to_string();
                user.updated_at = Utc::now();
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set_premium(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;

        match inner.users.get_mut(&id) {
            Some(user) => {
                user.is_premium = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all_users(&self) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.users.clear();
        // Mirror the database's cascading deletes.
        inner.posts.clear();
        inner.refresh_tokens.clear();

        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    async fn insert_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;

        let now = Utc::now();
        inner.refresh_tokens.insert(
            token.to_string(),
            RefreshTokenRecord {
                token: token.to_string(),
                created_at: now,
                updated_at: now,
                user_id,
                expires_at,
                revoked_at: None,
            },
        );

        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.refresh_tokens.get(token).cloned())
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;

        match inner.refresh_tokens.get_mut(token) {
            Some(record) => {
                let now = Utc::now();
                record.revoked_at = Some(now);
                record.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn create_post(&self, body: &str, user_id: Uuid) -> Result<Post, StoreError> {
        let mut inner = self.lock()?;

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        inner.posts.push(post.clone());

        Ok(post)
    }

    async fn list_posts(&self, author_id: Option<Uuid>) -> Result<Vec<Post>, StoreError> {
        let inner = self.lock()?;

        let mut posts: Vec<Post> = inner
            .posts
            .iter()
            .filter(|p| author_id.map_or(true, |author| p.user_id == author))
            .cloned()
            .collect();
        // Stable sort keeps insertion order for identical timestamps.
        posts.sort_by_key(|p| p.created_at);

        Ok(posts)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.posts.retain(|p| p.id != id);

        Ok(())
    }

    async fn delete_all_posts(&self) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.posts.clear();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn creates_and_finds_users_by_email() {
        let store = InMemoryStore::new();

        let created = store.create_user("a@b.com", "hash").await.unwrap();
        let found = store.find_user_by_email("a@b.com").await.unwrap().unwrap();

        assert_eq!(created.id, found.id);
        assert!(!found.is_premium);
        assert!(store.find_user_by_email("x@y.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn finds_users_by_id() {
        let store = InMemoryStore::new();
        let created = store.create_user("a@b.com", "hash").await.unwrap();

        let found = store.find_user_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.email, "a@b.com");

        assert!(store.find_user_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let store = InMemoryStore::new();
        store.create_user("a@b.com", "hash").await.unwrap();

        let result = store.create_user("a@b.com", "other").await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn updates_user_credentials() {
        let store = InMemoryStore::new();
        let user = store.create_user("a@b.com", "hash").await.unwrap();

        let updated = store
            .update_user(user.id, "new@b.com", "newhash")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.email, "new@b.com");
        assert_eq!(updated.hashed_password, "newhash");
        assert_eq!(updated.id, user.id);

        let missing = store
            .update_user(Uuid::new_v4(), "ghost@b.com", "hash")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn update_cannot_steal_anothers_email() {
        let store = InMemoryStore::new();
        store.create_user("first@b.com", "hash").await.unwrap();
        let second = store.create_user("second@b.com", "hash").await.unwrap();

        let result = store.update_user(second.id, "first@b.com", "hash").await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn set_premium_reports_missing_users() {
        let store = InMemoryStore::new();
        let user = store.create_user("a@b.com", "hash").await.unwrap();

        assert!(store.set_premium(user.id).await.unwrap());
        let found = store.find_user_by_email("a@b.com").await.unwrap().unwrap();
        assert!(found.is_premium);

        assert!(!store.set_premium(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn lists_posts_in_creation_order_with_author_filter() {
        let store = InMemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let first = store.create_post("first", alice).await.unwrap();
        let second = store.create_post("second", bob).await.unwrap();
        let third = store.create_post("third", alice).await.unwrap();

        let all = store.list_posts(None).await.unwrap();
        assert_eq!(
            all.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![first.id, second.id, third.id]
        );

        let alices = store.list_posts(Some(alice)).await.unwrap();
        assert_eq!(
            alices.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![first.id, third.id]
        );
    }

    #[tokio::test]
    async fn deletes_single_posts() {
        let store = InMemoryStore::new();
        let author = Uuid::new_v4();
        let post = store.create_post("going away", author).await.unwrap();

        store.delete_post(post.id).await.unwrap();

        assert!(store.find_post(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revoke_stamps_and_restamps_without_error() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();
        store
            .insert_refresh_token("tok", user_id, Utc::now() + Duration::days(60))
            .await
            .unwrap();

        assert!(store.revoke_refresh_token("tok").await.unwrap());
        let record = store.find_refresh_token("tok").await.unwrap().unwrap();
        assert!(record.is_revoked());

        // Second revoke is a re-stamp, not an error.
        assert!(store.revoke_refresh_token("tok").await.unwrap());
        assert!(!store.revoke_refresh_token("unknown").await.unwrap());
    }

    #[tokio::test]
    async fn deleting_users_cascades() {
        let store = InMemoryStore::new();
        let user = store.create_user("a@b.com", "hash").await.unwrap();
        store.create_post("hello", user.id).await.unwrap();
        store
            .insert_refresh_token("tok", user.id, Utc::now() + Duration::days(60))
            .await
            .unwrap();

        store.delete_all_users().await.unwrap();

        assert!(store.find_user_by_email("a@b.com").await.unwrap().is_none());
        assert!(store.list_posts(None).await.unwrap().is_empty());
        assert!(store.find_refresh_token("tok").await.unwrap().is_none());
    }
}
