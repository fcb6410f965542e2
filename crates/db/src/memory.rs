//! In-process [`UserStore`] backed by a `BTreeMap` behind a `tokio` lock.
//!
//! Uniqueness is checked and the row inserted under one write guard, so it
//! gives the same single-winner guarantee as the database constraints.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use userauth_core::types::DbId;

use crate::error::StoreError;
use crate::models::user::{NewUser, User};
use crate::store::UserStore;

#[derive(Debug, Default)]
struct Inner {
    next_id: DbId,
    users: BTreeMap<DbId, User>,
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email_or_username(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        let by_email = inner.users.values().find(|u| u.email == identifier);
        let found = by_email.or_else(|| inner.users.values().find(|u| u.username == identifier));
        Ok(found.cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn insert(&self, input: &NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == input.username) {
            return Err(StoreError::DuplicateUsername);
        }
        if inner.users.values().any(|u| u.email == input.email) {
            return Err(StoreError::DuplicateEmail);
        }

        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            username: input.username.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role,
            created_ts: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_password(&self, id: DbId, password_hash: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.users.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use userauth_core::roles::Role;

    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Basic,
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryUserStore::new();
        let a = store.insert(&new_user("a", "a@x.io")).await.unwrap();
        let b = store.insert(&new_user("b", "b@x.io")).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn duplicate_email_and_username_are_rejected() {
        let store = MemoryUserStore::new();
        store.insert(&new_user("a", "a@x.io")).await.unwrap();

        assert_matches!(
            store.insert(&new_user("other", "a@x.io")).await,
            Err(StoreError::DuplicateEmail)
        );
        assert_matches!(
            store.insert(&new_user("a", "other@x.io")).await,
            Err(StoreError::DuplicateUsername)
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_duplicate_inserts_have_one_winner() {
        let store = Arc::new(MemoryUserStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.insert(&new_user("same", "same@x.io")).await })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn email_match_wins_over_username_match() {
        let store = MemoryUserStore::new();
        let by_username = store.insert(&new_user("bob@x.io", "first@x.io")).await.unwrap();
        let by_email = store.insert(&new_user("second", "bob@x.io")).await.unwrap();

        let found = store.find_by_email_or_username("bob@x.io").await.unwrap().unwrap();
        assert_eq!(found.id, by_email.id);
        assert_ne!(found.id, by_username.id);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let store = MemoryUserStore::new();
        let user = store.insert(&new_user("a", "a@x.io")).await.unwrap();

        assert!(store.update_password(user.id, "new").await.unwrap());
        assert_eq!(store.find_by_id(user.id).await.unwrap().unwrap().password_hash, "new");
        assert!(!store.update_password(999, "new").await.unwrap());

        assert!(store.delete(user.id).await.unwrap());
        assert!(!store.delete(user.id).await.unwrap());
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
    }
}
