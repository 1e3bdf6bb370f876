use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SessionStore, StorageError};
use crate::auth::Session;
use crate::config::ShopDomain;

/// An in-process [`SessionStore`].
///
/// Selected with `DATABASE_URL=memory`; sessions are lost on restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<ShopDomain, Session>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` if no session is stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn upsert_session(&self, session: &Session) -> Result<(), StorageError> {
        self.sessions
            .write()
            .await
            .insert(session.shop.clone(), session.clone());
        Ok(())
    }

    async fn find_session_by_shop(
        &self,
        shop: &ShopDomain,
    ) -> Result<Option<Session>, StorageError> {
        Ok(self.sessions.read().await.get(shop).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessToken;
    use chrono::{Duration, Utc};

    fn session(shop: &str, token: &str) -> Session {
        Session::new(
            ShopDomain::new(shop).unwrap(),
            AccessToken::new(token).unwrap(),
            "read_products",
        )
    }

    #[tokio::test]
    async fn test_find_returns_none_for_unknown_shop() {
        let store = MemorySessionStore::new();
        let shop = ShopDomain::new("unknown.myshopify.com").unwrap();
        assert!(store.find_session_by_shop(&shop).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_upsert_then_find_round_trips() {
        let store = MemorySessionStore::new();
        let stored = session("test-store.myshopify.com", "tok_1");

        store.upsert_session(&stored).await.unwrap();

        let found = store
            .find_session_by_shop(&stored.shop)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, stored);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_session() {
        let store = MemorySessionStore::new();
        let mut first = session("test-store.myshopify.com", "tok_1");
        first.created_at = Utc::now() - Duration::days(30);
        first.updated_at = first.created_at;
        let second = session("test-store.myshopify.com", "tok_2");

        store.upsert_session(&first).await.unwrap();
        store.upsert_session(&second).await.unwrap();

        assert_eq!(store.len().await, 1);
        let found = store
            .find_session_by_shop(&first.shop)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, second);
    }

    #[tokio::test]
    async fn test_shops_are_independent() {
        let store = MemorySessionStore::new();
        store
            .upsert_session(&session("one.myshopify.com", "tok_1"))
            .await
            .unwrap();
        store
            .upsert_session(&session("two.myshopify.com", "tok_2"))
            .await
            .unwrap();

        assert_eq!(store.len().await, 2);
    }
}
