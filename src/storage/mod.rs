//! Session persistence.
//!
//! The [`SessionStore`] trait is the only way the rest of the crate touches
//! persisted sessions. Two implementations ship:
//!
//! - [`PgSessionStore`]: Postgres via a pooled `sqlx` connection
//! - [`MemorySessionStore`]: an in-process map for tests and local runs
//!
//! Stores hold at most one session per shop. Writing a session for a shop
//! that already has one replaces it wholesale.

mod memory;
mod postgres;

pub use memory::MemorySessionStore;
pub use postgres::PgSessionStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::Session;
use crate::config::ShopDomain;

/// Errors raised by a session store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database rejected or failed to run a statement.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying the embedded migrations failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Any other backend failure.
    #[error("Storage backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

// Verify StorageError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StorageError>();
};

/// Persistent storage for install sessions, keyed by shop.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Inserts `session`, or replaces the stored session for the same shop.
    ///
    /// The write is atomic per shop; concurrent writers resolve to last
    /// write wins.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend is unreachable or rejects
    /// the write.
    async fn upsert_session(&self, session: &Session) -> Result<(), StorageError>;

    /// Returns the stored session for `shop`, if any.
    ///
    /// Records that no longer form a valid [`Session`] are reported as
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend is unreachable.
    async fn find_session_by_shop(
        &self,
        shop: &ShopDomain,
    ) -> Result<Option<Session>, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_message() {
        let error = StorageError::Backend {
            message: "connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Storage backend error: connection refused"
        );
    }

    #[test]
    fn test_database_error_converts_from_sqlx() {
        let error: StorageError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(error, StorageError::Database(_)));
        assert!(error.to_string().starts_with("Database error:"));
    }
}
