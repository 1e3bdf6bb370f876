use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{SessionStore, StorageError};
use crate::auth::{AccessToken, Session};
use crate::config::ShopDomain;

/// Column list for sessions queries.
const COLUMNS: &str =
    "shop, access_token, scope, is_online, expires, installed, created_at, updated_at";

/// Upper bound on pooled connections.
const MAX_CONNECTIONS: u32 = 10;

/// A [`SessionStore`] backed by the Postgres `sessions` table.
///
/// Connections come from a shared pool; each statement checks one out and
/// returns it when done, on success and failure alike.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Opens a connection pool for `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the database cannot be reached.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Applies the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Migration`] if a migration fails to apply.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn upsert_session(&self, session: &Session) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO sessions
                (shop, access_token, scope, is_online, expires, installed, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (shop) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                scope = EXCLUDED.scope,
                is_online = EXCLUDED.is_online,
                expires = EXCLUDED.expires,
                installed = EXCLUDED.installed,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at",
        )
        .bind(session.shop.as_ref())
        .bind(session.access_token.as_ref())
        .bind(&session.scope)
        .bind(session.is_online)
        .bind(session.expires)
        .bind(session.installed)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session_by_shop(
        &self,
        shop: &ShopDomain,
    ) -> Result<Option<Session>, StorageError> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE shop = $1");
        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(shop.as_ref())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.and_then(|row| match Session::try_from(row) {
            Ok(session) => Some(session),
            Err(reason) => {
                tracing::warn!(shop = %shop, %reason, "Ignoring invalid session record");
                None
            }
        }))
    }
}

/// A raw `sessions` row before validation.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    shop: String,
    access_token: String,
    scope: String,
    is_online: bool,
    expires: Option<DateTime<Utc>>,
    installed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = String;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let shop = ShopDomain::new(row.shop).map_err(|e| e.to_string())?;
        let access_token = AccessToken::new(row.access_token).map_err(|e| e.to_string())?;

        Ok(Self {
            shop,
            access_token,
            scope: row.scope,
            is_online: row.is_online,
            expires: row.expires,
            installed: row.installed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
