//! The persisted install session.
//!
//! This module provides the [`Session`] type, the only record this service
//! persists, together with the [`AccessToken`] newtype and the raw
//! [`AccessTokenResponse`] returned by Shopify's token endpoint.

use crate::auth::oauth::OAuthError;
use crate::config::ShopDomain;
use chrono::{DateTime, Duration, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An opaque Shopify access token.
///
/// The token is guaranteed non-empty and its `Debug` output is masked so it
/// never reaches logs.
///
/// # Example
///
/// ```rust
/// use shopify_session_app::AccessToken;
///
/// let token = AccessToken::new("shpat_123").unwrap();
/// assert_eq!(token.as_ref(), "shpat_123");
/// assert_eq!(format!("{token:?}"), "AccessToken(*****)");
/// assert!(AccessToken::new("  ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::IncompleteSession`] if the token is blank.
    pub fn new(token: impl Into<String>) -> Result<Self, OAuthError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(OAuthError::IncompleteSession {
                field: "access_token",
            });
        }
        Ok(Self(token))
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(*****)")
    }
}

impl Serialize for AccessToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AccessToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// Raw body of `POST https://{shop}/admin/oauth/access_token`.
///
/// Every field is optional here; [`Session::from_token_response`] decides
/// whether the response is complete enough to become a session.
#[derive(Clone, Default, Deserialize)]
pub struct AccessTokenResponse {
    /// The access token, absent on malformed responses.
    pub access_token: Option<String>,
    /// Granted scopes as a comma-separated string.
    pub scope: Option<String>,
    /// Lifetime in seconds, present only for online tokens.
    pub expires_in: Option<i64>,
}

impl fmt::Debug for AccessTokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenResponse")
            .field("access_token", &self.access_token.as_ref().map(|_| "*****"))
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// An installed shop together with its access token.
///
/// At most one session exists per [`ShopDomain`]. Because both `shop` and
/// `access_token` are validated newtypes, a `Session` value always satisfies
/// the non-empty invariant; records that do not are never constructed.
///
/// # Thread Safety
///
/// `Session` is `Send + Sync`, making it safe to share across threads.
///
/// # Example
///
/// ```rust
/// use shopify_session_app::{AccessToken, Session, ShopDomain};
///
/// let session = Session::new(
///     ShopDomain::new("test-store.myshopify.com").unwrap(),
///     AccessToken::new("tok_123").unwrap(),
///     "read_products",
/// );
///
/// assert!(session.installed);
/// assert!(session.is_active());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// The shop this session is for; the primary key.
    pub shop: ShopDomain,

    /// The access token for Admin API calls.
    pub access_token: AccessToken,

    /// The granted OAuth scopes, as reported by Shopify.
    pub scope: String,

    /// Whether this is an online (user-specific, expiring) token.
    pub is_online: bool,

    /// When the token expires; `None` for offline tokens.
    pub expires: Option<DateTime<Utc>>,

    /// Set once the install callback completed.
    pub installed: bool,

    /// When this record was first written.
    pub created_at: DateTime<Utc>,

    /// When this record was last written.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Creates an installed offline session stamped with the current time.
    #[must_use]
    pub fn new(shop: ShopDomain, access_token: AccessToken, scope: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            shop,
            access_token,
            scope: scope.into(),
            is_online: false,
            expires: None,
            installed: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builds a session from a token endpoint response.
    ///
    /// Responses carrying `expires_in` are online tokens and get an
    /// expiry relative to now.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::IncompleteSession`] if the response has no
    /// usable access token or an `expires_in` that cannot be represented.
    pub fn from_token_response(
        shop: ShopDomain,
        response: AccessTokenResponse,
    ) -> Result<Self, OAuthError> {
        let access_token = AccessToken::new(response.access_token.unwrap_or_default())?;
        let mut session = Self::new(shop, access_token, response.scope.unwrap_or_default());

        if let Some(seconds) = response.expires_in {
            let expires = Duration::try_seconds(seconds)
                .and_then(|lifetime| session.created_at.checked_add_signed(lifetime))
                .ok_or(OAuthError::IncompleteSession {
                    field: "expires_in",
                })?;
            session.is_online = true;
            session.expires = Some(expires);
        }

        Ok(session)
    }

    /// Returns `true` if this session has expired.
    ///
    /// Sessions without an expiration time never expire.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires.is_some_and(|expires| Utc::now() > expires)
    }

    /// Returns `true` if this session can be used for API calls.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.installed && !self.expired()
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};
