//! Cookies set by the install flow.
//!
//! Both cookies live in the private (encrypted) jar, so their values are
//! neither readable nor forgeable by the client.

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::auth::oauth::StateParam;
use crate::auth::Session;

/// Name of the OAuth state nonce cookie.
pub const STATE_COOKIE_NAME: &str = "shopify_app_state";

/// Name of the session hint cookie.
pub const SESSION_COOKIE_NAME: &str = "shopify-app";

/// Path the state cookie is scoped to.
const STATE_COOKIE_PATH: &str = "/auth";

/// Session hint carried in the `shopify-app` cookie.
///
/// Only a hint: the store stays the source of truth, and the hint's shop is
/// re-validated before use.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHint {
    pub shop: String,
    pub access_token: String,
    pub installed: bool,
}

/// Cookie holding the state nonce between `/auth` and `/auth/callback`.
pub(super) fn state_cookie(state: &StateParam, secure: bool) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE_NAME, state.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path(STATE_COOKIE_PATH)
        .max_age(Duration::minutes(10))
        .build()
}

/// Removal cookie for the state nonce.
pub(super) fn clear_state_cookie() -> Cookie<'static> {
    Cookie::build((STATE_COOKIE_NAME, ""))
        .path(STATE_COOKIE_PATH)
        .max_age(Duration::ZERO)
        .build()
}

/// Get the state nonce from cookies.
pub(super) fn get_state(jar: &PrivateCookieJar) -> Option<String> {
    jar.get(STATE_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Session hint cookie for a freshly persisted session.
pub(super) fn session_cookie(session: &Session, secure: bool) -> Cookie<'static> {
    let hint = SessionHint {
        shop: session.shop.to_string(),
        access_token: session.access_token.as_ref().to_string(),
        installed: session.installed,
    };
    // Serializing three plain fields cannot fail
    let value = serde_json::to_string(&hint).unwrap_or_default();

    Cookie::build((SESSION_COOKIE_NAME, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::None)
        .path("/")
        .build()
}

/// Get the session hint from cookies, ignoring malformed values.
pub(super) fn get_session_hint(jar: &PrivateCookieJar) -> Option<SessionHint> {
    let cookie = jar.get(SESSION_COOKIE_NAME)?;
    serde_json::from_str(cookie.value())
        .map_err(|e| tracing::debug!(error = %e, "Ignoring malformed session cookie"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessToken;
    use crate::config::ShopDomain;

    #[test]
    fn test_state_cookie_attributes() {
        let state = StateParam::new();
        let cookie = state_cookie(&state, true);

        assert_eq!(cookie.name(), "shopify_app_state");
        assert_eq!(cookie.value(), state.as_ref());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/auth"));
        assert_eq!(cookie.max_age(), Some(Duration::minutes(10)));
    }

    #[test]
    fn test_session_cookie_carries_hint_json() {
        let session = Session::new(
            ShopDomain::new("test-store.myshopify.com").unwrap(),
            AccessToken::new("tok_123").unwrap(),
            "read_products",
        );
        let cookie = session_cookie(&session, false);

        assert_eq!(cookie.name(), "shopify-app");
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.path(), Some("/"));

        let hint: serde_json::Value = serde_json::from_str(cookie.value()).unwrap();
        assert_eq!(hint["shop"], "test-store.myshopify.com");
        assert_eq!(hint["accessToken"], "tok_123");
        assert_eq!(hint["installed"], true);
    }

    #[test]
    fn test_clear_state_cookie_expires_immediately() {
        let cookie = clear_state_cookie();
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.path(), Some("/auth"));
    }
}
