//! Query parameters of the OAuth callback.

use std::collections::BTreeMap;

/// The query string Shopify sends to `/auth/callback`.
///
/// The `hmac` parameter is split off from the rest; the remaining parameters
/// are kept sorted by key because the signature is computed over them in
/// that order. A legacy `signature` parameter is excluded from signing as
/// well, matching Shopify's rules.
///
/// # Example
///
/// ```rust
/// use shopify_session_app::auth::oauth::CallbackQuery;
///
/// let query = CallbackQuery::from_pairs([
///     ("shop", "test-store.myshopify.com"),
///     ("code", "abc"),
///     ("hmac", "deadbeef"),
///     ("timestamp", "1700000000"),
/// ]);
///
/// assert_eq!(query.hmac(), Some("deadbeef"));
/// assert_eq!(
///     query.to_signable_string(),
///     "code=abc&shop=test-store.myshopify.com&timestamp=1700000000"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackQuery {
    hmac: Option<String>,
    params: BTreeMap<String, String>,
}

impl CallbackQuery {
    /// Builds a callback query from decoded key/value pairs.
    ///
    /// When a key repeats, the last value wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            match key.as_str() {
                "hmac" => query.hmac = Some(value),
                "signature" => {}
                _ => {
                    query.params.insert(key, value);
                }
            }
        }
        query
    }

    /// Returns the received `hmac` parameter, if any.
    #[must_use]
    pub fn hmac(&self) -> Option<&str> {
        self.hmac.as_deref()
    }

    /// Replaces the `hmac` parameter.
    pub fn set_hmac(&mut self, hmac: impl Into<String>) {
        self.hmac = Some(hmac.into());
    }

    /// Returns a signed parameter by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns the `shop` parameter.
    #[must_use]
    pub fn shop(&self) -> Option<&str> {
        self.get("shop")
    }

    /// Returns the authorization `code` parameter.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.get("code")
    }

    /// Returns the `state` parameter.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    /// Returns the embedded-admin `host` parameter.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.get("host")
    }

    /// Builds the message the callback HMAC is computed over.
    ///
    /// Parameters are joined as `key=value` pairs with `&` in key order.
    /// `%` and `&` are escaped in keys and values, and `=` additionally in
    /// keys, so that no parameter can masquerade as another.
    #[must_use]
    pub fn to_signable_string(&self) -> String {
        self.params
            .iter()
            .map(|(key, value)| format!("{}={}", escape_key(key), escape_value(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn escape_value(raw: &str) -> String {
    raw.replace('%', "%25").replace('&', "%26")
}

fn escape_key(raw: &str) -> String {
    escape_value(raw).replace('=', "%3D")
}
