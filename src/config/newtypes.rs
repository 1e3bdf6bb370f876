//! Validated newtype wrappers for configuration and request values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated Shopify API key.
///
/// # Example
///
/// ```rust
/// use shopify_session_app::ApiKey;
///
/// let key = ApiKey::new("my-api-key").unwrap();
/// assert_eq!(key.as_ref(), "my-api-key");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated Shopify API secret key.
///
/// The secret signs OAuth callbacks, so the `Debug` implementation masks it
/// as `ApiSecretKey(*****)`.
///
/// # Example
///
/// ```rust
/// use shopify_session_app::ApiSecretKey;
///
/// let secret = ApiSecretKey::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "ApiSecretKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSecretKey(String);

impl ApiSecretKey {
    /// Creates a new validated API secret key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiSecretKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiSecretKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiSecretKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecretKey(*****)")
    }
}

/// A validated Shopify shop domain in `<store-name>.myshopify.com` form.
///
/// Shop domains arrive as untrusted query parameters on every hop of the
/// install flow, so only the full `.myshopify.com` form is accepted. Bare
/// store names and foreign domains are rejected rather than normalized, which
/// keeps the authorization redirect pinned to Shopify hosts.
///
/// # Example
///
/// ```rust
/// use shopify_session_app::ShopDomain;
///
/// let domain = ShopDomain::new("My-Store.myshopify.com").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
///
/// assert!(ShopDomain::new("my-store").is_err());
/// assert!(ShopDomain::new("evil.com/.myshopify.com").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShopDomain {
    full_domain: String,
}

impl ShopDomain {
    const SUFFIX: &'static str = ".myshopify.com";

    /// Creates a new validated shop domain.
    ///
    /// Surrounding whitespace is trimmed and the domain is lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] if the domain does not end
    /// in `.myshopify.com` or the store name contains anything other than
    /// lowercase letters, digits and inner hyphens.
    pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = domain.into().trim().to_lowercase();

        let Some(shop_name) = domain.strip_suffix(Self::SUFFIX) else {
            return Err(ConfigError::InvalidShopDomain { domain });
        };

        if !Self::is_valid_shop_name(shop_name) {
            return Err(ConfigError::InvalidShopDomain { domain });
        }

        Ok(Self {
            full_domain: domain,
        })
    }

    /// Validates an optional `shop` query parameter.
    ///
    /// Missing, blank and invalid values all yield `None`.
    #[must_use]
    pub fn parse_query(raw: Option<&str>) -> Option<Self> {
        raw.filter(|value| !value.trim().is_empty())
            .and_then(|value| Self::new(value).ok())
    }

    fn is_valid_shop_name(name: &str) -> bool {
        if name.is_empty() {
            return false;
        }

        // Cannot start or end with a hyphen
        if name.starts_with('-') || name.ends_with('-') {
            return false;
        }

        name.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.full_domain
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_domain)
    }
}

impl Serialize for ShopDomain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.full_domain)
    }
}

impl<'de> Deserialize<'de> for ShopDomain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated public URL of this application.
///
/// Used to build the OAuth `redirect_uri`. Any trailing slash is dropped so
/// that joining with a path such as `/auth/callback` never doubles it.
///
/// # Example
///
/// ```rust
/// use shopify_session_app::HostUrl;
///
/// let url = HostUrl::new("https://myapp.example.com/").unwrap();
/// assert_eq!(url.as_ref(), "https://myapp.example.com");
///
/// assert!(HostUrl::new("myapp.example.com").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostUrl {
    url: String,
}

impl HostUrl {
    /// Creates a new validated host URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHostUrl`] unless the URL has an
    /// alphabetic scheme followed by `://` and a non-empty host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into().trim().trim_end_matches('/').to_string();

        let valid = url.split_once("://").is_some_and(|(scheme, rest)| {
            // Host ends at port, path, query, or end of string
            let host = rest.split([':', '/', '?', '#']).next().unwrap_or_default();
            !scheme.is_empty()
                && scheme.chars().all(|c| c.is_ascii_alphabetic())
                && !host.is_empty()
        });

        if valid {
            Ok(Self { url })
        } else {
            Err(ConfigError::InvalidHostUrl { url })
        }
    }
}

impl AsRef<str> for HostUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_rejects_empty_string() {
        let result = ApiKey::new("");
        assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
    }

    #[test]
    fn test_api_secret_key_masks_value_in_debug() {
        let secret = ApiSecretKey::new("super-secret-key").unwrap();
        let debug_output = format!("{:?}", secret);
        assert_eq!(debug_output, "ApiSecretKey(*****)");
        assert!(!debug_output.contains("super-secret-key"));
    }

    #[test]
    fn test_shop_domain_accepts_full_format() {
        let domain = ShopDomain::new("test-store.myshopify.com").unwrap();
        assert_eq!(domain.as_ref(), "test-store.myshopify.com");
    }

    #[test]
    fn test_shop_domain_normalizes_case_and_whitespace() {
        let domain = ShopDomain::new("  Test-Store.MyShopify.com ").unwrap();
        assert_eq!(domain.as_ref(), "test-store.myshopify.com");
    }

    #[test]
    fn test_shop_domain_rejects_invalid_domains() {
        assert!(ShopDomain::new("").is_err());
        assert!(ShopDomain::new(".myshopify.com").is_err());

        // Bare store names are not accepted from untrusted input
        assert!(ShopDomain::new("my-store").is_err());

        // Invalid characters
        assert!(ShopDomain::new("my store.myshopify.com").is_err());
        assert!(ShopDomain::new("my_store.myshopify.com").is_err());
        assert!(ShopDomain::new("evil.com/x.myshopify.com").is_err());
        assert!(ShopDomain::new("sub.my-store.myshopify.com").is_err());

        // Starting/ending with hyphen
        assert!(ShopDomain::new("-my-store.myshopify.com").is_err());
        assert!(ShopDomain::new("my-store-.myshopify.com").is_err());

        // Wrong domain suffix
        assert!(ShopDomain::new("my-store.otherdomain.com").is_err());
        assert!(ShopDomain::new("my-store.myshopify.com.evil.com").is_err());
    }

    #[test]
    fn test_host_url_validates_format() {
        let url = HostUrl::new("https://myapp.example.com").unwrap();
        assert_eq!(url.as_ref(), "https://myapp.example.com");

        let url = HostUrl::new("http://localhost:3000").unwrap();
        assert_eq!(url.as_ref(), "http://localhost:3000");

        assert!(HostUrl::new("https://:3000").is_err());
        assert!(HostUrl::new("ht tp://myapp.example.com").is_err());
    }

    #[test]
    fn test_host_url_strips_trailing_slash() {
        let url = HostUrl::new("https://myapp.example.com/").unwrap();
        assert_eq!(url.as_ref(), "https://myapp.example.com");
    }

    #[test]
    fn test_host_url_rejects_invalid() {
        assert!(HostUrl::new("myapp.example.com").is_err());
        assert!(HostUrl::new("https://").is_err());
        assert!(HostUrl::new("://example.com").is_err());
    }

    #[test]
    fn test_shop_domain_serde_uses_plain_string() {
        let domain = ShopDomain::new("my-store.myshopify.com").unwrap();
        let json = serde_json::to_string(&domain).unwrap();
        assert_eq!(json, r#""my-store.myshopify.com""#);

        let restored: ShopDomain = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, domain);

        let invalid: Result<ShopDomain, _> = serde_json::from_str(r#""evil.com""#);
        assert!(invalid.is_err());
    }

    #[test]
    fn test_shop_domain_parse_query() {
        assert_eq!(
            ShopDomain::parse_query(Some("test-store.myshopify.com")),
            Some(ShopDomain::new("test-store.myshopify.com").unwrap())
        );
        assert_eq!(ShopDomain::parse_query(None), None);
        assert_eq!(ShopDomain::parse_query(Some("   ")), None);
        assert_eq!(ShopDomain::parse_query(Some("evil.com")), None);
    }
}
