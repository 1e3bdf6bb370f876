//! HMAC validation for Shopify OAuth callbacks.
//!
//! Shopify signs every callback with HMAC-SHA256 over the sorted query
//! parameters, keyed with the app's API secret. This module recomputes that
//! signature and compares it in constant time.
//!
//! # Example
//!
//! ```rust
//! use shopify_session_app::auth::oauth::hmac::compute_signature;
//!
//! let message = "code=abc123&shop=example.myshopify.com&timestamp=1700000000";
//! let signature = compute_signature(message, "my-api-secret");
//! assert_eq!(signature.len(), 64);
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::oauth::CallbackQuery;
use crate::config::AppConfig;

type HmacSha256 = Hmac<Sha256>;

/// Computes a lowercase hex HMAC-SHA256 signature of `message`.
///
/// # Example
///
/// ```rust
/// use shopify_session_app::auth::oauth::hmac::compute_signature;
///
/// assert_eq!(
///     compute_signature("message", "key"),
///     "6e9ef29b75fffc5b7abae527d58fdadb2fe42e7219011976917343065f58ed4a"
/// );
/// ```
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature(message: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Performs constant-time comparison of two strings.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Validates the HMAC signature of an OAuth callback.
///
/// The primary API secret is tried first, then the old secret if one is
/// configured for rotation. A callback without an `hmac` parameter is
/// never valid.
#[must_use]
pub fn validate_hmac(query: &CallbackQuery, config: &AppConfig) -> bool {
    let Some(received) = query.hmac() else {
        return false;
    };
    let signable = query.to_signable_string();

    let signed_with =
        |secret: &str| constant_time_compare(&compute_signature(&signable, secret), received);

    signed_with(config.api_secret_key().as_ref())
        || config
            .old_api_secret_key()
            .is_some_and(|old| signed_with(old.as_ref()))
}

mod hex {
    use std::fmt::Write;

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        let bytes = bytes.as_ref();
        bytes
            .iter()
            .fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
                let _ = write!(out, "{byte:02x}");
                out
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey};

    fn config_with(secret: &str, old: Option<&str>) -> AppConfig {
        let mut builder = AppConfig::builder()
            .api_key(ApiKey::new("test-key").unwrap())
            .api_secret_key(ApiSecretKey::new(secret).unwrap())
            .database_url("memory");
        if let Some(old) = old {
            builder = builder.old_api_secret_key(ApiSecretKey::new(old).unwrap());
        }
        builder.build().unwrap()
    }

    fn signed_query(secret: &str) -> CallbackQuery {
        let mut query = CallbackQuery::from_pairs([
            ("code", "auth-code"),
            ("shop", "test-store.myshopify.com"),
            ("state", "state-value"),
            ("timestamp", "1700000000"),
        ]);
        let signature = compute_signature(&query.to_signable_string(), secret);
        query.set_hmac(signature);
        query
    }

    #[test]
    fn test_compute_signature_matches_known_value() {
        let sig = compute_signature("message", "key");
        assert_eq!(
            sig,
            "6e9ef29b75fffc5b7abae527d58fdadb2fe42e7219011976917343065f58ed4a"
        );
    }

    #[test]
    fn test_compute_signature_is_lowercase_hex() {
        let sig = compute_signature("", "secret");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("short", "longer string"));
    }

    #[test]
    fn test_validate_hmac_succeeds_with_correct_hmac() {
        let config = config_with("test-secret", None);
        assert!(validate_hmac(&signed_query("test-secret"), &config));
    }

    #[test]
    fn test_validate_hmac_fails_on_tampered_parameter() {
        let config = config_with("test-secret", None);
        let signed = signed_query("test-secret");

        let mut pairs: Vec<(String, String)> = vec![
            ("code".into(), "auth-code".into()),
            ("shop".into(), "attacker.myshopify.com".into()),
            ("state".into(), "state-value".into()),
            ("timestamp".into(), "1700000000".into()),
        ];
        pairs.push(("hmac".into(), signed.hmac().unwrap().to_string()));
        let tampered = CallbackQuery::from_pairs(pairs);

        assert!(!validate_hmac(&tampered, &config));
    }

    #[test]
    fn test_validate_hmac_fails_without_hmac() {
        let config = config_with("test-secret", None);
        let query = CallbackQuery::from_pairs([("shop", "test-store.myshopify.com")]);
        assert!(!validate_hmac(&query, &config));
    }

    #[test]
    fn test_validate_hmac_falls_back_to_old_secret() {
        let config = config_with("new-secret", Some("old-secret"));
        assert!(validate_hmac(&signed_query("old-secret"), &config));
        assert!(validate_hmac(&signed_query("new-secret"), &config));
        assert!(!validate_hmac(&signed_query("other-secret"), &config));
    }

    #[test]
    fn test_hex_encoding() {
        assert_eq!(hex::encode([0x00, 0xff, 0xab, 0xcd]), "00ffabcd");
        assert_eq!(hex::encode([]), "");
    }
}
