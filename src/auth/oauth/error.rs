//! OAuth-specific error types.
//!
//! # Error Types
//!
//! - [`OAuthError::InvalidHmac`]: HMAC signature validation failed
//! - [`OAuthError::StateMismatch`]: OAuth state parameter doesn't match the cookie
//! - [`OAuthError::TokenExchangeFailed`]: Token exchange request failed
//! - [`OAuthError::InvalidCallback`]: Callback parameters are malformed
//! - [`OAuthError::IncompleteSession`]: Token response lacks a required field
//! - [`OAuthError::MissingHostConfig`]: Host URL not configured for redirect URI
//!
//! # Example
//!
//! ```rust
//! use shopify_session_app::auth::oauth::OAuthError;
//!
//! let error = OAuthError::InvalidHmac;
//! assert_eq!(error.to_string(), "HMAC signature validation failed");
//! ```

use thiserror::Error;

/// Errors that can occur during the OAuth authorization code flow.
///
/// `OAuthError` is `Send + Sync`, making it safe to use across async boundaries.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// HMAC signature validation failed.
    ///
    /// The callback's `hmac` parameter does not match the signature computed
    /// with the API secret key (or the old key during rotation). The request
    /// is forged, tampered with, or the secret is misconfigured.
    #[error("HMAC signature validation failed")]
    InvalidHmac,

    /// OAuth state parameter mismatch.
    ///
    /// The `state` in the callback does not match the nonce stored in the
    /// state cookie when the install began. Neither value is carried, so the
    /// nonce never reaches logs or response bodies.
    #[error("State parameter mismatch")]
    StateMismatch,

    /// Token exchange request failed.
    ///
    /// Status `0` means the request never produced an HTTP response.
    #[error("Token exchange failed with status {status}: {message}")]
    TokenExchangeFailed {
        /// The HTTP status code returned.
        status: u16,
        /// The error message from the response.
        message: String,
    },

    /// Callback parameters are invalid or malformed.
    #[error("Invalid callback: {reason}")]
    InvalidCallback {
        /// Description of what's invalid about the callback.
        reason: String,
    },

    /// The token response is missing a field a session cannot do without.
    #[error("Session missing required field '{field}'")]
    IncompleteSession {
        /// The missing field.
        field: &'static str,
    },

    /// Host URL is not configured in `AppConfig`.
    ///
    /// `begin_auth()` needs it to construct the redirect URI.
    #[error("Host URL must be configured for OAuth")]
    MissingHostConfig,
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_hmac_formats_correctly() {
        let error = OAuthError::InvalidHmac;
        assert_eq!(error.to_string(), "HMAC signature validation failed");
    }

    #[test]
    fn test_state_mismatch_formats_correctly() {
        assert_eq!(
            OAuthError::StateMismatch.to_string(),
            "State parameter mismatch"
        );
    }

    #[test]
    fn test_token_exchange_failed_includes_status_and_message() {
        let error = OAuthError::TokenExchangeFailed {
            status: 401,
            message: "Invalid client credentials".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("Invalid client credentials"));
    }

    #[test]
    fn test_incomplete_session_names_field() {
        let error = OAuthError::IncompleteSession {
            field: "access_token",
        };
        assert!(error.to_string().contains("access_token"));
    }

    #[test]
    fn test_missing_host_config_message() {
        let error = OAuthError::MissingHostConfig;
        assert!(error.to_string().contains("Host URL"));
    }
}
