//! State parameter handling for OAuth CSRF protection.
//!
//! The state is a random nonce placed in the authorization URL and in a
//! short-lived cookie; the callback must echo the same value back.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;

/// OAuth state parameter.
///
/// # Example
///
/// ```rust
/// use shopify_session_app::auth::oauth::StateParam;
///
/// let state = StateParam::new();
/// assert_eq!(state.as_ref().len(), 15);
/// assert!(state.as_ref().chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateParam(String);

// Verify StateParam is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StateParam>();
};

impl StateParam {
    /// The length of generated nonces.
    const NONCE_LENGTH: usize = 15;

    /// Creates a new state parameter from a cryptographically secure RNG.
    #[must_use]
    pub fn new() -> Self {
        let nonce = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::NONCE_LENGTH)
            .map(char::from)
            .collect();
        Self(nonce)
    }
}

impl Default for StateParam {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<str> for StateParam {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
