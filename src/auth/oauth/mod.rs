//! OAuth 2.0 authorization code grant for Shopify apps.
//!
//! The flow has two halves:
//!
//! 1. **Authorization Initiation** ([`begin_auth`]): generate an authorization
//!    URL and a state nonce, then redirect the merchant to Shopify.
//!
//! 2. **Callback** ([`CallbackQuery`], [`validate_hmac`], [`TokenExchanger`]):
//!    when Shopify redirects back, verify the signature and state, then
//!    exchange the authorization code for an access token. The full callback
//!    sequence, including persistence, lives in [`crate::auth::callback`].
//!
//! # Security
//!
//! - Callbacks are verified with HMAC-SHA256 over the sorted query parameters.
//! - The state parameter must match the value issued by [`begin_auth`].
//! - Signature comparison is constant-time.
//! - An old API secret can be configured so that callbacks signed before a
//!   secret rotation still validate.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_session_app::auth::oauth::{begin_auth, validate_hmac, CallbackQuery};
//!
//! let result = begin_auth(&config, &shop, "/auth/callback", false)?;
//! // Keep result.state, redirect to result.auth_url ...
//!
//! let query = CallbackQuery::from_pairs(raw_pairs);
//! if !validate_hmac(&query, &config) {
//!     return Err(OAuthError::InvalidHmac);
//! }
//! ```

mod begin_auth;
mod callback_query;
mod error;
pub mod hmac;
mod state;
mod token_exchange;

pub use begin_auth::{begin_auth, BeginAuthResult};
pub use callback_query::CallbackQuery;
pub use error::OAuthError;
pub use hmac::{compute_signature, constant_time_compare, validate_hmac};
pub use state::StateParam;
pub use token_exchange::{ShopifyTokenExchanger, TokenExchanger};
