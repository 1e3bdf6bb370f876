//! Authentication for the install flow.
//!
//! # Overview
//!
//! - [`AuthScopes`]: A set of OAuth scopes with implied scope handling
//! - [`Session`]: The persisted install record for one shop
//! - [`AccessToken`]: A non-empty, log-safe access token
//! - [`oauth`]: Authorization URL generation, HMAC validation and code exchange
//! - [`callback`]: The OAuth callback sequence from signature check to redirect
//!
//! # Example
//!
//! ```rust
//! use shopify_session_app::{AccessToken, Session, ShopDomain};
//!
//! let session = Session::new(
//!     ShopDomain::new("my-store.myshopify.com").unwrap(),
//!     AccessToken::new("access-token").unwrap(),
//!     "read_products",
//! );
//!
//! // Offline sessions don't expire
//! assert!(!session.expired());
//! ```

pub mod callback;
pub mod oauth;
mod scopes;
pub mod session;

pub use scopes::AuthScopes;
pub use session::{AccessToken, AccessTokenResponse, Session};
