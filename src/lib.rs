//! # Shopify session app
//!
//! The install half of a Shopify app: OAuth authorization, the signed
//! callback, durable per-shop sessions and a server-rendered product page
//! that uses the stored token.
//!
//! ## Overview
//!
//! - Type-safe configuration via [`AppConfig`] and [`AppConfigBuilder`]
//! - Validated newtypes for API credentials and domain values
//! - OAuth authorization and callback verification via [`auth::oauth`]
//! - The ordered callback sequence via [`auth::callback`]
//! - Session persistence behind the [`storage::SessionStore`] trait
//! - Admin API catalog access via [`catalog::CatalogClient`]
//! - The axum router via [`web::router`]
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_session_app::{AppConfig, ApiKey, ApiSecretKey, ApiVersion, HostUrl};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .host(HostUrl::new("https://your-app.example.com").unwrap())
//!     .scopes("read_products".parse().unwrap())
//!     .api_version(ApiVersion::latest())
//!     .database_url("memory")
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Serving
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopify_session_app::storage::MemorySessionStore;
//! use shopify_session_app::web::{router, AppState};
//!
//! let state = AppState {
//!     config: Arc::new(config.clone()),
//!     store: Arc::new(MemorySessionStore::new()),
//!     exchanger: Arc::new(ShopifyTokenExchanger::new(&config)),
//!     catalog: Arc::new(CatalogClient::new(config.api_version().clone())),
//!     cookie_key: Key::generate(),
//! };
//! axum::serve(listener, router(state)).await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration and collaborators are passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Thread-safe**: All shared types are `Send + Sync`
//! - **One writer**: Only the OAuth callback writes sessions

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod storage;
pub mod web;

// Re-export public types at crate root for convenience
pub use auth::{AccessToken, AuthScopes, Session};
pub use config::{
    ApiKey, ApiSecretKey, ApiVersion, AppConfig, AppConfigBuilder, HostUrl, ShopDomain,
};
pub use error::ConfigError;

// Re-export OAuth types for convenience
pub use auth::oauth::{begin_auth, BeginAuthResult, OAuthError, StateParam};
