//! Application configuration.
//!
//! This module provides the configuration types used to run the install
//! flow and the session store.
//!
//! # Overview
//!
//! - [`AppConfig`]: The main configuration struct holding all settings
//! - [`AppConfigBuilder`]: A builder for constructing [`AppConfig`] instances
//! - [`ApiKey`]: A validated API key newtype
//! - [`ApiSecretKey`]: A validated API secret key newtype with masked debug output
//! - [`ShopDomain`]: A validated `*.myshopify.com` shop domain
//! - [`HostUrl`]: A validated application host URL
//! - [`ApiVersion`]: The Shopify Admin API version for catalog requests
//!
//! # Example
//!
//! ```rust
//! use shopify_session_app::{AppConfig, ApiKey, ApiSecretKey, HostUrl};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .host(HostUrl::new("https://myapp.example.com").unwrap())
//!     .scopes("read_products".parse().unwrap())
//!     .database_url("memory")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.port(), 3000);
//! ```

mod newtypes;
mod version;

pub use newtypes::{ApiKey, ApiSecretKey, HostUrl, ShopDomain};
pub use version::ApiVersion;

use std::fmt;

use crate::auth::AuthScopes;
use crate::error::ConfigError;

/// Minimum length of `COOKIE_SECRET`, required by the cookie encryption key.
pub const MIN_COOKIE_SECRET_LEN: usize = 64;

/// Configuration for the install flow, session store and HTTP server.
///
/// `AppConfig` is `Clone`, `Send`, and `Sync`; handlers share it behind an `Arc`.
///
/// # Key Rotation
///
/// The `old_api_secret_key` field supports seamless key rotation. When
/// validating OAuth HMAC signatures the primary key is tried first, then the
/// old key if configured, so in-flight installs complete during a rotation.
#[derive(Clone)]
pub struct AppConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: AuthScopes,
    host: Option<HostUrl>,
    api_version: ApiVersion,
    database_url: String,
    bind_host: String,
    port: u16,
    production: bool,
    session_cookie: bool,
    cookie_secret: Option<Vec<u8>>,
}

impl AppConfig {
    /// Creates a new builder for constructing an `AppConfig`.
    #[must_use]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::new()
    }

    /// Loads configuration from the process environment.
    ///
    /// | Env Var                  | Required | Default    |
    /// |--------------------------|----------|------------|
    /// | `SHOPIFY_API_KEY`        | yes      |            |
    /// | `SHOPIFY_API_SECRET`     | yes      |            |
    /// | `SHOPIFY_API_SECRET_OLD` | no       |            |
    /// | `SHOPIFY_SCOPES`         | no       | empty      |
    /// | `SHOPIFY_APP_URL`        | no       |            |
    /// | `SHOPIFY_API_VERSION`    | no       | latest     |
    /// | `DATABASE_URL`           | yes      |            |
    /// | `HOST`                   | no       | `0.0.0.0`  |
    /// | `PORT`                   | no       | `3000`     |
    /// | `APP_ENV`                | no       | development|
    /// | `SESSION_COOKIE`         | no       | `true`     |
    /// | `COOKIE_SECRET`          | no       | random     |
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required variable is missing or any
    /// variable fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// [`from_env`](Self::from_env) delegates here with `std::env::var`.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| {
            non_empty(name).ok_or(ConfigError::MissingRequiredField { field: name })
        };

        let mut builder = Self::builder()
            .api_key(ApiKey::new(required("SHOPIFY_API_KEY")?)?)
            .api_secret_key(ApiSecretKey::new(required("SHOPIFY_API_SECRET")?)?)
            .database_url(required("DATABASE_URL")?);

        if let Some(old) = non_empty("SHOPIFY_API_SECRET_OLD") {
            builder = builder.old_api_secret_key(ApiSecretKey::new(old)?);
        }
        if let Some(scopes) = non_empty("SHOPIFY_SCOPES") {
            builder = builder.scopes(scopes.parse()?);
        }
        if let Some(host) = non_empty("SHOPIFY_APP_URL") {
            builder = builder.host(HostUrl::new(host)?);
        }
        if let Some(version) = non_empty("SHOPIFY_API_VERSION") {
            builder = builder.api_version(version.parse()?);
        }
        if let Some(bind_host) = non_empty("HOST") {
            builder = builder.bind_host(bind_host);
        }
        if let Some(port) = non_empty("PORT") {
            let parsed = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidEnvValue {
                    variable: "PORT",
                    value: port.clone(),
                })?;
            builder = builder.port(parsed);
        }
        if let Some(env) = non_empty("APP_ENV") {
            builder = builder.production(env.trim().eq_ignore_ascii_case("production"));
        }
        if let Some(flag) = non_empty("SESSION_COOKIE") {
            builder = builder.session_cookie(parse_flag("SESSION_COOKIE", &flag)?);
        }
        if let Some(secret) = non_empty("COOKIE_SECRET") {
            builder = builder.cookie_secret(secret.into_bytes());
        }

        builder.build()
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the old API secret key, if configured.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns the OAuth scopes requested at install time.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the public URL of this application, if configured.
    #[must_use]
    pub const fn host(&self) -> Option<&HostUrl> {
        self.host.as_ref()
    }

    /// Returns the Admin API version used for catalog requests.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the session store connection string.
    ///
    /// The special value `memory` selects the in-process store.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the address the HTTP server binds to.
    #[must_use]
    pub fn bind_host(&self) -> &str {
        &self.bind_host
    }

    /// Returns the port the HTTP server listens on.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns `true` when running in production (cookies get `Secure`).
    #[must_use]
    pub const fn is_production(&self) -> bool {
        self.production
    }

    /// Returns `true` when the callback also sets the `shopify-app` cookie.
    #[must_use]
    pub const fn session_cookie(&self) -> bool {
        self.session_cookie
    }

    /// Returns the master secret for cookie encryption, if configured.
    #[must_use]
    pub fn cookie_secret(&self) -> Option<&[u8]> {
        self.cookie_secret.as_deref()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key)
            .field("api_secret_key", &self.api_secret_key)
            .field("scopes", &self.scopes)
            .field("host", &self.host)
            .field("api_version", &self.api_version)
            .field("bind_host", &self.bind_host)
            .field("port", &self.port)
            .field("production", &self.production)
            .field("session_cookie", &self.session_cookie)
            .finish_non_exhaustive()
    }
}

// Verify AppConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AppConfig>();
};

fn parse_flag(variable: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvValue {
            variable,
            value: value.to_string(),
        }),
    }
}

/// Builder for constructing [`AppConfig`] instances.
///
/// Required fields are `api_key`, `api_secret_key` and `database_url`.
///
/// # Defaults
///
/// - `api_version`: Latest stable version
/// - `scopes`: Empty
/// - `host`: `None`
/// - `bind_host`: `0.0.0.0`
/// - `port`: `3000`
/// - `production`: `false`
/// - `session_cookie`: `true`
/// - `cookie_secret`: `None` (a random key is generated per process)
#[derive(Default)]
pub struct AppConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: Option<AuthScopes>,
    host: Option<HostUrl>,
    api_version: Option<ApiVersion>,
    database_url: Option<String>,
    bind_host: Option<String>,
    port: Option<u16>,
    production: Option<bool>,
    session_cookie: Option<bool>,
    cookie_secret: Option<Vec<u8>>,
}

impl fmt::Debug for AppConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfigBuilder")
            .field("api_key", &self.api_key)
            .field("api_secret_key", &self.api_secret_key)
            .field("old_api_secret_key", &self.old_api_secret_key)
            .field("scopes", &self.scopes)
            .field("host", &self.host)
            .field("api_version", &self.api_version)
            .field("database_url", &self.database_url.as_ref().map(|_| "*****"))
            .field("bind_host", &self.bind_host)
            .field("port", &self.port)
            .field("production", &self.production)
            .field("session_cookie", &self.session_cookie)
            .field("cookie_secret", &self.cookie_secret.as_ref().map(|_| "*****"))
            .finish()
    }
}

impl AppConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the old API secret key for key rotation support.
    #[must_use]
    pub fn old_api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.old_api_secret_key = Some(key);
        self
    }

    /// Sets the OAuth scopes.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the public application URL.
    #[must_use]
    pub fn host(mut self, host: HostUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the Admin API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the session store connection string (required).
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Sets the bind address.
    #[must_use]
    pub fn bind_host(mut self, host: impl Into<String>) -> Self {
        self.bind_host = Some(host.into());
        self
    }

    /// Sets the listen port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Marks the deployment as production.
    #[must_use]
    pub const fn production(mut self, production: bool) -> Self {
        self.production = Some(production);
        self
    }

    /// Enables or disables the `shopify-app` session hint cookie.
    #[must_use]
    pub const fn session_cookie(mut self, enabled: bool) -> Self {
        self.session_cookie = Some(enabled);
        self
    }

    /// Sets the master secret used to encrypt cookies.
    #[must_use]
    pub fn cookie_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.cookie_secret = Some(secret.into());
        self
    }

    /// Builds the [`AppConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key`,
    /// `api_secret_key` or `database_url` are not set, and
    /// [`ConfigError::CookieSecretTooShort`] for a short cookie secret.
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;
        let database_url = self
            .database_url
            .ok_or(ConfigError::MissingRequiredField {
                field: "database_url",
            })?;

        if let Some(secret) = &self.cookie_secret {
            if secret.len() < MIN_COOKIE_SECRET_LEN {
                return Err(ConfigError::CookieSecretTooShort { len: secret.len() });
            }
        }

        Ok(AppConfig {
            api_key,
            api_secret_key,
            old_api_secret_key: self.old_api_secret_key,
            scopes: self.scopes.unwrap_or_default(),
            host: self.host,
            api_version: self.api_version.unwrap_or_else(ApiVersion::latest),
            database_url,
            bind_host: self.bind_host.unwrap_or_else(|| "0.0.0.0".to_string()),
            port: self.port.unwrap_or(3000),
            production: self.production.unwrap_or(false),
            session_cookie: self.session_cookie.unwrap_or(true),
            cookie_secret: self.cookie_secret,
        })
    }
}
