//! OAuth authorization URL generation.
//!
//! [`begin_auth`] is the first step of the authorization code flow. It
//! generates a state nonce and the Shopify authorization URL the merchant is
//! redirected to.

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::state::StateParam;
use crate::config::{AppConfig, ShopDomain};

/// Result of initiating OAuth authorization.
///
/// The `state` must be kept (the web layer puts it in a cookie) and checked
/// against the `state` query parameter of the callback.
#[derive(Clone, Debug)]
pub struct BeginAuthResult {
    /// The full authorization URL to redirect the merchant to.
    pub auth_url: String,

    /// The state parameter generated for this authorization request.
    pub state: StateParam,
}

/// Initiates the OAuth authorization code flow.
///
/// # Arguments
///
/// * `config` - App configuration (must have `host` configured)
/// * `shop` - The shop domain to authorize against
/// * `redirect_path` - Path on this app that receives the callback
/// * `is_online` - `true` for online (per-user, expiring) tokens, `false`
///   for offline tokens
///
/// # Errors
///
/// Returns [`OAuthError::MissingHostConfig`] if `config.host()` is `None`.
///
/// # Example
///
/// ```rust
/// use shopify_session_app::{AppConfig, ApiKey, ApiSecretKey, ShopDomain, HostUrl};
/// use shopify_session_app::auth::oauth::begin_auth;
///
/// let config = AppConfig::builder()
///     .api_key(ApiKey::new("api-key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .host(HostUrl::new("https://myapp.example.com").unwrap())
///     .scopes("read_products".parse().unwrap())
///     .database_url("memory")
///     .build()
///     .unwrap();
///
/// let shop = ShopDomain::new("test-shop.myshopify.com").unwrap();
/// let result = begin_auth(&config, &shop, "/auth/callback", false).unwrap();
/// assert!(result.auth_url.starts_with("https://test-shop.myshopify.com/admin/oauth/authorize?"));
/// assert!(!result.auth_url.contains("grant_options"));
/// ```
pub fn begin_auth(
    config: &AppConfig,
    shop: &ShopDomain,
    redirect_path: &str,
    is_online: bool,
) -> Result<BeginAuthResult, OAuthError> {
    let host = config.host().ok_or(OAuthError::MissingHostConfig)?;

    let state = StateParam::new();
    let scopes = config.scopes();
    let redirect_uri = format!("{}{}", host.as_ref(), redirect_path);

    let mut params = vec![
        ("client_id", config.api_key().as_ref().to_string()),
        ("scope", scopes.to_string()),
        ("redirect_uri", redirect_uri),
        ("state", state.to_string()),
    ];

    // Online tokens are requested per user
    if is_online {
        params.push(("grant_options[]", "per-user".to_string()));
    }

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let auth_url = format!(
        "https://{}/admin/oauth/authorize?{}",
        shop.as_ref(),
        query_string
    );

    Ok(BeginAuthResult { auth_url, state })
}
