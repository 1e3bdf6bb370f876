//! Authorization code exchange.
//!
//! The [`TokenExchanger`] trait is the seam between the callback flow and
//! Shopify's token endpoint. [`ShopifyTokenExchanger`] is the production
//! implementation; tests substitute their own.

use async_trait::async_trait;

use crate::auth::session::AccessTokenResponse;
use crate::auth::oauth::error::OAuthError;
use crate::config::{AppConfig, ApiKey, ApiSecretKey, ShopDomain};

/// Exchanges an authorization code for an access token.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Performs the exchange for `shop`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::TokenExchangeFailed`] when the endpoint is
    /// unreachable, answers with a non-success status, or sends an
    /// unparseable body.
    async fn exchange_code(
        &self,
        shop: &ShopDomain,
        code: &str,
    ) -> Result<AccessTokenResponse, OAuthError>;
}

/// Request body for token exchange.
#[derive(serde::Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Token exchange against `POST https://{shop}/admin/oauth/access_token`.
///
/// # Example
///
/// ```rust,ignore
/// let exchanger = ShopifyTokenExchanger::new(&config);
/// let response = exchanger.exchange_code(&shop, "auth-code").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ShopifyTokenExchanger {
    client: reqwest::Client,
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    endpoint_override: Option<String>,
}

impl ShopifyTokenExchanger {
    /// Creates an exchanger using the app credentials from `config`.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key().clone(),
            api_secret_key: config.api_secret_key().clone(),
            endpoint_override: None,
        }
    }

    /// Sends every exchange to `origin` instead of the shop's own domain.
    ///
    /// Used to point the exchanger at a local mock server.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.endpoint_override = Some(origin.into());
        self
    }

    fn token_url(&self, shop: &ShopDomain) -> String {
        let origin = self
            .endpoint_override
            .clone()
            .unwrap_or_else(|| format!("https://{}", shop.as_ref()));
        format!("{origin}/admin/oauth/access_token")
    }
}

#[async_trait]
impl TokenExchanger for ShopifyTokenExchanger {
    async fn exchange_code(
        &self,
        shop: &ShopDomain,
        code: &str,
    ) -> Result<AccessTokenResponse, OAuthError> {
        let request_body = TokenExchangeRequest {
            client_id: self.api_key.as_ref(),
            client_secret: self.api_secret_key.as_ref(),
            code,
        };

        let response = self
            .client
            .post(self.token_url(shop))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed {
                status: 0,
                message: format!("Network error: {e}"),
            })?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(OAuthError::TokenExchangeFailed {
                status,
                message: error_body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed {
                status,
                message: format!("Failed to parse token response: {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config() -> AppConfig {
        AppConfig::builder()
            .api_key(ApiKey::new("test-api-key").unwrap())
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .database_url("memory")
            .build()
            .unwrap()
    }

    fn shop() -> ShopDomain {
        ShopDomain::new("test-store.myshopify.com").unwrap()
    }

    #[test]
    fn test_token_url_defaults_to_shop_domain() {
        let exchanger = ShopifyTokenExchanger::new(&create_test_config());
        assert_eq!(
            exchanger.token_url(&shop()),
            "https://test-store.myshopify.com/admin/oauth/access_token"
        );
    }

    #[tokio::test]
    async fn test_exchange_code_posts_credentials_and_code() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/admin/oauth/access_token"))
            .and(body_json(serde_json::json!({
                "client_id": "test-api-key",
                "client_secret": "test-secret",
                "code": "auth-code-123"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok_123",
                "scope": "read_products"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let exchanger =
            ShopifyTokenExchanger::new(&create_test_config()).with_origin(mock_server.uri());
        let response = exchanger
            .exchange_code(&shop(), "auth-code-123")
            .await
            .unwrap();

        assert_eq!(response.access_token.as_deref(), Some("tok_123"));
        assert_eq!(response.scope.as_deref(), Some("read_products"));
    }

    #[tokio::test]
    async fn test_exchange_code_surfaces_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/admin/oauth/access_token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_request"))
            .mount(&mock_server)
            .await;

        let exchanger =
            ShopifyTokenExchanger::new(&create_test_config()).with_origin(mock_server.uri());
        let result = exchanger.exchange_code(&shop(), "stale-code").await;

        match result {
            Err(OAuthError::TokenExchangeFailed { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "invalid_request");
            }
            other => panic!("Expected TokenExchangeFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_code_rejects_unparseable_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let exchanger =
            ShopifyTokenExchanger::new(&create_test_config()).with_origin(mock_server.uri());
        let result = exchanger.exchange_code(&shop(), "code").await;

        assert!(matches!(
            result,
            Err(OAuthError::TokenExchangeFailed { status: 200, .. })
        ));
    }
}
