//! Admin API product catalog client.
//!
//! [`CatalogClient`] fetches a shop's products with its stored access token
//! and normalizes them into [`Product`] values for rendering.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AccessToken;
use crate::config::{ApiVersion, ShopDomain};

/// Header carrying the Admin API access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Errors raised while fetching the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request could not be sent or the body could not be decoded.
    #[error("Catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Shopify answered with a non-success status.
    #[error("Catalog request returned status {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body.
        body: String,
    },
}

/// A product image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Image URL.
    pub src: String,
    /// Alt text, if set.
    #[serde(default)]
    pub alt: Option<String>,
}

/// A normalized product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub product_type: String,
    pub vendor: String,
    pub image: Option<ProductImage>,
}

#[derive(Deserialize)]
struct ProductsEnvelope {
    #[serde(default)]
    products: Vec<RawProduct>,
}

#[derive(Deserialize)]
struct RawProduct {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    product_type: String,
    #[serde(default)]
    vendor: String,
    #[serde(default)]
    image: Option<ProductImage>,
    #[serde(default)]
    images: Vec<ProductImage>,
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        // Older responses only carry the images array
        let image = raw.image.or_else(|| raw.images.into_iter().next());
        Self {
            id: raw.id,
            title: raw.title,
            product_type: raw.product_type,
            vendor: raw.vendor,
            image,
        }
    }
}

/// Fetches products from the Admin REST API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    api_version: ApiVersion,
    origin_override: Option<String>,
}

impl CatalogClient {
    /// Creates a client for the given Admin API version.
    #[must_use]
    pub fn new(api_version: ApiVersion) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_version,
            origin_override: None,
        }
    }

    /// Sends every request to `origin` instead of the shop's own domain.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin_override = Some(origin.into());
        self
    }

    fn products_url(&self, shop: &ShopDomain) -> String {
        let origin = self
            .origin_override
            .clone()
            .unwrap_or_else(|| format!("https://{}", shop.as_ref()));
        format!("{origin}/admin/api/{}/products.json", self.api_version)
    }

    /// Lists the shop's products.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Status`] for a non-success response and
    /// [`CatalogError::Request`] for transport or decoding failures.
    pub async fn list_products(
        &self,
        shop: &ShopDomain,
        token: &AccessToken,
    ) -> Result<Vec<Product>, CatalogError> {
        let response = self
            .client
            .get(self.products_url(shop))
            .header(ACCESS_TOKEN_HEADER, token.as_ref())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ProductsEnvelope = response.json().await?;
        tracing::debug!(shop = %shop, count = envelope.products.len(), "Fetched products");

        Ok(envelope.products.into_iter().map(Product::from).collect())
    }
}
