//! HTTP surface.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | install form |
//! | `GET /auth?shop=` | start the install |
//! | `GET /auth/callback` | finish the install |
//! | `GET /products?shop=` | rendered catalog |
//! | `GET /api/products?shop=` | catalog as JSON |
//! | `GET /health` | liveness |
//!
//! Only `GET` is routed; other methods get `405 Method Not Allowed`.

mod auth;
pub mod cookies;
mod error;
pub mod pages;
mod products;

pub use error::AppError;
pub use products::load_page_context;

use std::sync::Arc;

use axum::extract::FromRef;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use axum_extra::extract::cookie::Key;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::auth::oauth::TokenExchanger;
use crate::catalog::CatalogClient;
use crate::config::AppConfig;
use crate::storage::SessionStore;

/// Path Shopify redirects back to after authorization.
pub const CALLBACK_PATH: &str = "/auth/callback";

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn SessionStore>,
    pub exchanger: Arc<dyn TokenExchanger>,
    pub catalog: Arc<CatalogClient>,
    pub cookie_key: Key,
}

// PrivateCookieJar requires Key to be extractable from state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Debug, Deserialize)]
struct ShopParams {
    shop: Option<String>,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/auth", get(auth::begin))
        .route(CALLBACK_PATH, get(auth::callback))
        .route("/products", get(products::page))
        .route("/api/products", get(products::list))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<String> {
    Html(pages::index_page())
}

async fn health() -> &'static str {
    "ok"
}

/// A `302 Found` redirect.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_is_302_with_location() {
        let response = found("/products?shop=test-store.myshopify.com");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/products?shop=test-store.myshopify.com"
        );
    }
}
