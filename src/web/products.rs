use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;

use super::error::AppError;
use super::{cookies, found, pages, AppState, ShopParams};
use crate::auth::Session;
use crate::config::ShopDomain;

/// Resolves the session backing a products request.
///
/// The shop comes from the query string. Only when `shop` is absent does it
/// fall back to the session hint cookie; an invalid `shop` is never replaced
/// by the cookie's. Returns `None` when there is no usable shop, no stored
/// session, an inactive session, or the store fails.
pub async fn load_page_context(
    state: &AppState,
    jar: &PrivateCookieJar,
    shop: Option<&str>,
) -> Option<Session> {
    let shop = match shop {
        Some(_) => ShopDomain::parse_query(shop),
        None => hinted_shop(jar),
    }?;

    match state.store.find_session_by_shop(&shop).await {
        Ok(Some(session)) if session.is_active() => Some(session),
        Ok(Some(_)) => {
            tracing::info!(shop = %shop, "Stored session is no longer active");
            None
        }
        Ok(None) => {
            tracing::debug!(shop = %shop, "No stored session");
            None
        }
        Err(e) => {
            tracing::error!(shop = %shop, error = %e, "Session lookup failed");
            None
        }
    }
}

/// `GET /products?shop=` renders the shop's catalog.
pub(super) async fn page(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(params): Query<ShopParams>,
) -> Response {
    let Some(session) = load_page_context(&state, &jar, params.shop.as_deref()).await else {
        return found("/");
    };

    match state
        .catalog
        .list_products(&session.shop, &session.access_token)
        .await
    {
        Ok(products) => Html(pages::products_page(&session.shop, &products)).into_response(),
        Err(e) => {
            tracing::error!(shop = %session.shop, error = %e, "Failed to fetch products");
            (
                StatusCode::BAD_GATEWAY,
                Html(pages::products_error_page(
                    &session.shop,
                    "Failed to fetch products",
                )),
            )
                .into_response()
        }
    }
}

/// `GET /api/products?shop=` returns the shop's catalog as JSON.
///
/// The caller must hold the session hint cookie for the same shop.
pub(super) async fn list(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(params): Query<ShopParams>,
) -> Result<Response, AppError> {
    let session = load_page_context(&state, &jar, params.shop.as_deref())
        .await
        .ok_or(AppError::NoSession)?;

    if hinted_shop(&jar).as_ref() != Some(&session.shop) {
        tracing::warn!(shop = %session.shop, "Product request without a matching session cookie");
        return Err(AppError::NoSession);
    }

    let products = state
        .catalog
        .list_products(&session.shop, &session.access_token)
        .await?;

    Ok(Json(json!({ "data": products })).into_response())
}

/// The shop named by the session hint cookie, re-validated.
fn hinted_shop(jar: &PrivateCookieJar) -> Option<ShopDomain> {
    cookies::get_session_hint(jar).and_then(|hint| ShopDomain::parse_query(Some(&hint.shop)))
}
