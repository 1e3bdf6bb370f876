use axum::extract::{Query, State};
use axum::response::Response;
use axum_extra::extract::PrivateCookieJar;

use super::error::AppError;
use super::{cookies, found, AppState, ShopParams, CALLBACK_PATH};
use crate::auth::callback::CallbackFlow;
use crate::auth::oauth::{begin_auth, CallbackQuery};
use crate::config::ShopDomain;

/// `GET /auth?shop=` starts an offline-token install.
pub(super) async fn begin(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(params): Query<ShopParams>,
) -> Result<(PrivateCookieJar, Response), AppError> {
    let Some(shop) = ShopDomain::parse_query(params.shop.as_deref()) else {
        tracing::warn!(shop = ?params.shop, "Rejected install with invalid shop parameter");
        return Err(AppError::InvalidShopParameter);
    };

    let result = begin_auth(&state.config, &shop, CALLBACK_PATH, false)
        .map_err(AppError::OAuthInitiation)?;

    let jar = jar.add(cookies::state_cookie(
        &result.state,
        state.config.is_production(),
    ));

    tracing::info!(shop = %shop, "Redirecting to Shopify authorization");
    Ok((jar, found(&result.auth_url)))
}

/// `GET /auth/callback` completes the install.
pub(super) async fn callback(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<(PrivateCookieJar, Response), AppError> {
    let query = CallbackQuery::from_pairs(pairs);
    let expected_state = cookies::get_state(&jar);

    let outcome = CallbackFlow::new(&state.config, state.exchanger.as_ref(), state.store.as_ref())
        .run(&query, expected_state.as_deref())
        .await?;

    let mut jar = jar.remove(cookies::clear_state_cookie());
    if state.config.session_cookie() {
        jar = jar.add(cookies::session_cookie(
            &outcome.session,
            state.config.is_production(),
        ));
    }

    tracing::info!(shop = %outcome.session.shop, "Install completed");
    Ok((jar, found(&outcome.redirect_to)))
}
