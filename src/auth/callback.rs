//! The OAuth callback sequence.
//!
//! A callback moves through [`CallbackStage`]s strictly in order:
//!
//! ```text
//! ReceivedCallback -> SignatureValidated -> TokenExchanged -> SessionPersisted -> Redirected
//! ```
//!
//! Any stage can fail; the failure carries the stage it happened in. Nothing
//! after a failed stage runs, so a forged callback never reaches the token
//! endpoint and a failed write never produces a redirect.

use std::fmt;

use thiserror::Error;

use crate::auth::oauth::{validate_hmac, CallbackQuery, OAuthError, TokenExchanger};
use crate::auth::Session;
use crate::config::{AppConfig, ShopDomain};
use crate::storage::{SessionStore, StorageError};

/// Path the callback redirects to on success.
pub const PRODUCTS_PATH: &str = "/products";

/// Progress of a single callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackStage {
    /// The request arrived; nothing is verified yet.
    ReceivedCallback,
    /// The HMAC signature and state matched.
    SignatureValidated,
    /// The authorization code was exchanged for a token.
    TokenExchanged,
    /// The session was written to the store.
    SessionPersisted,
    /// The redirect target was produced.
    Redirected,
}

impl fmt::Display for CallbackStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReceivedCallback => "received_callback",
            Self::SignatureValidated => "signature_validated",
            Self::TokenExchanged => "token_exchanged",
            Self::SessionPersisted => "session_persisted",
            Self::Redirected => "redirected",
        };
        f.write_str(name)
    }
}

/// Why a callback failed.
#[derive(Debug, Error)]
pub enum FailureReason {
    /// Signature, state, callback shape or token exchange problem.
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    /// The session could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A failed callback: the last stage reached and the reason it stopped.
#[derive(Debug, Error)]
#[error("OAuth callback failed after {stage}: {reason}")]
pub struct CallbackError {
    /// The last stage that completed before the failure.
    pub stage: CallbackStage,
    /// What went wrong.
    #[source]
    pub reason: FailureReason,
}

impl CallbackError {
    fn new(stage: CallbackStage, reason: impl Into<FailureReason>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

// Verify CallbackError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CallbackError>();
};

/// A completed callback.
#[derive(Clone, Debug)]
pub struct CallbackOutcome {
    /// The session that was persisted.
    pub session: Session,
    /// Relative URL to redirect the merchant to.
    pub redirect_to: String,
}

/// Runs the callback sequence against a token exchanger and a session store.
pub struct CallbackFlow<'a> {
    config: &'a AppConfig,
    exchanger: &'a dyn TokenExchanger,
    store: &'a dyn SessionStore,
}

impl<'a> CallbackFlow<'a> {
    /// Creates a flow over the given collaborators.
    #[must_use]
    pub fn new(
        config: &'a AppConfig,
        exchanger: &'a dyn TokenExchanger,
        store: &'a dyn SessionStore,
    ) -> Self {
        Self {
            config,
            exchanger,
            store,
        }
    }

    /// Runs the callback for `query`.
    ///
    /// `expected_state` is the nonce issued when the install began. `None`
    /// means it was lost (for example an expired cookie) and fails the
    /// state check.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError`] naming the last completed stage. The
    /// reason is [`OAuthError::InvalidHmac`] for a bad signature,
    /// [`OAuthError::StateMismatch`] for a bad state,
    /// [`OAuthError::InvalidCallback`] for a missing `shop` or `code`,
    /// [`OAuthError::TokenExchangeFailed`] or
    /// [`OAuthError::IncompleteSession`] for exchange problems, and
    /// [`StorageError`] when the write fails.
    pub async fn run(
        &self,
        query: &CallbackQuery,
        expected_state: Option<&str>,
    ) -> Result<CallbackOutcome, CallbackError> {
        let mut stage = CallbackStage::ReceivedCallback;

        if !validate_hmac(query, self.config) {
            tracing::warn!(%stage, "Rejected OAuth callback with invalid HMAC");
            return Err(CallbackError::new(stage, OAuthError::InvalidHmac));
        }
        verify_state(query.state(), expected_state).map_err(|e| {
            tracing::warn!(%stage, "Rejected OAuth callback with mismatched state");
            CallbackError::new(stage, e)
        })?;

        let (shop, code) = callback_params(query).map_err(|e| CallbackError::new(stage, e))?;
        stage = CallbackStage::SignatureValidated;
        tracing::debug!(shop = %shop, %stage, "OAuth callback verified");

        let response = self
            .exchanger
            .exchange_code(&shop, code)
            .await
            .map_err(|e| {
                tracing::error!(shop = %shop, error = %e, "Token exchange failed");
                CallbackError::new(stage, e)
            })?;
        let session = Session::from_token_response(shop, response).map_err(|e| {
            tracing::error!(error = %e, "Token response rejected");
            CallbackError::new(stage, e)
        })?;
        stage = CallbackStage::TokenExchanged;

        self.store.upsert_session(&session).await.map_err(|e| {
            tracing::error!(shop = %session.shop, error = %e, "Failed to persist session");
            CallbackError::new(stage, e)
        })?;
        stage = CallbackStage::SessionPersisted;
        tracing::info!(shop = %session.shop, %stage, "Session saved");

        let redirect_to = products_redirect(&session.shop, query.host());
        stage = CallbackStage::Redirected;
        tracing::debug!(shop = %session.shop, %stage, redirect_to = %redirect_to);

        Ok(CallbackOutcome {
            session,
            redirect_to,
        })
    }
}

fn verify_state(received: Option<&str>, expected: Option<&str>) -> Result<(), OAuthError> {
    let received = received.unwrap_or_default();
    let expected = expected.unwrap_or_default();

    if expected.is_empty() || !crate::auth::oauth::constant_time_compare(received, expected) {
        return Err(OAuthError::StateMismatch);
    }
    Ok(())
}

fn callback_params(query: &CallbackQuery) -> Result<(ShopDomain, &str), OAuthError> {
    let shop = query
        .shop()
        .ok_or_else(|| OAuthError::InvalidCallback {
            reason: "missing shop parameter".to_string(),
        })
        .and_then(|raw| {
            ShopDomain::new(raw).map_err(|e| OAuthError::InvalidCallback {
                reason: e.to_string(),
            })
        })?;

    let code = query
        .code()
        .filter(|code| !code.is_empty())
        .ok_or_else(|| OAuthError::InvalidCallback {
            reason: "missing code parameter".to_string(),
        })?;

    Ok((shop, code))
}

/// Builds `/products?shop=<shop>`, carrying `host` along when it looks like
/// the base64 value Shopify sends.
#[must_use]
pub fn products_redirect(shop: &ShopDomain, host: Option<&str>) -> String {
    let mut url = format!("{PRODUCTS_PATH}?shop={}", urlencoding::encode(shop.as_ref()));

    match host {
        Some(host) if is_host_param(host) => {
            url.push_str("&host=");
            url.push_str(&urlencoding::encode(host));
        }
        Some(_) => tracing::warn!(shop = %shop, "Dropping malformed host parameter"),
        None => {}
    }

    url
}

fn is_host_param(host: &str) -> bool {
    !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=' | '-' | '_'))
}
