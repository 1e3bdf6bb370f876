use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::callback::{CallbackError, FailureReason};
use crate::auth::oauth::OAuthError;
use crate::catalog::CatalogError;

/// Errors returned by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// `shop` is missing or not a `*.myshopify.com` domain.
    #[error("Invalid shop parameter")]
    InvalidShopParameter,

    /// The authorization URL could not be built.
    #[error("Failed to initiate OAuth")]
    OAuthInitiation(#[source] OAuthError),

    /// The OAuth callback failed at some stage.
    #[error("Error during authentication")]
    Callback(#[from] CallbackError),

    /// No stored session for the requested shop.
    #[error("No session")]
    NoSession,

    /// The Admin API catalog request failed.
    #[error("Failed to fetch products")]
    Catalog(#[from] CatalogError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidShopParameter => StatusCode::BAD_REQUEST,
            Self::OAuthInitiation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoSession => StatusCode::UNAUTHORIZED,
            Self::Catalog(_) => StatusCode::BAD_GATEWAY,
            Self::Callback(error) => match &error.reason {
                FailureReason::OAuth(OAuthError::InvalidHmac | OAuthError::StateMismatch) => {
                    StatusCode::UNAUTHORIZED
                }
                FailureReason::OAuth(OAuthError::InvalidCallback { .. }) => StatusCode::BAD_REQUEST,
                FailureReason::OAuth(_) | FailureReason::Storage(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::InvalidShopParameter | Self::NoSession => None,
            Self::OAuthInitiation(e) => Some(e.to_string()),
            Self::Callback(e) => Some(e.reason.to_string()),
            Self::Catalog(e) => Some(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, details = ?self.details(), "Request failed");
        }

        let body = match self.details() {
            Some(details) => json!({ "error": self.to_string(), "details": details }),
            None => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
