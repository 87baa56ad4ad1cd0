use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use common::prelude::DisclosureError;

use crate::http_server::api::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error("secret not found")]
    NotFound,
    #[error(transparent)]
    Disclosure(#[from] DisclosureError),
}

impl From<JsonRejection> for SecretsError {
    fn from(rejection: JsonRejection) -> Self {
        SecretsError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for SecretsError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            SecretsError::InvalidBody(msg) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(msg, "invalid_request"))
            }
            SecretsError::NotFound | SecretsError::Disclosure(DisclosureError::NotFound) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new("Secret not found", "not_found"),
            ),
            SecretsError::Disclosure(DisclosureError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(msg, "invalid_request"))
            }
            SecretsError::Disclosure(DisclosureError::PasscodeRequired) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("Passcode required", "passcode_required"),
            ),
            SecretsError::Disclosure(DisclosureError::InvalidPasscode) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("Invalid passcode", "invalid_passcode"),
            ),
            SecretsError::Disclosure(DisclosureError::NoPasscode) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Secret is not passcode protected", "no_passcode"),
            ),
            err @ (SecretsError::Disclosure(DisclosureError::Passcode(_))
            | SecretsError::Disclosure(DisclosureError::Storage(_))) => {
                tracing::error!("secret request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
            }
        };

        body.into_response_with(status)
    }
}
