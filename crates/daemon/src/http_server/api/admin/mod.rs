//! Administrative endpoints
//!
//! Served only when an admin token is configured, and only to requests
//! carrying it as a bearer token. Payloads are never listed.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::Router;
use http::header::AUTHORIZATION;
use http::request::Parts;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use time::OffsetDateTime;
use uuid::Uuid;

use common::prelude::SecretRecord;

use crate::http_server::api::secrets::SecretsError;
use crate::http_server::api::ErrorBody;
use crate::ServiceState;

pub mod delete;
pub mod list;
pub mod update;

pub use delete::{DeleteSecretRequest, DeleteSecretResponse};
pub use list::{ListSecretsRequest, ListSecretsResponse};
pub use update::{UpdateSecretBody, UpdateSecretRequest};

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/secrets", get(list::handler))
        .route(
            "/secrets/:secret_id",
            put(update::handler).delete(delete::handler),
        )
        .with_state(state)
}

/// Everything about a secret except its payload and passcode hash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretMetadata {
    pub id: Uuid,
    pub one_time: bool,
    pub protected: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub destroy_after: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<SecretRecord> for SecretMetadata {
    fn from(record: SecretRecord) -> Self {
        Self {
            id: record.id,
            one_time: record.one_time,
            protected: record.is_protected(),
            destroy_after: record.expires_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Proof that the request presented the configured admin token
#[derive(Debug)]
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<ServiceState> for AdminAuth {
    type Rejection = AdminError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.admin_token().ok_or(AdminError::Disabled)?;

        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AdminError::Unauthorized)?;

        if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(AdminAuth)
        } else {
            tracing::warn!("admin request with invalid token");
            Err(AdminError::Unauthorized)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("admin routes are disabled")]
    Disabled,
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Secrets(#[from] SecretsError),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        match self {
            AdminError::Disabled => {
                ErrorBody::new("Not found", "not_found").into_response_with(StatusCode::NOT_FOUND)
            }
            AdminError::Unauthorized => ErrorBody::new("Unauthorized", "unauthorized")
                .into_response_with(StatusCode::UNAUTHORIZED),
            AdminError::Secrets(e) => e.into_response(),
        }
    }
}

impl From<common::prelude::DisclosureError> for AdminError {
    fn from(e: common::prelude::DisclosureError) -> Self {
        AdminError::Secrets(e.into())
    }
}

impl From<axum::extract::rejection::JsonRejection> for AdminError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AdminError::Secrets(rejection.into())
    }
}
