//! Public secret endpoints
//!
//! Create a secret, read it (consuming it if one-time), unlock a
//! passcode-protected secret, and mark a secret as viewed.

use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use common::prelude::Disclosure;

use crate::ServiceState;

pub mod create;
mod error;
pub mod get;
pub mod verify;
pub mod viewed;

pub use create::{CreateSecretRequest, CreateSecretResponse};
pub use error::SecretsError;
pub use get::GetSecretRequest;
pub use verify::VerifySecretRequest;
pub use viewed::{MarkViewedRequest, MarkViewedResponse};

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", post(create::handler))
        .route("/:secret_id", get(get::handler))
        .route("/:secret_id/verify", post(verify::handler))
        .route("/:secret_id/viewed", post(viewed::handler))
        .with_state(state)
}

/// A malformed identifier can never name a secret, so it reads as not found.
pub(crate) fn parse_secret_id(raw: &str) -> Result<Uuid, SecretsError> {
    Uuid::parse_str(raw).map_err(|_| SecretsError::NotFound)
}

/// Body returned whenever a payload is disclosed
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretResponse {
    pub secret: String,
    pub one_time: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub destroy_after: Option<OffsetDateTime>,
}

impl From<Disclosure> for SecretResponse {
    fn from(disclosure: Disclosure) -> Self {
        Self {
            secret: disclosure.payload,
            one_time: disclosure.one_time,
            destroy_after: disclosure.expires_at,
        }
    }
}

impl std::fmt::Debug for SecretResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretResponse")
            .field("secret", &"<redacted>")
            .field("one_time", &self.one_time)
            .field("destroy_after", &self.destroy_after)
            .finish()
    }
}
