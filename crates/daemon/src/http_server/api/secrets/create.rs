use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use common::prelude::SubmitSecret;

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

use super::SecretsError;

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecretRequest {
    /// The text to share
    pub secret: String,
    /// Optional passcode the recipient must supply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passcode: Option<String>,
    /// Destroy the secret on first successful read
    #[serde(default = "default_one_time")]
    pub one_time: bool,
    /// Absolute expiry (RFC 3339)
    #[serde(
        default,
        alias = "expiration",
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub destroy_after: Option<OffsetDateTime>,
}

fn default_one_time() -> bool {
    true
}

impl std::fmt::Debug for CreateSecretRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateSecretRequest")
            .field("secret", &"<redacted>")
            .field("passcode", &self.passcode.as_ref().map(|_| "<redacted>"))
            .field("one_time", &self.one_time)
            .field("destroy_after", &self.destroy_after)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSecretResponse {
    pub id: Uuid,
    pub url: Url,
}

pub async fn handler(
    State(state): State<ServiceState>,
    payload: Result<Json<CreateSecretRequest>, JsonRejection>,
) -> Result<impl IntoResponse, SecretsError> {
    let Json(req) = payload?;

    let record = state
        .policy()
        .submit(SubmitSecret {
            payload: req.secret,
            passcode: req.passcode,
            one_time: req.one_time,
            expires_at: req.destroy_after,
        })
        .await?;

    let url = state.secret_url(&record.id);

    Ok((
        StatusCode::CREATED,
        Json(CreateSecretResponse { id: record.id, url }),
    ))
}

impl ApiRequest for CreateSecretRequest {
    type Response = CreateSecretResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/secrets")?;
        Ok(client.post(full_url).json(&self))
    }
}
