use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

use super::{parse_secret_id, SecretResponse, SecretsError};

#[derive(Clone, Serialize, Deserialize)]
pub struct VerifyBody {
    pub passcode: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(secret_id): Path<String>,
    payload: Result<Json<VerifyBody>, JsonRejection>,
) -> Result<Json<SecretResponse>, SecretsError> {
    let id = parse_secret_id(&secret_id)?;
    let Json(body) = payload?;

    let disclosure = state.policy().verify(id, &body.passcode).await?;
    Ok(Json(disclosure.into()))
}

/// Request for client-side passcode verification
#[derive(Clone)]
pub struct VerifySecretRequest {
    pub secret_id: Uuid,
    pub passcode: String,
}

impl ApiRequest for VerifySecretRequest {
    type Response = SecretResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("/secrets/{}/verify", self.secret_id))?;
        Ok(client.post(full_url).json(&VerifyBody {
            passcode: self.passcode,
        }))
    }
}
