use axum::extract::{Path, State};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

use super::{parse_secret_id, SecretResponse, SecretsError};

#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Path(secret_id): Path<String>,
) -> Result<Json<SecretResponse>, SecretsError> {
    let id = parse_secret_id(&secret_id)?;
    let disclosure = state.policy().read(id).await?;
    Ok(Json(disclosure.into()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSecretRequest {
    pub secret_id: Uuid,
}

impl ApiRequest for GetSecretRequest {
    type Response = SecretResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("/secrets/{}", self.secret_id))?;
        Ok(client.get(full_url))
    }
}
