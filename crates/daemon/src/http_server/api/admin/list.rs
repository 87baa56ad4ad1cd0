use axum::extract::State;
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

use super::{AdminAuth, AdminError, SecretMetadata};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSecretsResponse {
    pub secrets: Vec<SecretMetadata>,
}

#[tracing::instrument(skip(state))]
pub async fn handler(
    _auth: AdminAuth,
    State(state): State<ServiceState>,
) -> Result<Json<ListSecretsResponse>, AdminError> {
    let secrets = state
        .policy()
        .list()
        .await?
        .into_iter()
        .map(SecretMetadata::from)
        .collect();

    Ok(Json(ListSecretsResponse { secrets }))
}

#[derive(Debug, Clone)]
pub struct ListSecretsRequest {
    pub admin_token: String,
}

impl ApiRequest for ListSecretsRequest {
    type Response = ListSecretsResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/admin/secrets")?;
        Ok(client.get(full_url).bearer_auth(self.admin_token))
    }
}
