use axum::extract::{Path, State};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::api::secrets::parse_secret_id;
use crate::ServiceState;

use super::{AdminAuth, AdminError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSecretResponse {
    pub deleted: bool,
}

#[tracing::instrument(skip(state))]
pub async fn handler(
    _auth: AdminAuth,
    State(state): State<ServiceState>,
    Path(secret_id): Path<String>,
) -> Result<Json<DeleteSecretResponse>, AdminError> {
    let id = parse_secret_id(&secret_id)?;
    state.policy().delete(id).await?;
    Ok(Json(DeleteSecretResponse { deleted: true }))
}

#[derive(Debug, Clone)]
pub struct DeleteSecretRequest {
    pub admin_token: String,
    pub secret_id: Uuid,
}

impl ApiRequest for DeleteSecretRequest {
    type Response = DeleteSecretResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("/admin/secrets/{}", self.secret_id))?;
        Ok(client.delete(full_url).bearer_auth(self.admin_token))
    }
}
