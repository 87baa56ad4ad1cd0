use axum::extract::{Path, State};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

use super::{parse_secret_id, SecretsError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkViewedResponse {
    pub viewed: bool,
}

/// Older clients confirm a view after reading. Reads already consume, so this
/// only deletes a one-time secret that is still around.
#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Path(secret_id): Path<String>,
) -> Result<Json<MarkViewedResponse>, SecretsError> {
    let id = parse_secret_id(&secret_id)?;
    state.policy().mark_viewed(id).await?;
    Ok(Json(MarkViewedResponse { viewed: true }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkViewedRequest {
    pub secret_id: Uuid,
}

impl ApiRequest for MarkViewedRequest {
    type Response = MarkViewedResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("/secrets/{}/viewed", self.secret_id))?;
        Ok(client.post(full_url))
    }
}
