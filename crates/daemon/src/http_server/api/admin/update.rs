use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;
use uuid::Uuid;

use common::prelude::SecretChanges;

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::api::secrets::parse_secret_id;
use crate::ServiceState;

use super::{AdminAuth, AdminError, SecretMetadata};

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSecretBody {
    /// Replacement payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// New passcode, hashed before it is stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passcode: Option<String>,
    /// Remove passcode protection
    #[serde(default)]
    pub clear_passcode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_time: Option<bool>,
    /// Absent leaves the expiry alone, `null` removes it
    #[serde(
        default,
        alias = "expiration",
        deserialize_with = "deserialize_destroy_after",
        serialize_with = "serialize_destroy_after",
        skip_serializing_if = "Option::is_none"
    )]
    pub destroy_after: Option<Option<OffsetDateTime>>,
}

fn deserialize_destroy_after<'de, D>(
    deserializer: D,
) -> Result<Option<Option<OffsetDateTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    time::serde::rfc3339::option::deserialize(deserializer).map(Some)
}

fn serialize_destroy_after<S>(
    value: &Option<Option<OffsetDateTime>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(inner) => time::serde::rfc3339::option::serialize(inner, serializer),
        None => serializer.serialize_none(),
    }
}

impl std::fmt::Debug for UpdateSecretBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateSecretBody")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("passcode", &self.passcode.as_ref().map(|_| "<redacted>"))
            .field("clear_passcode", &self.clear_passcode)
            .field("one_time", &self.one_time)
            .field("destroy_after", &self.destroy_after)
            .finish()
    }
}

pub async fn handler(
    _auth: AdminAuth,
    State(state): State<ServiceState>,
    Path(secret_id): Path<String>,
    payload: Result<Json<UpdateSecretBody>, JsonRejection>,
) -> Result<Json<SecretMetadata>, AdminError> {
    let id = parse_secret_id(&secret_id)?;
    let Json(body) = payload?;

    let record = state
        .policy()
        .update(
            id,
            SecretChanges {
                payload: body.secret,
                passcode: body.passcode,
                clear_passcode: body.clear_passcode,
                one_time: body.one_time,
                expires_at: body.destroy_after,
            },
        )
        .await?;

    Ok(Json(record.into()))
}

#[derive(Debug, Clone)]
pub struct UpdateSecretRequest {
    pub admin_token: String,
    pub secret_id: Uuid,
    pub body: UpdateSecretBody,
}

impl ApiRequest for UpdateSecretRequest {
    type Response = SecretMetadata;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("/admin/secrets/{}", self.secret_id))?;
        Ok(client
            .put(full_url)
            .bearer_auth(self.admin_token)
            .json(&self.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destroy_after_tristate() {
        let absent: UpdateSecretBody = serde_json::from_str(r#"{"oneTime":false}"#).unwrap();
        assert_eq!(absent.destroy_after, None);

        let cleared: UpdateSecretBody = serde_json::from_str(r#"{"destroyAfter":null}"#).unwrap();
        assert_eq!(cleared.destroy_after, Some(None));

        let set: UpdateSecretBody =
            serde_json::from_str(r#"{"destroyAfter":"2026-10-19T00:00:00Z"}"#).unwrap();
        assert_eq!(
            set.destroy_after,
            Some(Some(time::macros::datetime!(2026-10-19 00:00:00 UTC)))
        );
    }

    #[test]
    fn test_clear_serializes_as_null() {
        let body = UpdateSecretBody {
            destroy_after: Some(None),
            ..Default::default()
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["destroyAfter"].is_null());
        assert!(json.get("secret").is_none());
    }
}
