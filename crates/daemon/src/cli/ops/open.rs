use clap::Args;
use url::Url;
use uuid::Uuid;

use burnnote_daemon::http_server::api::client::ApiError;
use burnnote_daemon::http_server::api::secrets::{GetSecretRequest, VerifySecretRequest};

#[derive(Args, Debug, Clone)]
pub struct Open {
    /// Secret link or bare secret id
    pub target: String,

    /// Passcode for a protected secret
    #[arg(long)]
    pub passcode: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("not a secret link or id: {0}")]
    InvalidTarget(String),
    #[error("this secret is passcode protected, pass --passcode")]
    PasscodeRequired,
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Accept either a bare id or any URL whose last path segment is the id
fn parse_target(target: &str) -> Result<Uuid, OpenError> {
    if let Ok(id) = Uuid::parse_str(target) {
        return Ok(id);
    }

    Url::parse(target)
        .ok()
        .and_then(|url| {
            url.path_segments()?
                .filter(|segment| !segment.is_empty())
                .last()
                .and_then(|segment| Uuid::parse_str(segment).ok())
        })
        .ok_or_else(|| OpenError::InvalidTarget(target.to_string()))
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Open {
    type Error = OpenError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let secret_id = parse_target(&self.target)?;

        let response = match &self.passcode {
            Some(passcode) => {
                ctx.client
                    .call(VerifySecretRequest {
                        secret_id,
                        passcode: passcode.clone(),
                    })
                    .await?
            }
            None => match ctx.client.call(GetSecretRequest { secret_id }).await {
                Err(e) if e.code() == Some("passcode_required") => {
                    return Err(OpenError::PasscodeRequired)
                }
                other => other?,
            },
        };

        Ok(response.secret)
    }
}
