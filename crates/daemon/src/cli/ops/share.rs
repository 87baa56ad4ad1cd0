use std::io::Read;

use clap::Args;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use burnnote_daemon::http_server::api::client::ApiError;
use burnnote_daemon::http_server::api::secrets::CreateSecretRequest;

#[derive(Args, Debug, Clone)]
pub struct Share {
    /// The secret to share; read from stdin when omitted
    pub secret: Option<String>,

    /// Require this passcode to open the secret
    #[arg(long)]
    pub passcode: Option<String>,

    /// Keep the secret readable until it expires instead of burning it on first read
    #[arg(long)]
    pub multi_read: bool,

    /// Destroy the secret after this many seconds
    #[arg(long, conflicts_with = "destroy_after")]
    pub ttl: Option<u64>,

    /// Destroy the secret at this time (RFC 3339)
    #[arg(long, value_parser = parse_rfc3339)]
    pub destroy_after: Option<OffsetDateTime>,
}

fn parse_rfc3339(value: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| e.to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("failed to read secret from stdin: {0}")]
    Stdin(#[from] std::io::Error),
    #[error("ttl is out of range")]
    TtlOutOfRange,
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Share {
    type Error = ShareError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let secret = match &self.secret {
            Some(secret) => secret.clone(),
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf.trim_end_matches(['\r', '\n']).to_string()
            }
        };

        let destroy_after = match self.ttl {
            Some(secs) => {
                let ttl = i64::try_from(secs)
                    .map(time::Duration::seconds)
                    .map_err(|_| ShareError::TtlOutOfRange)?;
                Some(
                    OffsetDateTime::now_utc()
                        .checked_add(ttl)
                        .ok_or(ShareError::TtlOutOfRange)?,
                )
            }
            None => self.destroy_after,
        };

        let request = CreateSecretRequest {
            secret,
            passcode: self.passcode.clone(),
            one_time: !self.multi_read,
            destroy_after,
        };

        let response = ctx.client.call(request).await?;
        Ok(response.url.to_string())
    }
}
