use clap::Args;
use url::Url;

use burnnote_daemon::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// API server port
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Public base URL used in secret links (e.g., https://burn.example.com)
    #[arg(long)]
    pub public_url: Option<Url>,

    /// Bearer token enabling the admin routes
    #[arg(long, env = "BURNNOTE_ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,

    /// Largest accepted payload in bytes
    #[arg(long)]
    pub max_payload_bytes: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_port: self.api_port.unwrap_or(defaults.api_port),
            public_url: self.public_url.clone(),
            admin_token: self.admin_token.clone(),
            max_payload_bytes: self.max_payload_bytes.unwrap_or(defaults.max_payload_bytes),
            ..defaults
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let public_url = match &state.config.public_url {
            Some(url) => url.to_string(),
            None => "derived from the listen address".to_string(),
        };

        let output = format!(
            "Initialized burnnote directory at: {}\n\
             - Database: {}\n\
             - Logs: {}\n\
             - Config: {}\n\
             - API port: {}\n\
             - Public URL: {}\n\
             - Admin routes: {}",
            state.burnnote_dir.display(),
            state.db_path.display(),
            state.logs_path.display(),
            state.config_path.display(),
            state.config.api_port,
            public_url,
            if state.config.admin_token.is_some() {
                "enabled"
            } else {
                "disabled"
            },
        );

        Ok(output)
    }
}
