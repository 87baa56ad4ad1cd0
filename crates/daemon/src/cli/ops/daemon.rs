use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Args;

use burnnote_daemon::state::AppState;
use burnnote_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server port (default from config)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Directory for log files (defaults to the logs/ directory next to the config)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,

    /// Log to stdout only
    #[arg(long, conflicts_with = "log_dir")]
    pub no_log_file: bool,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] burnnote_daemon::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Load state from config path (or default ~/.burnnote)
        let state = AppState::load(ctx.config_path.clone())?;

        let api_port = self.api_port.unwrap_or(state.config.api_port);
        let log_dir = if self.no_log_file {
            None
        } else {
            Some(self.log_dir.clone().unwrap_or(state.logs_path.clone()))
        };

        let config = ServiceConfig {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, api_port)),
            public_url: state.config.public_url.clone(),
            admin_token: state.config.admin_token.clone(),
            sqlite_path: Some(state.db_path),
            max_payload_bytes: state.config.max_payload_bytes,
            passcode: state.config.passcode,
            sweep_interval: Duration::from_secs(state.config.sweep_interval_secs.max(1)),
            log_level: self.log_level,
            log_dir,
        };

        spawn_service(&config).await;
        Ok("daemon ended".to_string())
    }
}
