use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use common::disclosure::DEFAULT_MAX_PAYLOAD_BYTES;
use common::prelude::PasscodeParams;

pub const DEFAULT_API_PORT: u16 = 3000;
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// address for the API server to bind to
    pub listen_addr: SocketAddr,
    /// base URL handed back to clients when a secret is created,
    ///  if not set then one is derived from the listen address
    pub public_url: Option<Url>,
    /// bearer token guarding the admin routes,
    ///  if not set then the admin routes are not served
    pub admin_token: Option<String>,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,

    // disclosure policy
    pub max_payload_bytes: usize,
    pub passcode: PasscodeParams,
    /// how often expired secrets are purged from storage
    pub sweep_interval: Duration,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// The URL secret links are built from
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        match &self.public_url {
            Some(url) => Ok(url.clone()),
            None => {
                let host = match self.listen_addr.ip() {
                    ip if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
                    ip => ip,
                };
                Url::parse(&format!(
                    "http://{}",
                    SocketAddr::new(host, self.listen_addr.port())
                ))
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_API_PORT)),
            public_url: None,
            admin_token: None,
            sqlite_path: None,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            passcode: PasscodeParams::default(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_defaults_to_localhost() {
        let config = Config::default();
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "http://127.0.0.1:3000/"
        );
    }

    #[test]
    fn test_base_url_prefers_public_url() {
        let config = Config {
            public_url: Some(Url::parse("https://burn.example.com").unwrap()),
            ..Default::default()
        };
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://burn.example.com/"
        );
    }
}
