use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use common::disclosure::DEFAULT_MAX_PAYLOAD_BYTES;
use common::prelude::PasscodeParams;

use crate::service_config::DEFAULT_API_PORT;

pub const APP_NAME: &str = "burnnote";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";
pub const LOGS_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the API server
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Base URL used when building secret links (e.g. "https://burn.example.com")
    #[serde(default)]
    pub public_url: Option<Url>,
    /// Seconds between expiry sweeps
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Largest accepted payload in bytes
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
    /// Bearer token for the admin routes; admin routes are off when unset
    #[serde(default)]
    pub admin_token: Option<String>,
    /// Argon2id cost parameters for passcode hashing
    #[serde(default)]
    pub passcode: PasscodeParams,
}

fn default_api_port() -> u16 {
    DEFAULT_API_PORT
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_payload_bytes() -> usize {
    DEFAULT_MAX_PAYLOAD_BYTES
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            public_url: None,
            sweep_interval_secs: default_sweep_interval_secs(),
            max_payload_bytes: default_max_payload_bytes(),
            admin_token: None,
            passcode: PasscodeParams::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the burnnote directory (~/.burnnote)
    pub burnnote_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the log directory
    pub logs_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the burnnote directory path (custom or default ~/.burnnote)
    pub fn burnnote_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new burnnote state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let burnnote_dir = Self::burnnote_dir(custom_path)?;

        if burnnote_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&burnnote_dir)?;

        let logs_path = burnnote_dir.join(LOGS_DIR_NAME);
        fs::create_dir_all(&logs_path)?;

        let config = config.unwrap_or_default();
        let config_path = burnnote_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        // Just touch the file, migrations run when the service connects
        let db_path = burnnote_dir.join(DB_FILE_NAME);
        fs::write(&db_path, "")?;

        Ok(Self {
            burnnote_dir,
            db_path,
            logs_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the burnnote directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let burnnote_dir = Self::burnnote_dir(custom_path)?;

        if !burnnote_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let db_path = burnnote_dir.join(DB_FILE_NAME);
        let logs_path = burnnote_dir.join(LOGS_DIR_NAME);
        let config_path = burnnote_dir.join(CONFIG_FILE_NAME);

        if !db_path.exists() {
            return Err(StateError::MissingFile(DB_FILE_NAME.to_string()));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            burnnote_dir,
            db_path,
            logs_path,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("burnnote directory not initialized. Run 'burnnote init' first")]
    NotInitialized,

    #[error("burnnote directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
