use url::Url;

use common::prelude::{DisclosurePolicy, PasscodeError, PasscodeHasher, PolicyConfig};

use crate::database::{Database, DatabaseSetupError};
use crate::service_config::Config;

/// Main service state, cloned into every request handler
#[derive(Clone, Debug)]
pub struct State {
    database: Database,
    policy: DisclosurePolicy<Database>,
    base_url: Url,
    admin_token: Option<String>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Setup database
        let sqlite_database_url = match config.sqlite_path {
            Some(ref path) => {
                if !path.exists() {
                    return Err(StateSetupError::DatabasePathDoesNotExist);
                }
                Url::parse(&format!("sqlite://{}", path.display()))
                    .map_err(|_| StateSetupError::InvalidDatabaseUrl)
            }
            // otherwise just set up an in-memory database
            None => Url::parse("sqlite::memory:").map_err(|_| StateSetupError::InvalidDatabaseUrl),
        }?;
        tracing::info!("Database URL: {:?}", sqlite_database_url);
        let database = Database::connect(&sqlite_database_url).await?;

        // 2. Setup the disclosure policy over the database
        let hasher = PasscodeHasher::new(config.passcode)?;
        let policy = DisclosurePolicy::new(
            database.clone(),
            hasher,
            PolicyConfig {
                max_payload_bytes: config.max_payload_bytes,
            },
        );

        let base_url = config
            .base_url()
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or(StateSetupError::InvalidPublicUrl)?;

        let admin_token = config
            .admin_token
            .clone()
            .filter(|token| !token.is_empty());
        if admin_token.is_none() {
            tracing::info!("no admin token configured, admin routes disabled");
        }

        Ok(Self {
            database,
            policy,
            base_url,
            admin_token,
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn policy(&self) -> &DisclosurePolicy<Database> {
        &self.policy
    }

    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_deref()
    }

    /// The shareable link for a secret, appended to any path prefix of the base URL
    pub fn secret_url(&self, id: &uuid::Uuid) -> Url {
        let mut url = self.base_url.clone();
        // base_url is checked to be a base at setup, so this always succeeds
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("secrets")
                .push(&id.to_string());
        }
        url
    }
}

impl AsRef<Database> for State {
    fn as_ref(&self) -> &Database {
        self.database()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Database path does not exist")]
    DatabasePathDoesNotExist,
    #[error("Database setup error")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,
    #[error("Invalid public URL")]
    InvalidPublicUrl,
    #[error("Passcode hasher setup error: {0}")]
    Passcode(#[from] PasscodeError),
}
