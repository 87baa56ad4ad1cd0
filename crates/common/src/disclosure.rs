//! Disclosure policy for stored secrets.
//!
//! Every access goes through one of three paths:
//!
//! - [`DisclosurePolicy::read`] hands out unprotected secrets and answers
//!   [`DisclosureError::PasscodeRequired`] for protected ones.
//! - [`DisclosurePolicy::verify`] checks a passcode and hands out the secret
//!   on a match. A mismatch never consumes anything.
//! - [`DisclosurePolicy::mark_viewed`] consumes a one-time secret without
//!   disclosing it.
//!
//! Handing out a one-time secret and deleting it happen in one store call
//! ([`SecretStore::consume`]), so two racing readers cannot both see the
//! payload. Expiry is checked lazily on every access;
//! [`DisclosurePolicy::sweep_expired`] only reclaims storage.

use std::fmt::Display;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::passcode::{PasscodeError, PasscodeHash, PasscodeHasher};
use crate::secret::{NewSecret, SecretRecord, SecretStore, SecretStoreError, SecretUpdate};

/// Default upper bound on payload size (64 KiB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum DisclosureError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("secret not found")]
    NotFound,
    #[error("passcode required")]
    PasscodeRequired,
    #[error("invalid passcode")]
    InvalidPasscode,
    #[error("secret is not passcode protected")]
    NoPasscode,
    #[error("passcode error: {0}")]
    Passcode(#[from] PasscodeError),
    #[error("storage error: {0}")]
    Storage(String),
}

impl<E: Display> From<SecretStoreError<E>> for DisclosureError {
    fn from(e: SecretStoreError<E>) -> Self {
        DisclosureError::Storage(e.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PolicyConfig {
    pub max_payload_bytes: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

/// A request to store a new secret. The passcode is plaintext here and is
/// hashed before it reaches the store.
#[derive(Clone)]
pub struct SubmitSecret {
    pub payload: String,
    pub passcode: Option<String>,
    pub one_time: bool,
    pub expires_at: Option<OffsetDateTime>,
}

/// An administrative edit. A new passcode is always re-hashed.
#[derive(Clone, Default)]
pub struct SecretChanges {
    pub payload: Option<String>,
    pub passcode: Option<String>,
    pub clear_passcode: bool,
    pub one_time: Option<bool>,
    pub expires_at: Option<Option<OffsetDateTime>>,
}

/// A successfully disclosed secret
#[derive(Clone, PartialEq, Eq)]
pub struct Disclosure {
    pub id: Uuid,
    pub payload: String,
    pub one_time: bool,
    pub expires_at: Option<OffsetDateTime>,
    /// Whether this disclosure destroyed the record
    pub consumed: bool,
}

impl std::fmt::Debug for Disclosure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disclosure")
            .field("id", &self.id)
            .field("payload", &"<redacted>")
            .field("one_time", &self.one_time)
            .field("expires_at", &self.expires_at)
            .field("consumed", &self.consumed)
            .finish()
    }
}

impl From<SecretRecord> for Disclosure {
    fn from(record: SecretRecord) -> Self {
        Self {
            id: record.id,
            payload: record.payload,
            one_time: record.one_time,
            expires_at: record.expires_at,
            consumed: record.one_time,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisclosurePolicy<S> {
    store: S,
    hasher: PasscodeHasher,
    config: PolicyConfig,
}

impl<S: SecretStore> DisclosurePolicy<S> {
    pub fn new(store: S, hasher: PasscodeHasher, config: PolicyConfig) -> Self {
        Self {
            store,
            hasher,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn validate_payload(&self, payload: &str) -> Result<(), DisclosureError> {
        if payload.is_empty() {
            return Err(DisclosureError::Validation(
                "secret must not be empty".into(),
            ));
        }
        if payload.len() > self.config.max_payload_bytes {
            return Err(DisclosureError::Validation(format!(
                "secret exceeds {} bytes",
                self.config.max_payload_bytes
            )));
        }
        Ok(())
    }

    /// Argon2 is CPU bound, so hashing runs on the blocking pool instead of
    ///  an async worker
    async fn hash_passcode(&self, passcode: &str) -> Result<PasscodeHash, DisclosureError> {
        let hasher = self.hasher.clone();
        let passcode = passcode.to_owned();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&passcode))
            .await
            .map_err(|e| PasscodeError::Hashing(e.to_string()))??;
        Ok(hash)
    }

    async fn verify_passcode(
        &self,
        passcode: &str,
        hash: &PasscodeHash,
    ) -> Result<bool, DisclosureError> {
        let hasher = self.hasher.clone();
        let passcode = passcode.to_owned();
        let hash = hash.clone();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&passcode, &hash))
            .await
            .map_err(|e| PasscodeError::Hashing(e.to_string()))?;
        Ok(verified)
    }

    /// Look up a record that is still accessible at `now`
    async fn live_record(
        &self,
        id: Uuid,
        now: OffsetDateTime,
    ) -> Result<SecretRecord, DisclosureError> {
        self.store
            .get(id)
            .await?
            .filter(|record| !record.is_expired(now))
            .ok_or(DisclosureError::NotFound)
    }

    async fn disclose(
        &self,
        id: Uuid,
        verified_hash: Option<&PasscodeHash>,
        now: OffsetDateTime,
    ) -> Result<Disclosure, DisclosureError> {
        // Losing a race with another reader (or an expiry/passcode change
        //  between lookup and consume) surfaces as NotFound
        let record = self
            .store
            .consume(id, verified_hash, now)
            .await?
            .ok_or(DisclosureError::NotFound)?;

        let disclosure = Disclosure::from(record);
        tracing::info!(
            secret_id = %id,
            consumed = disclosure.consumed,
            "secret disclosed"
        );
        Ok(disclosure)
    }

    /// Store a new secret. An empty passcode is treated as no passcode.
    pub async fn submit(&self, request: SubmitSecret) -> Result<SecretRecord, DisclosureError> {
        self.validate_payload(&request.payload)?;

        let passcode_hash = match request.passcode.as_deref() {
            Some(passcode) if !passcode.is_empty() => Some(self.hash_passcode(passcode).await?),
            _ => None,
        };

        let record = self
            .store
            .create(NewSecret {
                payload: request.payload,
                passcode_hash,
                one_time: request.one_time,
                expires_at: request.expires_at,
            })
            .await?;

        tracing::info!(
            secret_id = %record.id,
            one_time = record.one_time,
            protected = record.is_protected(),
            expires_at = ?record.expires_at,
            "secret created"
        );
        Ok(record)
    }

    /// Read a secret without a passcode
    pub async fn read(&self, id: Uuid) -> Result<Disclosure, DisclosureError> {
        let now = OffsetDateTime::now_utc();
        let record = self.live_record(id, now).await?;

        if record.is_protected() {
            tracing::debug!(secret_id = %id, "read of protected secret without passcode");
            return Err(DisclosureError::PasscodeRequired);
        }

        self.disclose(id, None, now).await
    }

    /// Read a protected secret by presenting its passcode
    pub async fn verify(&self, id: Uuid, passcode: &str) -> Result<Disclosure, DisclosureError> {
        let now = OffsetDateTime::now_utc();
        let record = self.live_record(id, now).await?;

        let hash = record.passcode_hash.ok_or(DisclosureError::NoPasscode)?;
        if !self.verify_passcode(passcode, &hash).await? {
            tracing::info!(secret_id = %id, "passcode verification failed");
            return Err(DisclosureError::InvalidPasscode);
        }

        self.disclose(id, Some(&hash), now).await
    }

    /// Consume a one-time secret without disclosing it. A no-op for
    ///  multi-read secrets.
    pub async fn mark_viewed(&self, id: Uuid) -> Result<(), DisclosureError> {
        let now = OffsetDateTime::now_utc();
        let record = self.live_record(id, now).await?;

        if record.one_time && self.store.delete(id).await? {
            tracing::info!(secret_id = %id, "secret marked as viewed");
        }
        Ok(())
    }

    /// Edit a secret in place
    pub async fn update(
        &self,
        id: Uuid,
        changes: SecretChanges,
    ) -> Result<SecretRecord, DisclosureError> {
        if changes.clear_passcode && changes.passcode.is_some() {
            return Err(DisclosureError::Validation(
                "cannot set and clear the passcode at once".into(),
            ));
        }
        if let Some(payload) = changes.payload.as_deref() {
            self.validate_payload(payload)?;
        }

        let passcode_hash = match changes.passcode.as_deref() {
            Some("") => {
                return Err(DisclosureError::Validation(
                    "passcode must not be empty".into(),
                ))
            }
            Some(passcode) => Some(Some(self.hash_passcode(passcode).await?)),
            None if changes.clear_passcode => Some(None),
            None => None,
        };

        let update = SecretUpdate {
            payload: changes.payload,
            passcode_hash,
            one_time: changes.one_time,
            expires_at: changes.expires_at,
        };
        if update.is_empty() {
            return Err(DisclosureError::Validation("no changes requested".into()));
        }

        let record = self
            .store
            .update(id, update)
            .await?
            .ok_or(DisclosureError::NotFound)?;

        tracing::info!(secret_id = %id, "secret updated");
        Ok(record)
    }

    /// Destroy a secret outright
    pub async fn delete(&self, id: Uuid) -> Result<(), DisclosureError> {
        if !self.store.delete(id).await? {
            return Err(DisclosureError::NotFound);
        }
        tracing::info!(secret_id = %id, "secret deleted");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<SecretRecord>, DisclosureError> {
        Ok(self.store.list().await?)
    }

    /// Physically remove expired records
    pub async fn sweep_expired(&self) -> Result<u64, DisclosureError> {
        let purged = self
            .store
            .purge_expired(OffsetDateTime::now_utc())
            .await?;
        if purged > 0 {
            tracing::info!(purged, "expired secrets swept");
        }
        Ok(purged)
    }
}
