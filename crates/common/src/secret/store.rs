use std::fmt::{Debug, Display};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::record::{NewSecret, SecretRecord, SecretUpdate};
use crate::passcode::PasscodeHash;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretStoreError<T> {
    /// Failure inside the backing storage engine
    #[error("unhandled secret store error: {0}")]
    Provider(#[from] T),
    /// A persisted row could not be turned back into a record
    #[error("corrupt secret record {0}: {1}")]
    Corrupt(Uuid, String),
}

/// Persistence for secret records. Implementations hold no policy: they never
/// look at passcodes beyond the equality guard on [`SecretStore::consume`].
#[async_trait]
pub trait SecretStore: Send + Sync + std::fmt::Debug + Clone + 'static {
    type Error: Display + Debug + Send;

    /// Insert a new record and return it as stored
    async fn create(&self, secret: NewSecret)
        -> Result<SecretRecord, SecretStoreError<Self::Error>>;

    /// Fetch a record regardless of expiry
    async fn get(&self, id: Uuid) -> Result<Option<SecretRecord>, SecretStoreError<Self::Error>>;

    /// Remove a record
    ///
    /// # Returns
    /// * `Ok(true)` - The record existed and was removed
    /// * `Ok(false)` - Nothing to remove; deleting twice is not an error
    async fn delete(&self, id: Uuid) -> Result<bool, SecretStoreError<Self::Error>>;

    /// Apply an administrative edit, bumping `updated_at`
    ///
    /// # Returns
    /// * `Ok(None)` - No such record
    async fn update(
        &self,
        id: Uuid,
        update: SecretUpdate,
    ) -> Result<Option<SecretRecord>, SecretStoreError<Self::Error>>;

    /// Read a record for disclosure, deleting it in the same atomic step if it
    ///  is one-time.
    ///
    /// # Arguments
    /// * `id` - The secret to consume
    /// * `expected_passcode_hash` - The hash the caller verified against (or
    ///   `None` for an unprotected secret). The record is only handed out if its
    ///   stored hash is still exactly this value.
    /// * `now` - Records expiring at or before this instant are not returned
    ///
    /// Two concurrent calls for the same one-time record must never both
    ///  return `Some`.
    async fn consume(
        &self,
        id: Uuid,
        expected_passcode_hash: Option<&PasscodeHash>,
        now: OffsetDateTime,
    ) -> Result<Option<SecretRecord>, SecretStoreError<Self::Error>>;

    /// All records, newest first
    async fn list(&self) -> Result<Vec<SecretRecord>, SecretStoreError<Self::Error>>;

    /// Delete every record expired at `now`, returning how many were removed
    async fn purge_expired(&self, now: OffsetDateTime)
        -> Result<u64, SecretStoreError<Self::Error>>;
}
