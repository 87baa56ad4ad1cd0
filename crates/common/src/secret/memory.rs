use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::record::{NewSecret, SecretRecord, SecretUpdate};
use super::store::{SecretStore, SecretStoreError};
use crate::passcode::PasscodeHash;

/// In-memory secret store. Every mutation takes the write lock, so
/// `consume` is trivially atomic.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    inner: Arc<RwLock<HashMap<Uuid, SecretRecord>>>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemorySecretStoreError {
    #[error("memory store error: {0}")]
    Internal(String),
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> Result<
        RwLockReadGuard<'_, HashMap<Uuid, SecretRecord>>,
        SecretStoreError<MemorySecretStoreError>,
    > {
        self.inner.read().map_err(|e| {
            SecretStoreError::Provider(MemorySecretStoreError::Internal(format!(
                "failed to acquire read lock: {}",
                e
            )))
        })
    }

    fn write(
        &self,
    ) -> Result<
        RwLockWriteGuard<'_, HashMap<Uuid, SecretRecord>>,
        SecretStoreError<MemorySecretStoreError>,
    > {
        self.inner.write().map_err(|e| {
            SecretStoreError::Provider(MemorySecretStoreError::Internal(format!(
                "failed to acquire write lock: {}",
                e
            )))
        })
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    type Error = MemorySecretStoreError;

    async fn create(
        &self,
        secret: NewSecret,
    ) -> Result<SecretRecord, SecretStoreError<Self::Error>> {
        let now = OffsetDateTime::now_utc();
        let record = SecretRecord {
            id: Uuid::new_v4(),
            payload: secret.payload,
            passcode_hash: secret.passcode_hash,
            one_time: secret.one_time,
            expires_at: secret.expires_at,
            created_at: now,
            updated_at: now,
        };

        self.write()?.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<SecretRecord>, SecretStoreError<Self::Error>> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, SecretStoreError<Self::Error>> {
        Ok(self.write()?.remove(&id).is_some())
    }

    async fn update(
        &self,
        id: Uuid,
        update: SecretUpdate,
    ) -> Result<Option<SecretRecord>, SecretStoreError<Self::Error>> {
        let mut inner = self.write()?;
        let Some(record) = inner.get_mut(&id) else {
            return Ok(None);
        };

        record.apply(update, OffsetDateTime::now_utc());
        Ok(Some(record.clone()))
    }

    async fn consume(
        &self,
        id: Uuid,
        expected_passcode_hash: Option<&PasscodeHash>,
        now: OffsetDateTime,
    ) -> Result<Option<SecretRecord>, SecretStoreError<Self::Error>> {
        let mut inner = self.write()?;

        let eligible = match inner.get(&id) {
            Some(record) => {
                !record.is_expired(now) && record.passcode_hash.as_ref() == expected_passcode_hash
            }
            None => false,
        };
        if !eligible {
            return Ok(None);
        }

        let one_time = inner.get(&id).is_some_and(|record| record.one_time);
        if one_time {
            Ok(inner.remove(&id))
        } else {
            Ok(inner.get(&id).cloned())
        }
    }

    async fn list(&self) -> Result<Vec<SecretRecord>, SecretStoreError<Self::Error>> {
        let mut records: Vec<SecretRecord> = self.read()?.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn purge_expired(
        &self,
        now: OffsetDateTime,
    ) -> Result<u64, SecretStoreError<Self::Error>> {
        let mut inner = self.write()?;
        let before = inner.len();
        inner.retain(|_, record| !record.is_expired(now));
        Ok((before - inner.len()) as u64)
    }
}
