use sqlx::FromRow;
use uuid::Uuid;

use common::passcode::PasscodeHash;
use common::secret::{SecretRecord, SecretStoreError};

use crate::database::types::{from_millis, DBool, DUuid};

/// A row of the `secrets` table
#[derive(Debug, Clone, FromRow)]
pub struct SecretRow {
    pub secret_id: DUuid,
    pub payload: String,
    pub passcode_hash: Option<String>,
    pub one_time: DBool,
    pub expires_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl SecretRow {
    pub fn into_record(self) -> Result<SecretRecord, SecretStoreError<sqlx::Error>> {
        let id: Uuid = self.secret_id.into();
        let corrupt = |e: time::error::ComponentRange| SecretStoreError::Corrupt(id, e.to_string());

        Ok(SecretRecord {
            id,
            payload: self.payload,
            passcode_hash: self.passcode_hash.map(PasscodeHash::from_stored),
            one_time: *self.one_time,
            expires_at: self.expires_at.map(from_millis).transpose().map_err(corrupt)?,
            created_at: from_millis(self.created_at).map_err(corrupt)?,
            updated_at: from_millis(self.updated_at).map_err(corrupt)?,
        })
    }
}
