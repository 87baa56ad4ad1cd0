use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use common::passcode::PasscodeHash;
use common::secret::{NewSecret, SecretRecord, SecretStore, SecretStoreError, SecretUpdate};

use crate::database::types::{to_millis, DBool, DUuid};
use crate::database::{Database, SecretRow};

fn rows_into_records(
    rows: Vec<SecretRow>,
) -> Result<Vec<SecretRecord>, SecretStoreError<sqlx::Error>> {
    rows.into_iter().map(SecretRow::into_record).collect()
}

#[async_trait]
impl SecretStore for Database {
    type Error = sqlx::Error;

    async fn create(
        &self,
        secret: NewSecret,
    ) -> Result<SecretRecord, SecretStoreError<Self::Error>> {
        let secret_id = DUuid::new();
        let now = to_millis(OffsetDateTime::now_utc());
        let passcode_hash = secret.passcode_hash.as_ref().map(PasscodeHash::as_str);
        let one_time = DBool::from(secret.one_time);
        let expires_at = secret.expires_at.map(to_millis);

        let row = sqlx::query_as::<_, SecretRow>(
            r#"
            INSERT INTO secrets (
                secret_id, payload, passcode_hash, one_time,
                expires_at, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING
                secret_id, payload, passcode_hash, one_time,
                expires_at, created_at, updated_at
            "#,
        )
        .bind(secret_id)
        .bind(&secret.payload)
        .bind(passcode_hash)
        .bind(one_time)
        .bind(expires_at)
        .bind(now)
        .fetch_one(&**self)
        .await?;

        row.into_record()
    }

    async fn get(&self, id: Uuid) -> Result<Option<SecretRecord>, SecretStoreError<Self::Error>> {
        let row = sqlx::query_as::<_, SecretRow>(
            r#"
            SELECT
                secret_id, payload, passcode_hash, one_time,
                expires_at, created_at, updated_at
            FROM secrets
            WHERE secret_id = ?1
            "#,
        )
        .bind(DUuid::from(id))
        .fetch_optional(&**self)
        .await?;

        row.map(SecretRow::into_record).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, SecretStoreError<Self::Error>> {
        let result = sqlx::query("DELETE FROM secrets WHERE secret_id = ?1")
            .bind(DUuid::from(id))
            .execute(&**self)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update(
        &self,
        id: Uuid,
        update: SecretUpdate,
    ) -> Result<Option<SecretRecord>, SecretStoreError<Self::Error>> {
        let mut tx = self.begin().await?;

        let existing = sqlx::query_as::<_, SecretRow>(
            r#"
            SELECT
                secret_id, payload, passcode_hash, one_time,
                expires_at, created_at, updated_at
            FROM secrets
            WHERE secret_id = ?1
            "#,
        )
        .bind(DUuid::from(id))
        .fetch_optional(&mut *tx)
        .await?;

        let mut record = match existing {
            Some(row) => row.into_record()?,
            None => return Ok(None),
        };
        record.apply(update, OffsetDateTime::now_utc());

        sqlx::query(
            r#"
            UPDATE secrets
            SET payload = ?1, passcode_hash = ?2, one_time = ?3,
                expires_at = ?4, updated_at = ?5
            WHERE secret_id = ?6
            "#,
        )
        .bind(&record.payload)
        .bind(record.passcode_hash.as_ref().map(PasscodeHash::as_str))
        .bind(DBool::from(record.one_time))
        .bind(record.expires_at.map(to_millis))
        .bind(to_millis(record.updated_at))
        .bind(DUuid::from(id))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(record))
    }

    async fn consume(
        &self,
        id: Uuid,
        expected_passcode_hash: Option<&PasscodeHash>,
        now: OffsetDateTime,
    ) -> Result<Option<SecretRecord>, SecretStoreError<Self::Error>> {
        let secret_id = DUuid::from(id);
        let expected_passcode_hash = expected_passcode_hash.map(PasscodeHash::as_str);
        let now = to_millis(now);

        // One-time secrets are only ever handed out by this statement; SQLite
        //  runs it atomically so a second caller finds nothing to delete.
        let consumed = sqlx::query_as::<_, SecretRow>(
            r#"
            DELETE FROM secrets
            WHERE secret_id = ?1
              AND one_time = 1
              AND passcode_hash IS ?2
              AND (expires_at IS NULL OR expires_at > ?3)
            RETURNING
                secret_id, payload, passcode_hash, one_time,
                expires_at, created_at, updated_at
            "#,
        )
        .bind(secret_id)
        .bind(expected_passcode_hash)
        .bind(now)
        .fetch_optional(&**self)
        .await?;

        if let Some(row) = consumed {
            return row.into_record().map(Some);
        }

        let persisted = sqlx::query_as::<_, SecretRow>(
            r#"
            SELECT
                secret_id, payload, passcode_hash, one_time,
                expires_at, created_at, updated_at
            FROM secrets
            WHERE secret_id = ?1
              AND one_time = 0
              AND passcode_hash IS ?2
              AND (expires_at IS NULL OR expires_at > ?3)
            "#,
        )
        .bind(secret_id)
        .bind(expected_passcode_hash)
        .bind(now)
        .fetch_optional(&**self)
        .await?;

        persisted.map(SecretRow::into_record).transpose()
    }

    async fn list(&self) -> Result<Vec<SecretRecord>, SecretStoreError<Self::Error>> {
        let rows = sqlx::query_as::<_, SecretRow>(
            r#"
            SELECT
                secret_id, payload, passcode_hash, one_time,
                expires_at, created_at, updated_at
            FROM secrets
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&**self)
        .await?;

        rows_into_records(rows)
    }

    async fn purge_expired(
        &self,
        now: OffsetDateTime,
    ) -> Result<u64, SecretStoreError<Self::Error>> {
        let result = sqlx::query(
            r#"
            DELETE FROM secrets
            WHERE expires_at IS NOT NULL AND expires_at <= ?1
            "#,
        )
        .bind(to_millis(now))
        .execute(&**self)
        .await?;

        Ok(result.rows_affected())
    }
}
