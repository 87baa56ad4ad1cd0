use time::OffsetDateTime;
use uuid::Uuid;

use crate::passcode::PasscodeHash;

/// A stored secret. `Debug` never prints the payload.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub id: Uuid,
    pub payload: String,
    pub passcode_hash: Option<PasscodeHash>,
    pub one_time: bool,
    pub expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl SecretRecord {
    /// A record is expired from its `expires_at` instant onwards.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    pub fn is_protected(&self) -> bool {
        self.passcode_hash.is_some()
    }

    /// Apply an administrative edit in place
    pub fn apply(&mut self, update: SecretUpdate, now: OffsetDateTime) {
        if let Some(payload) = update.payload {
            self.payload = payload;
        }
        if let Some(passcode_hash) = update.passcode_hash {
            self.passcode_hash = passcode_hash;
        }
        if let Some(one_time) = update.one_time {
            self.one_time = one_time;
        }
        if let Some(expires_at) = update.expires_at {
            self.expires_at = expires_at;
        }
        self.updated_at = now;
    }
}

impl std::fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRecord")
            .field("id", &self.id)
            .field("payload", &"<redacted>")
            .field("protected", &self.is_protected())
            .field("one_time", &self.one_time)
            .field("expires_at", &self.expires_at)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Fields supplied when inserting a new secret. The passcode, if any, is
/// already hashed by the time it reaches a store.
#[derive(Clone)]
pub struct NewSecret {
    pub payload: String,
    pub passcode_hash: Option<PasscodeHash>,
    pub one_time: bool,
    pub expires_at: Option<OffsetDateTime>,
}

impl std::fmt::Debug for NewSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewSecret")
            .field("payload_len", &self.payload.len())
            .field("protected", &self.passcode_hash.is_some())
            .field("one_time", &self.one_time)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// A partial edit. `None` leaves a field untouched; the nested options on
/// `passcode_hash` and `expires_at` allow clearing them.
#[derive(Clone, Default)]
pub struct SecretUpdate {
    pub payload: Option<String>,
    pub passcode_hash: Option<Option<PasscodeHash>>,
    pub one_time: Option<bool>,
    pub expires_at: Option<Option<OffsetDateTime>>,
}

impl SecretUpdate {
    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
            && self.passcode_hash.is_none()
            && self.one_time.is_none()
            && self.expires_at.is_none()
    }
}

impl std::fmt::Debug for SecretUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretUpdate")
            .field("payload", &self.payload.as_ref().map(|_| "<redacted>"))
            .field(
                "passcode",
                &self.passcode_hash.as_ref().map(|hash| hash.is_some()),
            )
            .field("one_time", &self.one_time)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;

    fn record(expires_at: Option<OffsetDateTime>) -> SecretRecord {
        let now = OffsetDateTime::now_utc();
        SecretRecord {
            id: Uuid::new_v4(),
            payload: "hunter2".to_string(),
            passcode_hash: None,
            one_time: true,
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let now = OffsetDateTime::now_utc();
        assert!(!record(None).is_expired(now));
        assert!(!record(Some(now + Duration::seconds(1))).is_expired(now));
        assert!(record(Some(now)).is_expired(now));
        assert!(record(Some(now - Duration::seconds(1))).is_expired(now));
    }

    #[test]
    fn test_debug_redacts_payload() {
        let rendered = format!("{:?}", record(None));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_apply_clears_expiry_and_bumps_updated_at() {
        let now = OffsetDateTime::now_utc();
        let mut secret = record(Some(now));
        let later = now + Duration::minutes(5);

        secret.apply(
            SecretUpdate {
                expires_at: Some(None),
                one_time: Some(false),
                ..Default::default()
            },
            later,
        );

        assert_eq!(secret.expires_at, None);
        assert!(!secret.one_time);
        assert_eq!(secret.payload, "hunter2");
        assert_eq!(secret.updated_at, later);
    }
}
