//! Passcode hashing using Argon2id.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=...`), which carry
//! their own salt and cost parameters. Hashing the same passcode twice gives
//! two different strings; [`PasscodeHasher::verify`] is the only valid way to
//! compare a candidate against a stored hash.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of the random salt in bytes.
const SALT_LEN: usize = 16;

/// Minimum memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

#[derive(Debug, thiserror::Error)]
pub enum PasscodeError {
    #[error("invalid passcode hashing parameters: {0}")]
    InvalidParams(String),
    #[error("passcode hashing failed: {0}")]
    Hashing(String),
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasscodeParams {
    /// Memory cost in KiB (default: 19 456 = 19 MB).
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of iterations (default: 2).
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Parallelism lanes (default: 1).
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    19_456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

impl Default for PasscodeParams {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl PasscodeParams {
    /// The cheapest parameters accepted. Meant for tests.
    pub fn minimum() -> Self {
        Self {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// A stored passcode hash (PHC string).
#[derive(Clone, PartialEq, Eq)]
pub struct PasscodeHash(String);

impl PasscodeHash {
    /// Wrap a hash previously produced by [`PasscodeHasher::hash`] and read
    ///  back from storage. Never use this on client input.
    pub fn from_stored(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasscodeHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasscodeHash(<redacted>)")
    }
}

/// Hashes and verifies passcodes with a fixed set of cost parameters.
#[derive(Debug, Clone)]
pub struct PasscodeHasher {
    params: Params,
}

impl PasscodeHasher {
    /// Build a hasher, rejecting parameters below the safe minimum.
    pub fn new(passcode_params: PasscodeParams) -> Result<Self, PasscodeError> {
        if passcode_params.memory_kib < MIN_MEMORY_KIB {
            return Err(PasscodeError::InvalidParams(format!(
                "memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                passcode_params.memory_kib
            )));
        }
        if passcode_params.iterations < 1 {
            return Err(PasscodeError::InvalidParams(
                "iterations must be at least 1".into(),
            ));
        }
        if passcode_params.parallelism < 1 {
            return Err(PasscodeError::InvalidParams(
                "parallelism must be at least 1".into(),
            ));
        }

        let params = Params::new(
            passcode_params.memory_kib,
            passcode_params.iterations,
            passcode_params.parallelism,
            None,
        )
        .map_err(|e| PasscodeError::InvalidParams(e.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext passcode with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<PasscodeHash, PasscodeError> {
        let mut salt_bytes = [0u8; SALT_LEN];
        rand::rng().fill(&mut salt_bytes);
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| PasscodeError::Hashing(e.to_string()))?;

        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasscodeError::Hashing(e.to_string()))?;

        Ok(PasscodeHash(hash.to_string()))
    }

    /// Check a candidate passcode against a stored hash.
    ///
    /// Returns `false` on mismatch and on a stored hash that cannot be parsed;
    ///  the comparison itself is constant-time inside argon2.
    pub fn verify(&self, plaintext: &str, hash: &PasscodeHash) -> bool {
        let parsed = match PasswordHash::new(hash.as_str()) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "stored passcode hash is malformed");
                return false;
            }
        };

        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasscodeHasher {
        PasscodeHasher::new(PasscodeParams::minimum()).unwrap()
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = hasher();
        let first = hasher.hash("1234").unwrap();
        let second = hasher.hash("1234").unwrap();

        assert_ne!(first, second);
        assert!(first.as_str().starts_with("$argon2id$"));
        assert!(!first.as_str().contains("1234"));
    }

    #[test]
    fn test_verify() {
        let hasher = hasher();
        let hash = hasher.hash("1234").unwrap();

        assert!(hasher.verify("1234", &hash));
        assert!(!hasher.verify("0000", &hash));
        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn test_verify_malformed_hash_is_false() {
        let hasher = hasher();
        assert!(!hasher.verify("1234", &PasscodeHash::from_stored("1234")));
        assert!(!hasher.verify("1234", &PasscodeHash::from_stored("")));
    }

    #[test]
    fn test_rejects_weak_params() {
        let weak = PasscodeParams {
            memory_kib: 1024,
            ..PasscodeParams::default()
        };
        assert!(matches!(
            PasscodeHasher::new(weak),
            Err(PasscodeError::InvalidParams(_))
        ));

        let no_iterations = PasscodeParams {
            iterations: 0,
            ..PasscodeParams::default()
        };
        assert!(PasscodeHasher::new(no_iterations).is_err());
    }

    #[test]
    fn test_debug_is_redacted() {
        let hash = hasher().hash("1234").unwrap();
        assert_eq!(format!("{:?}", hash), "PasscodeHash(<redacted>)");
    }

    #[test]
    fn test_params_fill_missing_fields_with_defaults() {
        let params: PasscodeParams = serde_json::from_str(r#"{"memory_kib": 65536}"#).unwrap();
        assert_eq!(params.memory_kib, 65_536);
        assert_eq!(params.iterations, PasscodeParams::default().iterations);
        assert_eq!(params.parallelism, PasscodeParams::default().parallelism);
    }
}
