/**
 * The disclosure policy: decides per access whether a
 *  secret is handed out, needs a passcode, or is gone,
 *  and consumes one-time secrets atomically.
 */
pub mod disclosure;
/**
 * One-way passcode hashing and verification
 *  (Argon2id, PHC-encoded).
 */
pub mod passcode;
/**
 * Secret records and the storage contract they
 *  are persisted through, plus an in-memory store.
 */
pub mod secret;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::disclosure::{
        Disclosure, DisclosureError, DisclosurePolicy, PolicyConfig, SecretChanges, SubmitSecret,
    };
    pub use crate::passcode::{PasscodeError, PasscodeHash, PasscodeHasher, PasscodeParams};
    pub use crate::secret::{
        MemorySecretStore, NewSecret, SecretRecord, SecretStore, SecretStoreError, SecretUpdate,
    };
    pub use crate::version::{build_info, BuildInfo};
}
