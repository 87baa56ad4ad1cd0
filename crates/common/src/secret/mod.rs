mod memory;
mod record;
mod store;

pub use memory::{MemorySecretStore, MemorySecretStoreError};
pub use record::{NewSecret, SecretRecord, SecretUpdate};
pub use store::{SecretStore, SecretStoreError};
