mod secret;

pub use secret::SecretRow;
