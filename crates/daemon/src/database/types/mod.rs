mod dbool;
mod duuid;
mod millis;

pub use dbool::DBool;
pub use duuid::DUuid;
pub use millis::{from_millis, to_millis};
