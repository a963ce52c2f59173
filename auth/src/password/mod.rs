pub mod errors;
pub mod hasher;

pub use errors::PasswordError;
pub use hasher::generate_salt;
pub use hasher::SecretHasher;
