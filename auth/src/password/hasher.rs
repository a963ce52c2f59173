use hmac::Hmac;
use hmac::Mac;
use pbkdf2::pbkdf2;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::PasswordError;

/// PBKDF2 iteration count. Fixed; changing it invalidates every stored hash.
const PBKDF2_ROUNDS: u32 = 100_000;

/// Length of the derived hash in bytes.
pub const HASH_LENGTH: usize = 32;

/// Length of the per-credential random salt in bytes.
pub const SALT_LENGTH: usize = 16;

/// Keyed secret hasher for passwords and one-time codes.
///
/// The per-credential salt is first run through HMAC-SHA256 keyed with a
/// server-held secret, and the resulting derived salt feeds PBKDF2. A leaked
/// database row (hash + salt) is therefore not enough to crack the secret
/// offline; the attacker also needs the server key.
pub struct SecretHasher {
    salt_mac: Hmac<Sha256>,
}

impl SecretHasher {
    /// Create a hasher bound to the server-side hashing key.
    ///
    /// # Errors
    /// * `MissingServerKey` - the configured key is empty
    /// * `InvalidServerKey` - the key cannot initialize the HMAC
    pub fn new(server_key: &str) -> Result<Self, PasswordError> {
        if server_key.is_empty() {
            return Err(PasswordError::MissingServerKey);
        }

        let salt_mac = Hmac::<Sha256>::new_from_slice(server_key.as_bytes())
            .map_err(|e| PasswordError::InvalidServerKey(e.to_string()))?;

        Ok(Self { salt_mac })
    }

    /// Derive the 32-byte hash of a secret under the given salt.
    ///
    /// Deterministic: identical `(secret, salt)` inputs always produce the
    /// same output under the same server key.
    pub fn hash(&self, secret: &str, salt: &[u8]) -> [u8; HASH_LENGTH] {
        let mut mac = self.salt_mac.clone();
        mac.update(salt);
        let derived_salt = mac.finalize().into_bytes();

        let mut output = [0u8; HASH_LENGTH];
        pbkdf2::<Hmac<Sha256>>(
            secret.as_bytes(),
            derived_salt.as_slice(),
            PBKDF2_ROUNDS,
            &mut output,
        );

        output
    }

    /// Recompute the hash of `secret` under `salt` and compare it to
    /// `expected` in constant time (full length, no early exit).
    pub fn verify(&self, secret: &str, salt: &[u8], expected: &[u8]) -> bool {
        let computed = self.hash(secret, salt);
        computed[..].ct_eq(expected).into()
    }
}

/// Generate a fresh random salt from the operating system CSPRNG.
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> SecretHasher {
        SecretHasher::new("test-server-key").expect("Failed to build hasher")
    }

    #[test]
    fn test_hash_is_deterministic_and_32_bytes() {
        let hasher = hasher();
        let salt = [7u8; SALT_LENGTH];

        let first = hasher.hash("secret", &salt);
        let second = hasher.hash("secret", &salt);

        assert_eq!(first.len(), HASH_LENGTH);
        assert_eq!(first, second);
    }

    #[test]
    fn test_distinct_salts_produce_distinct_hashes() {
        let hasher = hasher();

        let one = hasher.hash("secret", &[1u8; SALT_LENGTH]);
        let two = hasher.hash("secret", &[2u8; SALT_LENGTH]);

        assert_ne!(one, two);
    }

    #[test]
    fn test_distinct_secrets_produce_distinct_hashes() {
        let hasher = hasher();
        let salt = [9u8; SALT_LENGTH];

        let one = hasher.hash("secret-a", &salt);
        let two = hasher.hash("secret-b", &salt);

        assert_ne!(one, two);
    }

    #[test]
    fn test_hash_depends_on_server_key() {
        let salt = [3u8; SALT_LENGTH];

        let one = SecretHasher::new("key-one").unwrap().hash("secret", &salt);
        let two = SecretHasher::new("key-two").unwrap().hash("secret", &salt);

        assert_ne!(one, two);
    }

    #[test]
    fn test_verify_round_trip() {
        let hasher = hasher();
        let salt = generate_salt();
        let hash = hasher.hash("correct horse", &salt);

        assert!(hasher.verify("correct horse", &salt, &hash));
        assert!(!hasher.verify("correct horsf", &salt, &hash));
    }

    #[test]
    fn test_verify_rejects_truncated_hash() {
        let hasher = hasher();
        let salt = generate_salt();
        let hash = hasher.hash("secret", &salt);

        assert!(!hasher.verify("secret", &salt, &hash[..16]));
    }

    #[test]
    fn test_empty_server_key_is_rejected() {
        assert!(matches!(
            SecretHasher::new(""),
            Err(PasswordError::MissingServerKey)
        ));
    }
}
