use rand::rngs::OsRng;
use rand::RngCore;

/// Produces numeric one-time codes.
///
/// Codes are six decimal digits, zero-padded: a cryptographically secure
/// `u32` reduced modulo 1 000 000. Leading zeros are significant, so
/// "004821" is a valid code distinct from "4821". The validity window is
/// applied by the caller when the challenge is stored.
pub struct OtpGenerator;

impl OtpGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a fresh six-digit code.
    pub fn generate(&self) -> String {
        let value = OsRng.next_u32() % 1_000_000;

        format!("{value:06}")
    }
}

impl Default for OtpGenerator {
    fn default() -> Self {
        Self::new()
    }
}
