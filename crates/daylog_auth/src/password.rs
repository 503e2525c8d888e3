//! Password key derivation.
//!
//! Passwords are turned into verifiable, non-reversible credentials with
//! PBKDF2-HMAC-SHA-512 over a per-account random salt. The iteration
//! count and output length are fixed; changing either invalidates every
//! stored hash.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha512;

/// Salt length in bytes (hex-encoded for storage).
pub const SALT_LEN: usize = 16;

/// PBKDF2 iteration count.
pub const ITERATIONS: u32 = 100_000;

/// Derived key length in bytes.
pub const HASH_LEN: usize = 64;

/// Generates a random salt, hex-encoded.
#[must_use]
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Derives the stored hash for a password and hex-encoded salt.
#[must_use]
pub fn derive_hash(password: &str, salt_hex: &str) -> String {
    let salt = hex::decode(salt_hex).unwrap_or_else(|_| salt_hex.as_bytes().to_vec());

    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), &salt, ITERATIONS, &mut out);
    hex::encode(out)
}

/// Recomputes the hash and compares it to the stored one.
#[must_use]
pub fn verify(password: &str, salt_hex: &str, stored_hash: &str) -> bool {
    derive_hash(password, salt_hex) == stored_hash
}
