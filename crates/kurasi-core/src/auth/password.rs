//! Salted, iterated password hashing.
//!
//! Stored form: `base64(salt || derived_key)` using PBKDF2-HMAC-SHA256 with
//! 100 000 iterations, a 16-byte random salt and a 32-byte key.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{KurasiError, Result};

pub const PBKDF2_ITERATIONS: u32 = 100_000;
pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Hashes `password` with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    hash_password_with_salt(password, &salt)
}

/// Hashes `password` with the given salt.
pub fn hash_password_with_salt(password: &str, salt: &[u8]) -> String {
    let key = derive_key(password, salt);
    let mut combined = Vec::with_capacity(salt.len() + KEY_LEN);
    combined.extend_from_slice(salt);
    combined.extend_from_slice(&key);
    STANDARD.encode(combined)
}

/// Checks `password` against a stored hash.
///
/// A malformed stored hash (bad base64, too short) verifies as `false`.
/// The final comparison runs in constant time.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(combined) = STANDARD.decode(stored_hash.trim()) else {
        return false;
    };
    if combined.len() <= SALT_LEN {
        return false;
    }
    let (salt, expected) = combined.split_at(SALT_LEN);
    let derived = derive_key(password, salt);
    bool::from(derived.as_slice().ct_eq(expected))
}

/// [`hash_password`] on a blocking worker thread.
pub async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| KurasiError::internal(format!("password hashing task failed: {}", e)))
}

/// [`verify_password`] on a blocking worker thread.
pub async fn verify_password_blocking(password: String, stored_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| KurasiError::internal(format!("password verification task failed: {}", e)))
}
