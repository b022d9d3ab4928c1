//! # Key Derivation
//!
//! PBKDF2-HMAC-SHA256 with a fixed 100 000 rounds, producing a 32-byte
//! AES-256 key from the user's secret and a 16-byte salt.
//!
//! The round count is part of the artifact format: an image encoded with one
//! count can only be decoded with the same count, so it is a constant rather
//! than a configuration value.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;
/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;
/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

pub type Salt = [u8; SALT_LEN];

/// A derived AES key. Wiped from memory on drop.
pub type DerivedKey = Zeroizing<[u8; KEY_LEN]>;

/// Generate a fresh random salt from the operating system RNG.
pub fn generate_salt() -> Salt {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive an encryption key from `secret`.
///
/// When `salt` is `None` a new random salt is generated (encode path); the
/// decode path passes the salt recovered from the image so the same key is
/// reproduced.
///
/// # Returns
/// The derived key together with the salt that was used.
///
/// # Example
/// ```ignore
/// let (key, salt) = derive_key("correct horse battery", None);
/// let (again, _) = derive_key("correct horse battery", Some(salt));
/// assert_eq!(*key, *again);
/// ```
pub fn derive_key(secret: &str, salt: Option<Salt>) -> (DerivedKey, Salt) {
    let salt = salt.unwrap_or_else(generate_salt);
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut key[..]);
    (key, salt)
}
