//! # Crypto Engine
//!
//! Password-based key derivation and authenticated encryption.
//!
//! ## Modules
//!
//! - [`kdf`]: PBKDF2-HMAC-SHA256 key derivation with a per-encode random salt
//! - [`aead`]: AES-256-GCM with a per-encryption random nonce and detached tag
//!
//! Salt and nonce are separate values generated independently on every
//! encode; neither is ever derived from the other or from the clock.

pub mod aead;
pub mod kdf;

pub use aead::{decrypt, encrypt, Sealed, NONCE_LEN, TAG_LEN};
pub use kdf::{derive_key, generate_salt, DerivedKey, Salt, KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN};

/// The public parameters that, together with the right secret, open an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoParams {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub auth_tag: [u8; TAG_LEN],
}
