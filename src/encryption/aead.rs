//! # Authenticated Encryption
//!
//! AES-256-GCM with a detached 16-byte tag. The tag travels separately from
//! the ciphertext (it is stored as container metadata while the ciphertext
//! goes into the pixels), so the in-place detached API is used rather than
//! the combined `ciphertext || tag` form.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce, Tag};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::encryption::kdf::KEY_LEN;
use crate::error::{Result, StegoError};

/// GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Output of [`encrypt`]: ciphertext plus the public values needed to open it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    pub auth_tag: [u8; TAG_LEN],
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
///
/// # Errors
/// - [`StegoError::Encryption`] if the cipher rejects the input (only
///   possible for plaintexts beyond the GCM length limit)
pub fn encrypt(plaintext: &[u8], key: &[u8; KEY_LEN]) -> Result<Sealed> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
        .map_err(|_| StegoError::Encryption)?;

    let mut auth_tag = [0u8; TAG_LEN];
    auth_tag.copy_from_slice(tag.as_slice());

    Ok(Sealed {
        ciphertext: buffer,
        nonce,
        auth_tag,
    })
}

/// Decrypt and authenticate `ciphertext`.
///
/// The tag comparison inside `aes-gcm` is constant time. On failure the
/// decrypted buffer is discarded, so no unauthenticated plaintext escapes.
///
/// # Errors
/// - [`StegoError::Authentication`] for a wrong key, a modified ciphertext or
///   a modified tag. The three cases are deliberately indistinguishable.
pub fn decrypt(
    ciphertext: &[u8],
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    auth_tag: &[u8; TAG_LEN],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            b"",
            &mut buffer,
            Tag::from_slice(auth_tag),
        )
        .map_err(|_| StegoError::Authentication)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_LEN] = [0x11; KEY_LEN];

    #[test]
    fn test_encrypt_decrypt() {
        let sealed = encrypt(b"Hello, steganography!", &KEY).unwrap();
        assert_eq!(sealed.ciphertext.len(), 21);
        let plain = decrypt(&sealed.ciphertext, &KEY, &sealed.nonce, &sealed.auth_tag).unwrap();
        assert_eq!(plain, b"Hello, steganography!");
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = encrypt(b"secret message", &KEY).unwrap();
        let other = [0x22; KEY_LEN];
        let result = decrypt(&sealed.ciphertext, &other, &sealed.nonce, &sealed.auth_tag);
        assert!(matches!(result, Err(StegoError::Authentication)));
    }

    #[test]
    fn test_tampered_ciphertext_and_tag_fail() {
        let sealed = encrypt(b"secret message", &KEY).unwrap();

        let mut ct = sealed.ciphertext.clone();
        ct[0] ^= 0x01;
        assert!(matches!(
            decrypt(&ct, &KEY, &sealed.nonce, &sealed.auth_tag),
            Err(StegoError::Authentication)
        ));

        let mut tag = sealed.auth_tag;
        tag[15] ^= 0x80;
        assert!(matches!(
            decrypt(&sealed.ciphertext, &KEY, &sealed.nonce, &tag),
            Err(StegoError::Authentication)
        ));
    }

    #[test]
    fn test_nonce_is_fresh_per_call() {
        let a = encrypt(b"same message", &KEY).unwrap();
        let b = encrypt(b"same message", &KEY).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }
}
