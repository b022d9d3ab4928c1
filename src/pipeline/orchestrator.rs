//! # Pipeline Orchestrator - Encode and Decode
//!
//! [`StegoPipeline`] sequences the crypto engine, the LSB engine and the
//! parameter codec into the two public operations.
//!
//! ## Encode
//!
//! ```text
//! Received -> Validated -> KeyDerived -> Encrypted -> PayloadEmbedded
//!          -> ParamsEmbedded -> Verified -> Committed -> Delivered
//! ```
//!
//! The output is written to a request-keyed temporary file, read back from
//! disk and checked (parameters and ciphertext must match byte for byte),
//! then renamed over its final name. A reader never sees a partial file.
//!
//! ## Decode
//!
//! ```text
//! Received -> ParamsExtracted -> KeyDerived -> PayloadExtracted -> Decrypted -> Delivered
//! ```
//!
//! On every path, including failures, the request's uploaded input and
//! temporary files are removed by its [`RequestArtifacts`] guard.

use log::{debug, error, info, warn};
use std::fmt;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::common::config::{PipelineConfig, MIN_SECRET_LEN};
use crate::encryption::{self, CryptoParams};
use crate::error::{ErrorCategory, Result, StegoError};
use crate::pipeline::artifacts::{write_synced, RequestArtifacts};
use crate::processing::{container, params, steganography};

// ============================================================================
// STATE MACHINE
// ============================================================================

/// Stages of an encode request, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeStage {
    Received,
    Validated,
    KeyDerived,
    Encrypted,
    PayloadEmbedded,
    ParamsEmbedded,
    Verified,
    Committed,
    Delivered,
}

/// Stages of a decode request, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    Received,
    ParamsExtracted,
    KeyDerived,
    PayloadExtracted,
    Decrypted,
    Delivered,
}

impl fmt::Display for EncodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tracks how far a request got, for logging.
struct Progress<S> {
    operation: &'static str,
    request_id: Uuid,
    stage: S,
}

impl<S: Copy + fmt::Display> Progress<S> {
    fn new(operation: &'static str, request_id: Uuid, stage: S) -> Self {
        debug!("[{}] {} {}", request_id, operation, stage);
        Self {
            operation,
            request_id,
            stage,
        }
    }

    fn advance(&mut self, next: S) {
        debug!("[{}] {} {} -> {}", self.request_id, self.operation, self.stage, next);
        self.stage = next;
    }

    /// Log the outcome of a request and hand the result back unchanged.
    fn finish<T>(&self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => info!(
                "✅ [{}] {} completed ({})",
                self.request_id, self.operation, self.stage
            ),
            Err(e) => match e.category() {
                ErrorCategory::Internal => error!(
                    "❌ [{}] {} failed after {}: {}",
                    self.request_id, self.operation, self.stage, e
                ),
                ErrorCategory::Authentication => warn!(
                    "🔒 [{}] {} rejected after {}: authentication failed",
                    self.request_id, self.operation, self.stage
                ),
                _ => info!(
                    "⚠️  [{}] {} rejected after {}: {}",
                    self.request_id, self.operation, self.stage, e
                ),
            },
        }
        result
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Stateless encode/decode service.
///
/// Holds only its configuration; every call derives its own key, allocates
/// its own buffers and names its own files, so one instance can be cloned or
/// shared across threads freely.
///
/// # Example
/// ```ignore
/// let pipeline = StegoPipeline::new(PipelineConfig::with_work_dir("uploads"));
/// let stego = pipeline.encode(&cover_png, "meet at noon", "correct horse")?;
/// assert_eq!(pipeline.decode(&stego, "correct horse")?, "meet at noon");
/// ```
#[derive(Debug, Clone)]
pub struct StegoPipeline {
    config: PipelineConfig,
}

impl StegoPipeline {
    pub fn new(mut config: PipelineConfig) -> Self {
        if config.min_secret_len < MIN_SECRET_LEN {
            warn!(
                "min_secret_len {} is below {}, using {}",
                config.min_secret_len, MIN_SECRET_LEN, MIN_SECRET_LEN
            );
            config.min_secret_len = MIN_SECRET_LEN;
        }
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Hide `message` in the PNG `cover` and return the stego PNG bytes.
    ///
    /// The artifact is committed under the work directory, read back for
    /// delivery and then removed, so nothing persists after the call.
    ///
    /// # Errors
    /// - Input validation: [`StegoError::UnsupportedFormat`],
    ///   [`StegoError::InvalidImage`], [`StegoError::SecretTooShort`],
    ///   [`StegoError::EmptyMessage`]
    /// - [`StegoError::CapacityExceeded`] if the message does not fit
    /// - [`StegoError::InternalVerification`] / [`StegoError::Io`] for internal faults
    pub fn encode(&self, cover: &[u8], message: &str, secret: &str) -> Result<Vec<u8>> {
        let mut artifacts = RequestArtifacts::new(Uuid::new_v4());
        let mut progress = Progress::new("encode", artifacts.request_id(), EncodeStage::Received);
        let result = self.encode_in_work_dir(cover, message, secret, &mut artifacts, &mut progress);
        progress.finish(result)
    }

    /// Like [`encode`](Self::encode), but reads the cover from an uploaded
    /// file and deletes that file whatever the outcome.
    pub fn encode_upload(&self, upload: &Path, message: &str, secret: &str) -> Result<Vec<u8>> {
        let mut artifacts = RequestArtifacts::new(Uuid::new_v4());
        artifacts.track(upload);
        let mut progress = Progress::new("encode", artifacts.request_id(), EncodeStage::Received);
        let result = read_upload(upload).and_then(|cover| {
            self.encode_in_work_dir(&cover, message, secret, &mut artifacts, &mut progress)
        });
        progress.finish(result)
    }

    /// Encode and atomically place the result at `destination`.
    ///
    /// Only the temporary sibling is cleaned up; `destination` is the
    /// caller's to keep.
    pub fn encode_to_path(
        &self,
        cover: &[u8],
        message: &str,
        secret: &str,
        destination: &Path,
    ) -> Result<()> {
        let mut artifacts = RequestArtifacts::new(Uuid::new_v4());
        let mut progress = Progress::new("encode", artifacts.request_id(), EncodeStage::Received);

        let result = self
            .run_encode(cover, message, secret, destination, &mut artifacts, &mut progress)
            .map(|()| progress.advance(EncodeStage::Delivered));

        progress.finish(result)
    }

    /// Recover the message hidden in `stego` using `secret`.
    ///
    /// # Errors
    /// - Input validation: [`StegoError::UnsupportedFormat`],
    ///   [`StegoError::InvalidImage`], [`StegoError::SecretTooShort`]
    /// - [`StegoError::MissingParameter`] / [`StegoError::InvalidParameter`]
    ///   for a foreign or damaged image (no decryption is attempted)
    /// - [`StegoError::CorruptPayload`] if the pixel payload header is implausible
    /// - [`StegoError::Authentication`] for a wrong key or tampered artifact
    pub fn decode(&self, stego: &[u8], secret: &str) -> Result<String> {
        let mut progress = Progress::new("decode", Uuid::new_v4(), DecodeStage::Received);
        let result = self.run_decode(stego, secret, &mut progress);
        progress.finish(result)
    }

    /// Like [`decode`](Self::decode), but reads an uploaded file and deletes
    /// it whatever the outcome.
    pub fn decode_upload(&self, upload: &Path, secret: &str) -> Result<String> {
        let mut artifacts = RequestArtifacts::new(Uuid::new_v4());
        artifacts.track(upload);
        let mut progress = Progress::new("decode", artifacts.request_id(), DecodeStage::Received);
        let result = read_upload(upload).and_then(|stego| self.run_decode(&stego, secret, &mut progress));
        progress.finish(result)
    }

    // ------------------------------------------------------------------------
    // Encode internals
    // ------------------------------------------------------------------------

    fn encode_in_work_dir(
        &self,
        cover: &[u8],
        message: &str,
        secret: &str,
        artifacts: &mut RequestArtifacts,
        progress: &mut Progress<EncodeStage>,
    ) -> Result<Vec<u8>> {
        let destination = self
            .config
            .work_dir
            .join(format!("encoded_{}.png", artifacts.request_id()));
        artifacts.track(&destination);

        let encoded = self
            .run_encode(cover, message, secret, &destination, artifacts, progress)
            .and_then(|()| fs::read(&destination).map_err(StegoError::from))?;
        progress.advance(EncodeStage::Delivered);
        Ok(encoded)
    }

    fn run_encode(
        &self,
        cover: &[u8],
        message: &str,
        secret: &str,
        destination: &Path,
        artifacts: &mut RequestArtifacts,
        progress: &mut Progress<EncodeStage>,
    ) -> Result<()> {
        // ========== Validated ==========
        if !container::is_png(cover) {
            return Err(StegoError::UnsupportedFormat);
        }
        self.validate_secret(secret)?;
        if message.trim().is_empty() {
            return Err(StegoError::EmptyMessage);
        }
        let cover = container::decode_png(cover)?;
        let mut raster = cover.raster;

        // GCM ciphertext is exactly as long as the plaintext, so capacity can
        // be checked before paying for key derivation.
        let capacity_bits = steganography::capacity(&raster);
        let required_bits = steganography::HEADER_BITS + message.len() as u64 * 8;
        if required_bits > capacity_bits {
            return Err(StegoError::CapacityExceeded {
                required_bits,
                capacity_bits,
            });
        }
        progress.advance(EncodeStage::Validated);

        // ========== KeyDerived ==========
        let (key, salt) = encryption::derive_key(secret, None);
        progress.advance(EncodeStage::KeyDerived);

        // ========== Encrypted ==========
        let sealed = encryption::encrypt(message.as_bytes(), &key)?;
        let crypto_params = CryptoParams {
            salt,
            nonce: sealed.nonce,
            auth_tag: sealed.auth_tag,
        };
        progress.advance(EncodeStage::Encrypted);

        // ========== PayloadEmbedded ==========
        steganography::embed(&mut raster, &sealed.ciphertext)?;
        progress.advance(EncodeStage::PayloadEmbedded);

        // ========== ParamsEmbedded ==========
        let text = params::encode_params(&crypto_params);
        let stego_png = container::encode_png(&raster, &text)?;
        progress.advance(EncodeStage::ParamsEmbedded);

        // ========== Verified ==========
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp = artifacts.temp_path_for(destination);
        write_synced(&temp, &stego_png)?;
        let written = fs::read(&temp)?;
        verify_artifact(&written, &crypto_params, &sealed.ciphertext)?;
        progress.advance(EncodeStage::Verified);

        // ========== Committed ==========
        fs::rename(&temp, destination)?;
        artifacts.release(&temp);
        progress.advance(EncodeStage::Committed);

        Ok(())
    }

    // ------------------------------------------------------------------------
    // Decode internals
    // ------------------------------------------------------------------------

    fn run_decode(
        &self,
        stego: &[u8],
        secret: &str,
        progress: &mut Progress<DecodeStage>,
    ) -> Result<String> {
        self.validate_secret(secret)?;
        let stego = container::decode_png(stego)?;

        // ========== ParamsExtracted ==========
        let crypto_params = params::decode_params(&stego.text)?;
        progress.advance(DecodeStage::ParamsExtracted);

        // ========== KeyDerived ==========
        // Must reuse the embedder's salt, never a fresh one
        let (key, _) = encryption::derive_key(secret, Some(crypto_params.salt));
        progress.advance(DecodeStage::KeyDerived);

        // ========== PayloadExtracted ==========
        let ciphertext = steganography::extract(&stego.raster)?;
        progress.advance(DecodeStage::PayloadExtracted);

        // ========== Decrypted ==========
        let plaintext = encryption::decrypt(
            &ciphertext,
            &key,
            &crypto_params.nonce,
            &crypto_params.auth_tag,
        )?;
        progress.advance(DecodeStage::Decrypted);

        let message = String::from_utf8(plaintext).map_err(|_| StegoError::InvalidUtf8)?;
        progress.advance(DecodeStage::Delivered);
        Ok(message)
    }

    fn validate_secret(&self, secret: &str) -> Result<()> {
        if secret.chars().count() < self.config.min_secret_len {
            return Err(StegoError::SecretTooShort {
                min: self.config.min_secret_len,
            });
        }
        Ok(())
    }
}

fn read_upload(upload: &Path) -> Result<Vec<u8>> {
    fs::read(upload).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StegoError::MissingInput(upload.to_path_buf()),
        _ => StegoError::Io(e),
    })
}

/// Re-open a freshly written artifact and check it carries exactly what was
/// embedded. Any discrepancy is an internal fault, never a user error.
fn verify_artifact(written: &[u8], expected_params: &CryptoParams, expected_ciphertext: &[u8]) -> Result<()> {
    let reopened = container::decode_png(written)
        .map_err(|e| StegoError::InternalVerification(format!("artifact does not decode: {e}")))?;

    let found_params = params::decode_params(&reopened.text)
        .map_err(|e| StegoError::InternalVerification(format!("parameters unreadable: {e}")))?;
    if &found_params != expected_params {
        return Err(StegoError::InternalVerification(
            "parameter mismatch".to_string(),
        ));
    }

    let found_ciphertext = steganography::extract(&reopened.raster)
        .map_err(|e| StegoError::InternalVerification(format!("payload unreadable: {e}")))?;
    if found_ciphertext != expected_ciphertext {
        return Err(StegoError::InternalVerification(format!(
            "ciphertext mismatch: wrote {} bytes, read {}",
            expected_ciphertext.len(),
            found_ciphertext.len()
        )));
    }

    Ok(())
}
