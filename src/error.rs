//! # Error Taxonomy
//!
//! Every failure the encode/decode pipeline can produce is a [`StegoError`].
//! Errors are grouped into an [`ErrorCategory`] so callers (the HTTP layer,
//! the CLI) can decide how to report them without matching every variant.
//!
//! ## Categories
//!
//! - **InputValidation**: bad format, short key, empty message, missing file
//! - **Capacity**: the message does not fit in the cover image
//! - **MalformedArtifact**: missing or malformed parameters, corrupt payload
//! - **Authentication**: wrong secret key *or* tampered artifact (never distinguished)
//! - **Internal**: post-write verification failure, I/O trouble

use std::path::PathBuf;
use thiserror::Error;

/// Which of the three container parameters an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    Salt,
    Nonce,
    AuthTag,
}

impl ParamField {
    /// Container text key for this field.
    pub fn key(self) -> &'static str {
        match self {
            ParamField::Salt => "salt",
            ParamField::Nonce => "iv",
            ParamField::AuthTag => "authTag",
        }
    }
}

impl std::fmt::Display for ParamField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Errors produced by the steganographic pipeline.
#[derive(Debug, Error)]
pub enum StegoError {
    /// The input is not a PNG container.
    #[error("input image must be a PNG")]
    UnsupportedFormat,

    /// The input claims to be a PNG but could not be decoded.
    #[error("image could not be decoded: {0}")]
    InvalidImage(String),

    /// The secret key is shorter than the configured minimum.
    #[error("secret key must be at least {min} characters")]
    SecretTooShort { min: usize },

    #[error("message cannot be empty")]
    EmptyMessage,

    /// An uploaded file the caller pointed us at does not exist.
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Payload plus length header does not fit in the cover's eligible bits.
    #[error("message too large for image: need {required_bits} bits, capacity is {capacity_bits} bits")]
    CapacityExceeded {
        required_bits: u64,
        capacity_bits: u64,
    },

    /// One of `salt`, `iv`, `authTag` is absent from the container.
    #[error("missing {0} in image metadata")]
    MissingParameter(ParamField),

    /// A parameter is present but is not valid hex or has the wrong size.
    #[error("invalid {field} in image metadata: {reason}")]
    InvalidParameter { field: ParamField, reason: String },

    /// The embedded length header points past the end of the image.
    #[error("embedded payload is corrupt: header declares {declared_bits} bits, image holds {capacity_bits}")]
    CorruptPayload {
        declared_bits: u64,
        capacity_bits: u64,
    },

    /// AEAD tag check failed: wrong key or tampered data.
    #[error("invalid secret key")]
    Authentication,

    /// The AEAD cipher refused to seal the message.
    #[error("encryption failed")]
    Encryption,

    /// Plaintext authenticated but is not UTF-8 text.
    #[error("decoded message is not valid UTF-8")]
    InvalidUtf8,

    /// The freshly written artifact did not read back identically.
    #[error("internal verification failed: {0}")]
    InternalVerification(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`StegoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InputValidation,
    Capacity,
    MalformedArtifact,
    Authentication,
    Internal,
}

impl StegoError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StegoError::UnsupportedFormat
            | StegoError::InvalidImage(_)
            | StegoError::SecretTooShort { .. }
            | StegoError::EmptyMessage
            | StegoError::MissingInput(_) => ErrorCategory::InputValidation,
            StegoError::CapacityExceeded { .. } => ErrorCategory::Capacity,
            StegoError::MissingParameter(_)
            | StegoError::InvalidParameter { .. }
            | StegoError::CorruptPayload { .. }
            | StegoError::InvalidUtf8 => ErrorCategory::MalformedArtifact,
            StegoError::Authentication => ErrorCategory::Authentication,
            StegoError::Encryption | StegoError::InternalVerification(_) | StegoError::Io(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// True for errors the caller can fix by changing their input.
    pub fn is_client_error(&self) -> bool {
        self.category() != ErrorCategory::Internal
    }

    /// Message safe to show to an end user.
    ///
    /// Internal failures collapse to a generic sentence, and variants that
    /// carry paths or decoder detail drop it, so neither leaves the process.
    pub fn public_message(&self) -> String {
        match (self, self.category()) {
            (StegoError::MissingInput(_), _) => "input image not found".to_string(),
            (StegoError::InvalidImage(_), _) => "image could not be decoded".to_string(),
            (_, ErrorCategory::Authentication) => "Invalid secret key".to_string(),
            (_, ErrorCategory::Internal) => "Internal error while processing image".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StegoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(StegoError::UnsupportedFormat.category(), ErrorCategory::InputValidation);
        assert_eq!(
            StegoError::CapacityExceeded { required_bits: 10, capacity_bits: 8 }.category(),
            ErrorCategory::Capacity
        );
        assert_eq!(
            StegoError::MissingParameter(ParamField::AuthTag).category(),
            ErrorCategory::MalformedArtifact
        );
        assert_eq!(StegoError::Authentication.category(), ErrorCategory::Authentication);
        assert!(!StegoError::InternalVerification("x".into()).is_client_error());
    }

    #[test]
    fn test_public_message_hides_internal_detail() {
        let err = StegoError::InternalVerification("ciphertext mismatch at byte 3".into());
        assert!(!err.public_message().contains("byte 3"));
        assert_eq!(StegoError::Authentication.public_message(), "Invalid secret key");
        assert_eq!(
            StegoError::MissingParameter(ParamField::Nonce).public_message(),
            "missing iv in image metadata"
        );
    }

    #[test]
    fn test_public_message_omits_paths() {
        let err = StegoError::MissingInput(PathBuf::from("/srv/stego/uploads/upload_1234.png"));
        let message = err.public_message();
        assert!(!message.contains("/srv"));
        assert!(!message.contains("upload_1234"));
        assert_eq!(message, "input image not found");
    }
}
