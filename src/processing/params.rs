//! # Parameter Codec
//!
//! Renders [`CryptoParams`] as container text entries and parses them back.
//!
//! ## Format
//!
//! | key       | value                         |
//! |-----------|-------------------------------|
//! | `salt`    | 32 lowercase hex chars (16 B) |
//! | `iv`      | 24 lowercase hex chars (12 B) |
//! | `authTag` | 32 lowercase hex chars (16 B) |
//!
//! The parameters live in metadata rather than pixels so that payload
//! capacity does not depend on them and so they can be read without knowing
//! the payload length.

use crate::encryption::{CryptoParams, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::{ParamField, Result, StegoError};

/// A single container text entry: `(keyword, text)`.
pub type TextEntry = (String, String);

/// Render the parameters as the three text entries, in `salt`, `iv`, `authTag` order.
pub fn encode_params(params: &CryptoParams) -> Vec<TextEntry> {
    vec![
        (ParamField::Salt.key().to_string(), hex::encode(params.salt)),
        (ParamField::Nonce.key().to_string(), hex::encode(params.nonce)),
        (ParamField::AuthTag.key().to_string(), hex::encode(params.auth_tag)),
    ]
}

/// Parse the parameters back out of a container's text entries.
///
/// Presence of all three keys is checked first, then each value's hex
/// encoding and decoded length. Any failure rejects the whole set.
///
/// # Errors
/// - [`StegoError::MissingParameter`] if any key is absent
/// - [`StegoError::InvalidParameter`] if a value is not hex or decodes to the wrong size
pub fn decode_params(entries: &[TextEntry]) -> Result<CryptoParams> {
    let salt = lookup(entries, ParamField::Salt)?;
    let nonce = lookup(entries, ParamField::Nonce)?;
    let auth_tag = lookup(entries, ParamField::AuthTag)?;

    Ok(CryptoParams {
        salt: parse_fixed::<SALT_LEN>(ParamField::Salt, salt)?,
        nonce: parse_fixed::<NONCE_LEN>(ParamField::Nonce, nonce)?,
        auth_tag: parse_fixed::<TAG_LEN>(ParamField::AuthTag, auth_tag)?,
    })
}

fn lookup(entries: &[TextEntry], field: ParamField) -> Result<&str> {
    entries
        .iter()
        .find(|(keyword, _)| keyword == field.key())
        .map(|(_, text)| text.as_str())
        .ok_or(StegoError::MissingParameter(field))
}

fn parse_fixed<const N: usize>(field: ParamField, text: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(text).map_err(|e| StegoError::InvalidParameter {
        field,
        reason: format!("not a valid hex string ({e})"),
    })?;

    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| StegoError::InvalidParameter {
        field,
        reason: format!("expected {} bytes, got {}", N, bytes.len()),
    })
}
