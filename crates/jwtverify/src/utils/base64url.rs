//! Base64 decoding per RFC 4648
//!
//! Token segments use the URL-safe alphabet without padding. Key material
//! handed to the key store uses the standard alphabet with padding.

use crate::error::{Error, Result};
use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};

/// Decode Base64URL string to bytes with maximum size limit
pub(crate) fn decode_bytes(input: &str, max_size: usize) -> Result<Vec<u8>> {
    let result = URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|e| Error::FormatInvalidBase64(format!("Base64URL decode failed: {e}")))?;

    if result.len() > max_size {
        return Err(Error::FormatInvalidBase64(format!(
            "Decoded size exceeds limit: {} bytes (max: {})",
            result.len(),
            max_size
        )));
    }

    Ok(result)
}

/// Decode Base64URL string to UTF-8 string with size limit
pub(crate) fn decode_string(input: &str, max_size: usize) -> Result<String> {
    decode_bytes(input, max_size).and_then(|bytes| {
        String::from_utf8(bytes)
            .map_err(|e| Error::FormatInvalidBase64(format!("Invalid UTF-8: {e}")))
    })
}

/// Decode standard (padded) Base64 text, as used for DER key material
pub(crate) fn decode_standard(input: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(input.trim())
        .map_err(|e| Error::KeyInvalid(format!("Base64 decode failed: {e}")))
}
