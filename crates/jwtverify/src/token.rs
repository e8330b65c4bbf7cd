//! Compact token parsing
//!
//! A [`ParsedToken`] is the result of the structural stage only. Its header
//! and claims are untrusted until the signature has been checked.

use crate::claims::Claims;
use crate::error::{Error, Result};
use crate::header::TokenHeader;
use crate::limits::{
    MAX_DECODED_HEADER_SIZE, MAX_DECODED_PAYLOAD_SIZE, MAX_DECODED_SIGNATURE_SIZE,
    MAX_SIGNATURE_B64_SIZE, MAX_TOKEN_LENGTH,
};
use crate::utils::base64url;

/// Segment delimiter of the compact serialization
pub(crate) const DELIMITER: char = '.';

/// Token split into segments with header and payload decoded
#[derive(Debug, Clone)]
pub struct ParsedToken<'a> {
    signing_input: &'a str,
    signature_b64: &'a str,
    header: TokenHeader,
    claims: Claims,
}

impl<'a> ParsedToken<'a> {
    /// Split and decode a compact token
    ///
    /// Requires exactly three non-empty segments. The signature segment is
    /// only size-checked here; it is decoded by [`ParsedToken::signature`].
    pub fn parse(token: &'a str) -> Result<Self> {
        if token.len() > MAX_TOKEN_LENGTH {
            return Err(Error::TokenTooLarge {
                size: token.len(),
                max: MAX_TOKEN_LENGTH,
            });
        }

        let mut parts = token.split(DELIMITER);
        let header_b64 = parts.next().ok_or(Error::FormatInvalid)?;
        let payload_b64 = parts.next().ok_or(Error::FormatInvalid)?;
        let signature_b64 = parts.next().ok_or(Error::FormatInvalid)?;
        if parts.next().is_some() {
            return Err(Error::FormatInvalid);
        }
        if header_b64.is_empty() || payload_b64.is_empty() || signature_b64.is_empty() {
            return Err(Error::FormatInvalid);
        }

        if signature_b64.len() > MAX_SIGNATURE_B64_SIZE {
            return Err(Error::SignatureB64TooLarge {
                size: signature_b64.len(),
                max: MAX_SIGNATURE_B64_SIZE,
            });
        }

        let header_json = base64url::decode_string(header_b64, MAX_DECODED_HEADER_SIZE)?;
        let header = TokenHeader::from_json(&header_json)?;

        let payload_json = base64url::decode_string(payload_b64, MAX_DECODED_PAYLOAD_SIZE)?;
        let claims = Claims::from_json(&payload_json)?;

        // Exact bytes of the first two segments and the delimiter between them
        let signing_input = &token[..header_b64.len() + 1 + payload_b64.len()];

        Ok(Self {
            signing_input,
            signature_b64,
            header,
            claims,
        })
    }

    /// Canonical signing input: `header.payload` exactly as it appeared in the token
    pub fn signing_input(&self) -> &'a str {
        self.signing_input
    }

    /// Decode the signature segment
    pub fn signature(&self) -> Result<Vec<u8>> {
        base64url::decode_bytes(self.signature_b64, MAX_DECODED_SIGNATURE_SIZE)
    }

    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    /// Claims as decoded; not authenticated
    pub fn unverified_claims(&self) -> &Claims {
        &self.claims
    }

    pub(crate) fn into_parts(self) -> (TokenHeader, Claims) {
        (self.header, self.claims)
    }
}
