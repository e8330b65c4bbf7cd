//! Detached signature verification over arbitrary bytes
//!
//! [`SignatureVerifier`] is the primitive underneath token verification. It
//! checks a signature produced by the private half of a [`PublicKey`] over a
//! message, using the hash function named by the caller. For RSA keys the
//! scheme is always PKCS#1 v1.5: deterministic, so identical inputs always
//! give identical results.

use crate::algorithm::{AlgorithmPolicy, AlgorithmType, HashAlgorithm};
use crate::error::{Error, Result};
use crate::key::PublicKey;
use crate::limits::MAX_DECODED_SIGNATURE_SIZE;
use base64::{Engine, engine::general_purpose::STANDARD};

/// Raw signature verifier
#[derive(Debug, Clone, Default)]
pub struct SignatureVerifier {
    policy: AlgorithmPolicy,
}

impl SignatureVerifier {
    /// Create a verifier accepting the algorithms of `policy`
    pub fn new(policy: AlgorithmPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AlgorithmPolicy {
        &self.policy
    }

    /// Verify `signature` over `message` with `key` and `hash`
    ///
    /// Fails with an unsupported-algorithm error when the key/hash pair is not
    /// a known scheme or not allowed by the policy. Every cryptographic failure
    /// (length, padding, digest mismatch) is reported as
    /// [`Error::SignatureInvalid`].
    pub fn verify(
        &self,
        key: &PublicKey,
        hash: HashAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<()> {
        let algorithm = AlgorithmType::for_key(key.key_type(), hash)?;
        self.policy.validate(&algorithm)?;
        algorithm.verify(key, message, signature)
    }

    /// Verify a signature given as standard Base64 text
    pub fn verify_base64(
        &self,
        key: &PublicKey,
        hash: HashAlgorithm,
        message: &[u8],
        signature_b64: &str,
    ) -> Result<()> {
        let signature = STANDARD
            .decode(signature_b64.trim())
            .map_err(|e| Error::FormatInvalidBase64(format!("Base64 decode failed: {e}")))?;
        if signature.len() > MAX_DECODED_SIGNATURE_SIZE {
            return Err(Error::SignatureInvalid);
        }
        self.verify(key, hash, message, &signature)
    }
}
