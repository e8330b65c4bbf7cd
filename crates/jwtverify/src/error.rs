//! Errors for jwtverify

use thiserror::Error;

/// Broad failure category of an [`Error`]
///
/// Callers should treat every kind as "not authenticated" for authorization
/// decisions and use the kind for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong segment count, bad transport encoding, oversized input
    MalformedToken,
    /// Header lacks a usable `kid`
    MissingKeyIdentifier,
    /// The resolver has no key for the identifier
    UnknownKey,
    /// `alg` absent, unrecognized, not allowed, or inconsistent with the key
    UnsupportedAlgorithm,
    /// Cryptographic check failed
    SignatureInvalid,
    /// Key lookup failed for infrastructural reasons
    ResolverFailure,
    /// Key material could not be parsed
    InvalidKey,
    /// Signature was valid but a configured claim check failed
    ClaimsRejected,
}

/// jwtverify Errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ============================================================================
    // Format Errors
    // ============================================================================
    #[error("Token too large: {size} bytes (maximum: {max} bytes)")]
    TokenTooLarge { size: usize, max: usize },

    #[error("Invalid token format: expected three non-empty parts separated by '.'")]
    FormatInvalid,

    #[error("Base64URL decoding failed: {0}")]
    FormatInvalidBase64(String),

    #[error("JSON parsing failed: {0}")]
    FormatInvalidJson(String),

    #[error("Signature Base64URL string too large: {size} bytes (maximum: {max} bytes)")]
    SignatureB64TooLarge { size: usize, max: usize },

    #[error("Header field '{field}' too long: {length} bytes (maximum: {max} bytes)")]
    HeaderFieldTooLong {
        field: String,
        length: usize,
        max: usize,
    },

    // ============================================================================
    // Key Errors
    // ============================================================================
    #[error("Key identifier (kid) header missing or not a string")]
    KeyIdMissing,

    #[error("No public key found for kid '{0}'")]
    KeyNotFound(String),

    #[error("Invalid public key: {0}")]
    KeyInvalid(String),

    // ============================================================================
    // Algorithm Errors
    // ============================================================================
    #[error("Algorithm (alg) header missing or not a string")]
    AlgorithmMissing,

    #[error("Algorithm '{0}' is not supported")]
    AlgorithmUnsupported(String),

    #[error("The 'none' algorithm is rejected for security reasons (RFC 8725)")]
    AlgorithmNoneRejected,

    #[error("Algorithm '{found}' not allowed. Allowed: {allowed:?}")]
    AlgorithmNotAllowed { found: String, allowed: Vec<String> },

    #[error(
        "Key type mismatch for algorithm '{algorithm}': expected {expected_key_type}, got {actual_key_type}"
    )]
    KeyTypeMismatch {
        algorithm: String,
        expected_key_type: String,
        actual_key_type: String,
    },

    // ============================================================================
    // Signature Errors
    // ============================================================================
    #[error("Signature verification failed")]
    SignatureInvalid,

    // ============================================================================
    // Resolver Errors
    // ============================================================================
    #[error("Key resolver failed: {0}")]
    ResolverFailure(String),

    #[error("Key resolver timed out after {timeout_ms}ms")]
    ResolverTimeout { timeout_ms: u128 },

    #[error("Key resolution cancelled")]
    ResolverCancelled,

    // ============================================================================
    // Claim Errors
    // ============================================================================
    #[error("Token expired at {expired_at} (now: {now}, skew: {skew}s)")]
    TokenExpired {
        expired_at: i64,
        now: i64,
        skew: u64,
    },

    #[error("Token not valid until {not_before} (now: {now}, skew: {skew}s)")]
    TokenNotYetValid {
        not_before: i64,
        now: i64,
        skew: u64,
    },

    #[error("Token issued in future at {issued_at} (now: {now}, skew: {skew}s)")]
    TokenIssuedInFuture { issued_at: i64, now: i64, skew: u64 },

    #[error("Token too old: issued at {issued_at}, max age {max_age}s (now: {now})")]
    TokenTooOld {
        issued_at: i64,
        now: i64,
        max_age: u64,
    },

    #[error("Token audience mismatch: expected '{expected}', found {found:?}")]
    TokenAudienceMismatch { expected: String, found: Vec<String> },

    #[error("Required token claim '{0}' is missing")]
    TokenMissingClaim(String),

    #[error("Token claim '{0}' is not an integer timestamp")]
    TokenInvalidClaim(String),

    #[error("Timestamp out of bounds: {value} (valid range: {min} to {max})")]
    TimestampOutOfBounds { value: i64, min: i64, max: i64 },

    #[error("Integer overflow in timestamp arithmetic")]
    TimestampOverflow,

    #[error("Clock skew too large: {value} seconds (maximum: {max} seconds)")]
    ClockSkewTooLarge { value: u64, max: u64 },

    #[error("Max age too large: {value} seconds (maximum: {max} seconds)")]
    MaxAgeTooLarge { value: u64, max: u64 },
}

impl Error {
    /// Map the error onto its failure category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TokenTooLarge { .. }
            | Error::FormatInvalid
            | Error::FormatInvalidBase64(_)
            | Error::FormatInvalidJson(_)
            | Error::SignatureB64TooLarge { .. }
            | Error::HeaderFieldTooLong { .. } => ErrorKind::MalformedToken,

            Error::KeyIdMissing => ErrorKind::MissingKeyIdentifier,
            Error::KeyNotFound(_) => ErrorKind::UnknownKey,
            Error::KeyInvalid(_) => ErrorKind::InvalidKey,

            Error::AlgorithmMissing
            | Error::AlgorithmUnsupported(_)
            | Error::AlgorithmNoneRejected
            | Error::AlgorithmNotAllowed { .. }
            | Error::KeyTypeMismatch { .. } => ErrorKind::UnsupportedAlgorithm,

            Error::SignatureInvalid => ErrorKind::SignatureInvalid,

            Error::ResolverFailure(_) | Error::ResolverTimeout { .. } | Error::ResolverCancelled => {
                ErrorKind::ResolverFailure
            }

            Error::TokenExpired { .. }
            | Error::TokenNotYetValid { .. }
            | Error::TokenIssuedInFuture { .. }
            | Error::TokenTooOld { .. }
            | Error::TokenAudienceMismatch { .. }
            | Error::TokenMissingClaim(_)
            | Error::TokenInvalidClaim(_)
            | Error::TimestampOutOfBounds { .. }
            | Error::TimestampOverflow
            | Error::ClockSkewTooLarge { .. }
            | Error::MaxAgeTooLarge { .. } => ErrorKind::ClaimsRejected,
        }
    }

    /// Whether a caller may reasonably retry the same verification later
    ///
    /// Only infrastructural resolver failures qualify; nothing is retried internally.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::ResolverFailure
    }
}

/// Result type alias for jwtverify operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::FormatInvalid.kind(), ErrorKind::MalformedToken);
        assert_eq!(
            Error::FormatInvalidBase64("x".into()).kind(),
            ErrorKind::MalformedToken
        );
        assert_eq!(Error::KeyIdMissing.kind(), ErrorKind::MissingKeyIdentifier);
        assert_eq!(
            Error::KeyNotFound("k".into()).kind(),
            ErrorKind::UnknownKey
        );
        assert_eq!(
            Error::AlgorithmNoneRejected.kind(),
            ErrorKind::UnsupportedAlgorithm
        );
        assert_eq!(
            Error::KeyTypeMismatch {
                algorithm: "RS256".into(),
                expected_key_type: "RSA".into(),
                actual_key_type: "EC P-256".into(),
            }
            .kind(),
            ErrorKind::UnsupportedAlgorithm
        );
        assert_eq!(Error::SignatureInvalid.kind(), ErrorKind::SignatureInvalid);
        assert_eq!(
            Error::ResolverTimeout { timeout_ms: 10 }.kind(),
            ErrorKind::ResolverFailure
        );
        assert_eq!(Error::TimestampOverflow.kind(), ErrorKind::ClaimsRejected);
        assert_eq!(
            Error::TokenInvalidClaim("exp".into()).kind(),
            ErrorKind::ClaimsRejected
        );
    }

    #[test]
    fn test_only_resolver_failures_are_retryable() {
        assert!(Error::ResolverFailure("unavailable".into()).is_retryable());
        assert!(Error::ResolverCancelled.is_retryable());
        assert!(!Error::KeyNotFound("k".into()).is_retryable());
        assert!(!Error::SignatureInvalid.is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::SignatureInvalid.to_string(),
            "Signature verification failed"
        );
        assert_eq!(
            Error::KeyNotFound("abc".into()).to_string(),
            "No public key found for kid 'abc'"
        );
    }
}
