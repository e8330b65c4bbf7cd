//! Size limit constants for input validation

/// Maximum length for a token string (64KB)
pub(crate) const MAX_TOKEN_LENGTH: usize = 64 * 1024;

// ============================================================================
// Decoded segment size limits
// ============================================================================

/// Maximum size for decoded header JSON (8KB)
pub(crate) const MAX_DECODED_HEADER_SIZE: usize = 8 * 1024;

/// Maximum size for decoded payload JSON (64KB)
pub(crate) const MAX_DECODED_PAYLOAD_SIZE: usize = 64 * 1024;

/// Maximum size for decoded signature bytes (1KB)
/// Covers RSA moduli up to 8192 bits
pub(crate) const MAX_DECODED_SIGNATURE_SIZE: usize = 1024;

/// Maximum size for Base64URL-encoded signature string (1.5KB)
pub(crate) const MAX_SIGNATURE_B64_SIZE: usize = 1536;

// ============================================================================
// Header field size limits
// ============================================================================

/// Maximum length for the algorithm (alg) header field
pub(crate) const MAX_ALG_LENGTH: usize = 16;

/// Maximum length for the key ID (kid) header field
pub(crate) const MAX_KID_LENGTH: usize = 256;

// ============================================================================
// Key material limits
// ============================================================================

/// Maximum RSA modulus size in bytes (8192 bits)
pub(crate) const MAX_RSA_MODULUS_SIZE: usize = 1024;

/// Minimum RSA modulus size in bytes (2048 bits)
pub(crate) const MIN_RSA_MODULUS_SIZE: usize = 256;

// ============================================================================
// Timestamp bounds
// ============================================================================

/// Minimum valid Unix timestamp (1970-01-01 00:00:00 UTC)
pub(crate) const MIN_TIMESTAMP: i64 = 0;

/// Maximum valid Unix timestamp (2100-01-01 00:00:00 UTC)
pub(crate) const MAX_TIMESTAMP: i64 = 4_102_444_800;

// ============================================================================
// Validation bounds
// ============================================================================

/// Maximum clock skew tolerance (300 seconds = 5 minutes)
pub(crate) const MAX_CLOCK_SKEW_SECONDS: u64 = 300;

/// Maximum token age (1 year)
pub(crate) const MAX_MAX_AGE_SECONDS: u64 = 86400 * 365;
