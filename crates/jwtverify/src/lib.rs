//! Verification of compact signed tokens against key-id indexed public keys.
//!
//! Two entry points:
//!
//! - [`SignatureVerifier`] checks a detached signature over raw bytes.
//! - [`TokenVerifier`] parses a `header.payload.signature` token, resolves the
//!   key named by its `kid` through a [`KeyResolver`], and verifies the
//!   signature over the original `header.payload` bytes.
//!
//! Supported algorithms are RS256/384/512 (PKCS#1 v1.5) and ES256/384/512.

mod error;

// Internal modules
pub(crate) mod algorithm;
pub(crate) mod cache;
pub(crate) mod claims;
pub(crate) mod header;
pub(crate) mod key;
pub(crate) mod keystore;
pub(crate) mod resolver;
pub(crate) mod signature;
pub(crate) mod token;
pub(crate) mod utils;
pub(crate) mod verifier;

// Public Interface
pub use algorithm::{AlgorithmPolicy, AlgorithmType, HashAlgorithm};
pub use cache::{CachingResolver, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
pub use claims::{Claims, ClaimsValidation, StandardClaims};
pub use error::{Error, ErrorKind, Result};
pub use header::TokenHeader;
pub use key::{EcCurve, KeyType, PublicKey};
pub use keystore::{KeyLoadError, KeyStore};
pub use resolver::KeyResolver;
pub use signature::SignatureVerifier;
pub use token::ParsedToken;
pub use verifier::{TokenVerifier, VerifiedToken};

pub(crate) mod limits;
