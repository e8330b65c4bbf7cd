//! Algorithm support for signature verification
use crate::error::{Error, Result};
use crate::key::{EcCurve, KeyType, PublicKey};
use crate::limits::MAX_ALG_LENGTH;

use aws_lc_rs::signature::{self, UnparsedPublicKey};

/// Hash function applied to the message before signing
///
/// Only collision-resistant functions are representable. SHA-1 and MD5 are
/// rejected when parsing a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Parse a hash name such as `SHA-256`, `sha512` or `SHA_384`
    pub fn from_name(name: &str) -> Result<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_uppercase)
            .collect();

        match normalized.as_str() {
            "SHA256" => Ok(HashAlgorithm::Sha256),
            "SHA384" => Ok(HashAlgorithm::Sha384),
            "SHA512" => Ok(HashAlgorithm::Sha512),
            "SHA1" | "MD5" => Err(Error::AlgorithmUnsupported(format!(
                "{name} (not collision resistant)"
            ))),
            _ => Err(Error::AlgorithmUnsupported(name.into())),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Algorithm identifier from the token header
///
/// This is the fixed allow-list. Anything else, including `none` and the
/// symmetric `HS*` family, is unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmType {
    RS256,
    RS384,
    RS512,
    ES256,
    ES384,
    ES512,
}

impl std::str::FromStr for AlgorithmType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() > MAX_ALG_LENGTH {
            return Err(Error::AlgorithmUnsupported(format!(
                "Algorithm string too long: {} bytes (maximum: {} bytes)",
                s.len(),
                MAX_ALG_LENGTH
            )));
        }

        match s {
            "none" => Err(Error::AlgorithmNoneRejected),
            "RS256" => Ok(AlgorithmType::RS256),
            "RS384" => Ok(AlgorithmType::RS384),
            "RS512" => Ok(AlgorithmType::RS512),
            "ES256" => Ok(AlgorithmType::ES256),
            "ES384" => Ok(AlgorithmType::ES384),
            "ES512" => Ok(AlgorithmType::ES512),
            _ => Err(Error::AlgorithmUnsupported(s.into())),
        }
    }
}

impl AlgorithmType {
    /// Select the scheme for a key type and hash function
    ///
    /// RSA keys always use PKCS#1 v1.5. EC keys only pair with the hash of
    /// their curve.
    pub fn for_key(key_type: KeyType, hash: HashAlgorithm) -> Result<Self> {
        match (key_type, hash) {
            (KeyType::Rsa { .. }, HashAlgorithm::Sha256) => Ok(AlgorithmType::RS256),
            (KeyType::Rsa { .. }, HashAlgorithm::Sha384) => Ok(AlgorithmType::RS384),
            (KeyType::Rsa { .. }, HashAlgorithm::Sha512) => Ok(AlgorithmType::RS512),
            (KeyType::Ec(EcCurve::P256), HashAlgorithm::Sha256) => Ok(AlgorithmType::ES256),
            (KeyType::Ec(EcCurve::P384), HashAlgorithm::Sha384) => Ok(AlgorithmType::ES384),
            (KeyType::Ec(EcCurve::P521), HashAlgorithm::Sha512) => Ok(AlgorithmType::ES512),
            (KeyType::Ec(curve), hash) => Err(Error::AlgorithmUnsupported(format!(
                "{hash} with EC {curve}"
            ))),
        }
    }

    /// Convert to string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlgorithmType::RS256 => "RS256",
            AlgorithmType::RS384 => "RS384",
            AlgorithmType::RS512 => "RS512",
            AlgorithmType::ES256 => "ES256",
            AlgorithmType::ES384 => "ES384",
            AlgorithmType::ES512 => "ES512",
        }
    }

    pub const fn hash(&self) -> HashAlgorithm {
        match self {
            AlgorithmType::RS256 | AlgorithmType::ES256 => HashAlgorithm::Sha256,
            AlgorithmType::RS384 | AlgorithmType::ES384 => HashAlgorithm::Sha384,
            AlgorithmType::RS512 | AlgorithmType::ES512 => HashAlgorithm::Sha512,
        }
    }

    /// Human-readable key type this algorithm requires
    const fn expected_key_type(&self) -> &'static str {
        match self {
            AlgorithmType::RS256 | AlgorithmType::RS384 | AlgorithmType::RS512 => "RSA",
            AlgorithmType::ES256 => "EC P-256",
            AlgorithmType::ES384 => "EC P-384",
            AlgorithmType::ES512 => "EC P-521",
        }
    }

    /// Reject keys whose type (or curve) does not belong to this algorithm
    pub(crate) fn check_key(&self, key: &PublicKey) -> Result<()> {
        let matches = match (self, key.key_type()) {
            (
                AlgorithmType::RS256 | AlgorithmType::RS384 | AlgorithmType::RS512,
                KeyType::Rsa { .. },
            ) => true,
            (AlgorithmType::ES256, KeyType::Ec(EcCurve::P256)) => true,
            (AlgorithmType::ES384, KeyType::Ec(EcCurve::P384)) => true,
            (AlgorithmType::ES512, KeyType::Ec(EcCurve::P521)) => true,
            _ => false,
        };

        if matches {
            Ok(())
        } else {
            Err(Error::KeyTypeMismatch {
                algorithm: self.to_string(),
                expected_key_type: self.expected_key_type().into(),
                actual_key_type: key.key_type().to_string(),
            })
        }
    }

    /// Get the verification algorithm for signature verification
    ///
    /// Note: ECDSA signatures use IEEE P1363 format (fixed-length R||S),
    /// not ASN.1 DER encoding, as per RFC 7518 Section 3.4.
    fn verification_algorithm(&self) -> &'static dyn signature::VerificationAlgorithm {
        match self {
            AlgorithmType::RS256 => &signature::RSA_PKCS1_2048_8192_SHA256,
            AlgorithmType::RS384 => &signature::RSA_PKCS1_2048_8192_SHA384,
            AlgorithmType::RS512 => &signature::RSA_PKCS1_2048_8192_SHA512,
            AlgorithmType::ES256 => &signature::ECDSA_P256_SHA256_FIXED,
            AlgorithmType::ES384 => &signature::ECDSA_P384_SHA384_FIXED,
            AlgorithmType::ES512 => &signature::ECDSA_P521_SHA512_FIXED,
        }
    }

    /// Verify a detached signature over `message`
    ///
    /// Length, padding and digest failures all collapse into
    /// [`Error::SignatureInvalid`].
    pub(crate) fn verify(&self, key: &PublicKey, message: &[u8], signature: &[u8]) -> Result<()> {
        self.check_key(key)?;

        if let Some(modulus_len) = key.modulus_len() {
            if signature.len() != modulus_len {
                return Err(Error::SignatureInvalid);
            }
        }

        UnparsedPublicKey::new(self.verification_algorithm(), key.material())
            .verify(message, signature)
            .map_err(|_| Error::SignatureInvalid)
    }
}

impl std::fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for AlgorithmType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Policy for allowed algorithms
///
/// This is the explicit configuration of accepted schemes and hash functions,
/// shared by the token verifier and the raw signature verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmPolicy {
    allowed: Vec<AlgorithmType>,
}

impl AlgorithmPolicy {
    /// Policy that allows only RS256
    pub fn rs256_only() -> Self {
        Self::allow_only(vec![AlgorithmType::RS256])
    }

    /// Policy that allows only RS384
    pub fn rs384_only() -> Self {
        Self::allow_only(vec![AlgorithmType::RS384])
    }

    /// Policy that allows only RS512
    pub fn rs512_only() -> Self {
        Self::allow_only(vec![AlgorithmType::RS512])
    }

    /// Policy that allows all RSA algorithms (RS256, RS384, RS512)
    ///
    /// Equivalent to `Default::default()`.
    pub fn rsa_all() -> Self {
        Self::allow_only(vec![
            AlgorithmType::RS256,
            AlgorithmType::RS384,
            AlgorithmType::RS512,
        ])
    }

    /// Policy that allows only ES256
    pub fn es256_only() -> Self {
        Self::allow_only(vec![AlgorithmType::ES256])
    }

    /// Policy that allows only ES384
    pub fn es384_only() -> Self {
        Self::allow_only(vec![AlgorithmType::ES384])
    }

    /// Policy that allows only ES512
    pub fn es512_only() -> Self {
        Self::allow_only(vec![AlgorithmType::ES512])
    }

    /// Policy that allows all ECDSA algorithms (ES256, ES384, ES512)
    pub fn ecdsa_all() -> Self {
        Self::allow_only(vec![
            AlgorithmType::ES256,
            AlgorithmType::ES384,
            AlgorithmType::ES512,
        ])
    }

    /// Create a policy that allows only specific algorithms
    pub fn allow_only(algorithms: Vec<AlgorithmType>) -> Self {
        Self {
            allowed: algorithms,
        }
    }

    /// Allowed algorithms, in configuration order
    pub fn allowed(&self) -> &[AlgorithmType] {
        &self.allowed
    }

    /// Validate algorithm against policy
    pub(crate) fn validate(&self, algorithm: &AlgorithmType) -> Result<()> {
        if self.allowed.contains(algorithm) {
            Ok(())
        } else {
            Err(Error::AlgorithmNotAllowed {
                found: algorithm.to_string(),
                allowed: self.allowed.iter().map(ToString::to_string).collect(),
            })
        }
    }
}

impl Default for AlgorithmPolicy {
    fn default() -> Self {
        Self::rsa_all()
    }
}
