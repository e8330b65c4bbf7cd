//! Public keys for signature verification
//!
//! A [`PublicKey`] is parsed once, up front, and is immutable afterwards. It is
//! shared between concurrent verifications as `Arc<PublicKey>`.

use crate::error::{Error, Result};
use crate::limits::MIN_RSA_MODULUS_SIZE;
use crate::utils::base64url;
use crate::utils::der::{DecodedKey, decode_public_key, rsa_spki_from_n_e};

/// Named elliptic curve of an EC public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcCurve {
    P256,
    P384,
    P521,
}

impl EcCurve {
    /// Length of an uncompressed point on this curve
    pub(crate) const fn point_len(&self) -> usize {
        match self {
            EcCurve::P256 => 65,
            EcCurve::P384 => 97,
            EcCurve::P521 => 133,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            EcCurve::P256 => "P-256",
            EcCurve::P384 => "P-384",
            EcCurve::P521 => "P-521",
        }
    }
}

impl std::fmt::Display for EcCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key type of a public key, used to cross-check the declared algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// RSA key; `modulus_len` is the modulus size in bytes
    Rsa { modulus_len: usize },
    /// EC key on a named curve
    Ec(EcCurve),
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyType::Rsa { .. } => write!(f, "RSA"),
            KeyType::Ec(curve) => write!(f, "EC {curve}"),
        }
    }
}

/// Asymmetric public key used for verification
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    key_type: KeyType,
    /// Raw key in the form `aws-lc-rs` expects: PKCS#1 for RSA, uncompressed point for EC
    material: Vec<u8>,
}

impl PublicKey {
    /// Parse a DER-encoded SubjectPublicKeyInfo or PKCS#1 RSAPublicKey
    pub fn from_der(der: &[u8]) -> Result<Self> {
        match decode_public_key(der)? {
            DecodedKey::Rsa { pkcs1, modulus_len } => {
                if modulus_len < MIN_RSA_MODULUS_SIZE {
                    return Err(Error::KeyInvalid(format!(
                        "RSA modulus too small: {} bits (minimum: {} bits)",
                        modulus_len * 8,
                        MIN_RSA_MODULUS_SIZE * 8
                    )));
                }
                Ok(Self {
                    key_type: KeyType::Rsa { modulus_len },
                    material: pkcs1,
                })
            }
            DecodedKey::Ec { curve, point } => Ok(Self {
                key_type: KeyType::Ec(curve),
                material: point,
            }),
        }
    }

    /// Parse standard Base64 text holding DER key material
    pub fn from_base64_der(encoded: &str) -> Result<Self> {
        Self::from_der(&base64url::decode_standard(encoded)?)
    }

    /// Build an RSA key from big-endian modulus and exponent bytes
    pub fn from_rsa_components(modulus: &[u8], exponent: &[u8]) -> Result<Self> {
        Self::from_der(&rsa_spki_from_n_e(modulus, exponent)?)
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// RSA modulus size in bytes, `None` for EC keys
    pub fn modulus_len(&self) -> Option<usize> {
        match self.key_type {
            KeyType::Rsa { modulus_len } => Some(modulus_len),
            KeyType::Ec(_) => None,
        }
    }

    pub(crate) fn material(&self) -> &[u8] {
        &self.material
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("key_type", &self.key_type)
            .field("material_len", &self.material.len())
            .finish()
    }
}
