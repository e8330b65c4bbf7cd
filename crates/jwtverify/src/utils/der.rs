//! DER helpers for public key material
//!
//! Keys arrive as X.509 SubjectPublicKeyInfo, as bare PKCS#1 RSAPublicKey, or
//! as raw RSA modulus/exponent. This module uses the RustCrypto `spki` and
//! `der` crates to normalize all of them into the raw key bytes the
//! `aws-lc-rs` verification algorithms take (PKCS#1 for RSA, the uncompressed
//! point for EC).

use crate::error::{Error, Result};
use crate::key::EcCurve;
use crate::limits::MAX_RSA_MODULUS_SIZE;
use der::{Decode, Encode, Sequence, asn1::UintRef};
use spki::{
    AlgorithmIdentifierOwned, ObjectIdentifier, SubjectPublicKeyInfoOwned,
    SubjectPublicKeyInfoRef,
};

const RSA_ENCRYPTION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const P256_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const P384_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
const P521_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");

fn key_error(operation: &str, details: impl std::fmt::Display) -> Error {
    Error::KeyInvalid(format!("{operation}: {details}"))
}

/// RSAPublicKey as defined in RFC 8017:
/// RSAPublicKey ::= SEQUENCE {
///     modulus           INTEGER,  -- n
///     publicExponent    INTEGER   -- e
/// }
#[derive(Sequence)]
struct RsaPublicKey<'a> {
    modulus: UintRef<'a>,
    public_exponent: UintRef<'a>,
}

/// Public key material after DER decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DecodedKey {
    Rsa {
        /// PKCS#1 RSAPublicKey DER
        pkcs1: Vec<u8>,
        /// Modulus length in bytes, without leading zeros
        modulus_len: usize,
    },
    Ec {
        curve: EcCurve,
        /// Uncompressed SEC1 point (0x04 || X || Y)
        point: Vec<u8>,
    },
}

/// Decode SubjectPublicKeyInfo DER, falling back to bare PKCS#1 RSAPublicKey
pub(crate) fn decode_public_key(der: &[u8]) -> Result<DecodedKey> {
    if der.is_empty() {
        return Err(key_error("empty key material", "0 bytes"));
    }

    match SubjectPublicKeyInfoRef::from_der(der) {
        Ok(spki) => decode_spki(&spki),
        Err(spki_err) => decode_rsa_pkcs1(der).map_err(|_| {
            key_error("not a SubjectPublicKeyInfo or RSAPublicKey", spki_err)
        }),
    }
}

fn decode_spki(spki: &SubjectPublicKeyInfoRef<'_>) -> Result<DecodedKey> {
    let key_bytes = spki
        .subject_public_key
        .as_bytes()
        .ok_or_else(|| key_error("invalid subjectPublicKey", "unused bits in bit string"))?;

    let oid = spki.algorithm.oid;
    if oid == RSA_ENCRYPTION_OID {
        decode_rsa_pkcs1(key_bytes)
    } else if oid == EC_PUBLIC_KEY_OID {
        let curve_oid = spki
            .algorithm
            .parameters_oid()
            .map_err(|e| key_error("EC key without named curve", e))?;
        let curve = curve_from_oid(curve_oid)?;
        if key_bytes.len() != curve.point_len() || key_bytes.first() != Some(&0x04) {
            return Err(key_error(
                "invalid EC point",
                format!("{} bytes for {curve}", key_bytes.len()),
            ));
        }
        Ok(DecodedKey::Ec {
            curve,
            point: key_bytes.to_vec(),
        })
    } else {
        Err(key_error("unsupported key algorithm", oid))
    }
}

fn decode_rsa_pkcs1(der: &[u8]) -> Result<DecodedKey> {
    let rsa = RsaPublicKey::from_der(der).map_err(|e| key_error("invalid RSAPublicKey", e))?;

    let modulus_len = rsa.modulus.as_bytes().len();
    if modulus_len == 0 || rsa.public_exponent.as_bytes().is_empty() {
        return Err(key_error("rsa key missing n or e", ""));
    }
    if modulus_len > MAX_RSA_MODULUS_SIZE {
        return Err(key_error(
            "RSA modulus too large",
            format!("{modulus_len} bytes (maximum: {MAX_RSA_MODULUS_SIZE} bytes)"),
        ));
    }

    Ok(DecodedKey::Rsa {
        pkcs1: der.to_vec(),
        modulus_len,
    })
}

fn curve_from_oid(oid: ObjectIdentifier) -> Result<EcCurve> {
    if oid == P256_OID {
        Ok(EcCurve::P256)
    } else if oid == P384_OID {
        Ok(EcCurve::P384)
    } else if oid == P521_OID {
        Ok(EcCurve::P521)
    } else {
        Err(key_error("unsupported EC curve", oid))
    }
}

/// Build DER-encoded SubjectPublicKeyInfo from RSA modulus (n) and exponent (e) bytes
pub(crate) fn rsa_spki_from_n_e(n: &[u8], e: &[u8]) -> Result<Vec<u8>> {
    use der::asn1::BitString;

    if n.is_empty() || e.is_empty() {
        return Err(key_error("rsa key missing n or e", ""));
    }

    if n.len() > MAX_RSA_MODULUS_SIZE + 1 {
        return Err(key_error(
            "RSA modulus too large",
            format!(
                "{} bytes (maximum: {} bytes)",
                n.len(),
                MAX_RSA_MODULUS_SIZE
            ),
        ));
    }

    // UintRef handles INTEGER encoding including leading zero for positive values
    let n_uint = UintRef::new(n).map_err(|e| key_error("failed to encode RSA modulus", e))?;
    let e_uint = UintRef::new(e).map_err(|e| key_error("failed to encode RSA exponent", e))?;

    let rsa_pubkey_der = RsaPublicKey {
        modulus: n_uint,
        public_exponent: e_uint,
    }
    .to_der()
    .map_err(|e| key_error("failed to encode RSA public key", e))?;

    let algorithm = AlgorithmIdentifierOwned {
        oid: RSA_ENCRYPTION_OID,
        parameters: Some(der::asn1::AnyRef::NULL.into()),
    };

    let subject_public_key = BitString::new(0, rsa_pubkey_der)
        .map_err(|e| key_error("failed to create bit string", e))?;

    SubjectPublicKeyInfoOwned {
        algorithm,
        subject_public_key,
    }
    .to_der()
    .map_err(|e| key_error("failed to encode SPKI", e))
}
