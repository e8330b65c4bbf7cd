use crate::algorithm::AlgorithmType;
use crate::error::{Error, Result};
use crate::limits::{MAX_ALG_LENGTH, MAX_KID_LENGTH};
use crate::utils::bounds::validate_field_size;
use miniserde::json::{Object, Value};

/// Token header
///
/// Kept as the full decoded mapping so that unknown members survive; `alg`
/// and `kid` are read on demand with their own failure modes. A member that
/// appears more than once keeps its last value (RFC 7515 Section 4).
#[derive(Debug, Clone)]
pub struct TokenHeader {
    fields: Object,
}

impl TokenHeader {
    pub(crate) fn from_json(json: &str) -> Result<Self> {
        let fields: Object = miniserde::json::from_str(json)
            .map_err(|e| Error::FormatInvalidJson(format!("Failed to parse header: {e}")))?;
        Ok(Self { fields })
    }

    /// Key identifier (`kid`); must be present and a string
    pub fn key_id(&self) -> Result<&str> {
        match self.fields.get("kid") {
            Some(Value::String(kid)) => {
                validate_field_size("kid", kid, MAX_KID_LENGTH)?;
                Ok(kid)
            }
            _ => Err(Error::KeyIdMissing),
        }
    }

    /// Raw `alg` member; must be present and a string
    pub fn algorithm_name(&self) -> Result<&str> {
        match self.fields.get("alg") {
            Some(Value::String(alg)) => Ok(alg),
            _ => Err(Error::AlgorithmMissing),
        }
    }

    /// `alg` mapped onto the fixed allow-list
    pub fn algorithm(&self) -> Result<AlgorithmType> {
        let name = self.algorithm_name()?;
        if name.len() > MAX_ALG_LENGTH {
            return Err(Error::AlgorithmUnsupported(format!(
                "Algorithm string too long: {} bytes (maximum: {} bytes)",
                name.len(),
                MAX_ALG_LENGTH
            )));
        }
        name.parse()
    }

    /// Optional `typ` member
    pub fn token_type(&self) -> Option<&str> {
        match self.fields.get("typ") {
            Some(Value::String(typ)) => Some(typ),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn as_object(&self) -> &Object {
        &self.fields
    }
}
