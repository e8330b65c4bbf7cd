//! Claims carried in the token payload
//!
//! The payload is opaque to signature verification: it is returned to the
//! caller as a [`Claims`] mapping. Temporal and audience checks are available
//! through [`ClaimsValidation`] but only run when configured on the verifier.

use crate::error::{Error, Result};
use crate::limits::{MAX_CLOCK_SKEW_SECONDS, MAX_MAX_AGE_SECONDS};
use crate::utils::bounds::{apply_clock_skew, validate_timestamp_bounds};
use miniserde::json::{Number, Object, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// The `StandardClaims` trait defines the registered claims (RFC 7519 Section 4.1).
pub trait StandardClaims {
    /// Issuer (iss) - identifies the principal that issued the token
    fn issuer(&self) -> Option<&str>;
    /// Subject (sub) - identifies the principal that is the subject of the token
    fn subject(&self) -> Option<&str>;
    /// Audience (aud) - a string, or the first string of an array
    fn audience(&self) -> Option<&str>;
    /// Every audience the token names
    fn audiences(&self) -> Vec<&str> {
        self.audience().into_iter().collect()
    }
    /// Expiration Time (exp) - seconds since Unix epoch
    fn expiration(&self) -> Option<i64>;
    /// Not Before (nbf) - the time before which the token MUST NOT be accepted
    fn not_before(&self) -> Option<i64>;
    /// Issued At (iat) - the time at which the token was issued
    fn issued_at(&self) -> Option<i64>;
    /// Token ID (jti) - a unique identifier for the token
    fn jwt_id(&self) -> Option<&str>;
}

/// Decoded payload mapping
#[derive(Debug, Clone)]
pub struct Claims {
    fields: Object,
}

impl Claims {
    pub(crate) fn from_json(json: &str) -> Result<Self> {
        let fields: Object = miniserde::json::from_str(json)
            .map_err(|e| Error::FormatInvalidJson(format!("Failed to parse payload: {e}")))?;
        Ok(Self { fields })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Integer claim; floats with no fractional part are accepted
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.fields.get(name) {
            Some(Value::Number(Number::I64(n))) => Some(*n),
            Some(Value::Number(Number::U64(n))) => i64::try_from(*n).ok(),
            Some(Value::Number(Number::F64(n))) if n.fract() == 0.0 => {
                let truncated = *n as i64;
                (truncated as f64 == *n).then_some(truncated)
            }
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Serialize back to JSON (member order is sorted, not the original)
    pub fn to_json(&self) -> String {
        miniserde::json::to_string(&self.fields)
    }

    pub fn as_object(&self) -> &Object {
        &self.fields
    }

    pub fn into_object(self) -> Object {
        self.fields
    }
}

impl StandardClaims for Claims {
    fn issuer(&self) -> Option<&str> {
        self.get_str("iss")
    }

    fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    fn audience(&self) -> Option<&str> {
        match self.fields.get("aud") {
            Some(Value::String(aud)) => Some(aud),
            Some(Value::Array(values)) => values.iter().find_map(|v| match v {
                Value::String(aud) => Some(aud.as_str()),
                _ => None,
            }),
            _ => None,
        }
    }

    fn audiences(&self) -> Vec<&str> {
        match self.fields.get("aud") {
            Some(Value::String(aud)) => vec![aud.as_str()],
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(|v| match v {
                    Value::String(aud) => Some(aud.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn expiration(&self) -> Option<i64> {
        self.get_i64("exp")
    }

    fn not_before(&self) -> Option<i64> {
        self.get_i64("nbf")
    }

    fn issued_at(&self) -> Option<i64> {
        self.get_i64("iat")
    }

    fn jwt_id(&self) -> Option<&str> {
        self.get_str("jti")
    }
}

/// Configuration for claims validation
#[derive(Debug, Clone)]
pub struct ClaimsValidation {
    validate_exp: bool,
    validate_nbf: bool,
    validate_iat: bool,
    clock_skew_seconds: u64,
    max_age_seconds: Option<u64>,
    required_audience: Option<String>,
    fixed_now: Option<i64>,
}

impl Default for ClaimsValidation {
    fn default() -> Self {
        Self {
            validate_exp: true,
            validate_nbf: true,
            validate_iat: true,
            clock_skew_seconds: 0,
            max_age_seconds: None,
            required_audience: None,
            fixed_now: None,
        }
    }
}

impl ClaimsValidation {
    /// Create a new validation config with defaults (exp, nbf, iat checked)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set clock skew tolerance
    ///
    /// # Security
    /// Values above 300 seconds are rejected during validation.
    pub fn clock_skew(mut self, seconds: u64) -> Self {
        self.clock_skew_seconds = seconds;
        self
    }

    /// Set maximum token age, measured from `iat`
    ///
    /// # Security
    /// Values above one year are rejected during validation.
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age_seconds = Some(seconds);
        self
    }

    /// Require a specific audience
    pub fn require_audience(mut self, audience: impl Into<String>) -> Self {
        self.required_audience = Some(audience.into());
        self
    }

    /// Disable expiration validation
    pub fn no_exp_validation(mut self) -> Self {
        self.validate_exp = false;
        self
    }

    /// Disable not-before validation
    pub fn no_nbf_validation(mut self) -> Self {
        self.validate_nbf = false;
        self
    }

    /// Disable issued-at validation
    pub fn no_iat_validation(mut self) -> Self {
        self.validate_iat = false;
        self
    }

    /// Evaluate time-based claims at a fixed Unix timestamp instead of the system clock
    pub fn at_time(mut self, now: i64) -> Self {
        self.fixed_now = Some(now);
        self
    }

    fn now(&self) -> i64 {
        self.fixed_now.unwrap_or_else(current_timestamp)
    }
}

/// Registered claims that hold NumericDate values
const TIMESTAMP_CLAIMS: [&str; 3] = ["exp", "nbf", "iat"];

/// Validate claims according to configuration
pub(crate) fn validate_claims(claims: &Claims, config: &ClaimsValidation) -> Result<()> {
    if config.clock_skew_seconds > MAX_CLOCK_SKEW_SECONDS {
        return Err(Error::ClockSkewTooLarge {
            value: config.clock_skew_seconds,
            max: MAX_CLOCK_SKEW_SECONDS,
        });
    }
    if let Some(max_age) = config.max_age_seconds {
        if max_age > MAX_MAX_AGE_SECONDS {
            return Err(Error::MaxAgeTooLarge {
                value: max_age,
                max: MAX_MAX_AGE_SECONDS,
            });
        }
    }

    let now = config.now();

    // A present timestamp claim must be usable; otherwise its check would be skipped
    for name in TIMESTAMP_CLAIMS {
        if claims.contains(name) && claims.get_i64(name).is_none() {
            return Err(Error::TokenInvalidClaim(name.to_string()));
        }
    }

    for timestamp in [claims.expiration(), claims.not_before(), claims.issued_at()]
        .into_iter()
        .flatten()
    {
        validate_timestamp_bounds(timestamp)?;
    }

    if config.validate_exp {
        if let Some(exp) = claims.expiration() {
            let exp_with_skew = apply_clock_skew(exp, config.clock_skew_seconds, true)?;
            if now > exp_with_skew {
                return Err(Error::TokenExpired {
                    expired_at: exp,
                    now,
                    skew: config.clock_skew_seconds,
                });
            }
        }
    }

    if config.validate_nbf {
        if let Some(nbf) = claims.not_before() {
            let nbf_with_skew = apply_clock_skew(nbf, config.clock_skew_seconds, false)?;
            if now < nbf_with_skew {
                return Err(Error::TokenNotYetValid {
                    not_before: nbf,
                    now,
                    skew: config.clock_skew_seconds,
                });
            }
        }
    }

    if config.validate_iat {
        if let Some(iat) = claims.issued_at() {
            let now_with_skew = apply_clock_skew(now, config.clock_skew_seconds, true)?;
            if iat > now_with_skew {
                return Err(Error::TokenIssuedInFuture {
                    issued_at: iat,
                    now,
                    skew: config.clock_skew_seconds,
                });
            }

            if let Some(max_age) = config.max_age_seconds {
                let iat_plus_max_age = apply_clock_skew(iat, max_age, true)?;
                if now > iat_plus_max_age {
                    return Err(Error::TokenTooOld {
                        issued_at: iat,
                        now,
                        max_age,
                    });
                }
            }
        }
    }

    if let Some(required_aud) = &config.required_audience {
        let audiences = claims.audiences();
        if audiences.is_empty() {
            return Err(Error::TokenMissingClaim("aud".into()));
        }
        if !audiences.contains(&required_aud.as_str()) {
            return Err(Error::TokenAudienceMismatch {
                expected: required_aud.to_string(),
                found: audiences.into_iter().map(String::from).collect(),
            });
        }
    }

    Ok(())
}

/// Get current Unix timestamp
fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
